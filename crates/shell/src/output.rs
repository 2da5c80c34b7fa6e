//! Output streams and colouring shared by handlers.

use std::fmt::Display;
use std::io::Write;

use crossterm::style::{Color, Stylize};

/// The pair of streams a command writes to.
pub struct Streams<'a> {
	pub out: &'a mut dyn Write,
	pub err: &'a mut dyn Write,
}

impl<'a> Streams<'a> {
	pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
		Self { out, err }
	}
}

/// Colour roles used across listings, prompt and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
	/// Readable bits, executables, user name.
	Green,
	/// Writable bits, directories, sizes, paths.
	Blue,
	/// Executable bit of hidden entries.
	Orange,
	/// Errors.
	Red,
}

impl Tone {
	fn color(self) -> Color {
		match self {
			Tone::Green => Color::Green,
			Tone::Blue => Color::Blue,
			Tone::Orange => Color::Yellow,
			Tone::Red => Color::Red,
		}
	}
}

/// Applies bold ANSI colour when enabled, passes text through otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
	enabled: bool,
}

impl Palette {
	pub const PLAIN: Self = Self { enabled: false };

	pub fn new(enabled: bool) -> Self {
		Self { enabled }
	}

	pub fn enabled(&self) -> bool {
		self.enabled
	}

	pub fn paint(&self, tone: Tone, text: impl Display) -> String {
		if self.enabled {
			format!("{}", text.to_string().with(tone.color()).bold())
		} else {
			text.to_string()
		}
	}
}
