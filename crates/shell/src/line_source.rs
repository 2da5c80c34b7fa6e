//! Where input lines come from.

use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// One read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
	Line(String),
	/// Ctrl-C: discard the current line and prompt again.
	Interrupted,
	/// A line arrived but could not be decoded; the reason is reported and
	/// the next line is read as usual.
	Unreadable(String),
	/// No more input.
	Eof,
}

pub trait LineSource {
	fn read_line(&mut self, prompt: &str) -> io::Result<ReadLine>;

	/// Called once when the loop terminates.
	fn close(&mut self) {}
}

/// Interactive terminal input with line editing and persistent history.
pub struct Readline {
	editor: DefaultEditor,
	history: Option<PathBuf>,
}

impl Readline {
	pub fn new(history: Option<PathBuf>) -> io::Result<Self> {
		let mut editor = DefaultEditor::new().map_err(into_io)?;
		if let Some(path) = &history
			&& let Err(e) = editor.load_history(path)
		{
			let not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == io::ErrorKind::NotFound);
			if !not_found {
				tracing::warn!("failed to load history: {e}");
			}
		}
		Ok(Self { editor, history })
	}

	fn save_history(&mut self) {
		let Some(path) = &self.history else {
			return;
		};
		if let Some(parent) = path.parent()
			&& let Err(e) = std::fs::create_dir_all(parent)
		{
			tracing::warn!("failed to create history directory: {e}");
		}
		if let Err(e) = self.editor.save_history(path) {
			tracing::warn!("failed to save history: {e}");
		}
	}
}

impl LineSource for Readline {
	fn read_line(&mut self, prompt: &str) -> io::Result<ReadLine> {
		match self.editor.readline(prompt) {
			Ok(line) => {
				if !line.trim().is_empty()
					&& let Err(e) = self.editor.add_history_entry(line.as_str())
				{
					tracing::warn!("failed to add history entry: {e}");
				}
				Ok(ReadLine::Line(line))
			}
			Err(ReadlineError::Interrupted) => Ok(ReadLine::Interrupted),
			Err(ReadlineError::Eof) => Ok(ReadLine::Eof),
			// the offending bytes are already consumed, so reading can resume
			Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
				Ok(ReadLine::Unreadable(e.to_string()))
			}
			Err(e) => Err(into_io(e)),
		}
	}

	fn close(&mut self) {
		self.save_history();
	}
}

fn into_io(e: ReadlineError) -> io::Error {
	match e {
		ReadlineError::Io(e) => e,
		other => io::Error::other(other.to_string()),
	}
}

/// Fixed lines, then end-of-input. Records every prompt it is shown.
#[derive(Debug, Default)]
pub struct ScriptedLines {
	lines: VecDeque<io::Result<ReadLine>>,
	prompts: Vec<String>,
	closed: bool,
}

impl ScriptedLines {
	pub fn new<I, S>(lines: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			lines: lines.into_iter().map(|l| Ok(ReadLine::Line(l.into()))).collect(),
			..Self::default()
		}
	}

	/// Queues a Ctrl-C.
	pub fn interrupt(mut self) -> Self {
		self.lines.push_back(Ok(ReadLine::Interrupted));
		self
	}

	/// Queues a line that fails to decode.
	pub fn unreadable<S: Into<String>>(mut self, reason: S) -> Self {
		self.lines.push_back(Ok(ReadLine::Unreadable(reason.into())));
		self
	}

	/// Queues a read failure.
	pub fn fail(mut self, kind: io::ErrorKind) -> Self {
		self.lines
			.push_back(Err(io::Error::new(kind, "scripted read failure")));
		self
	}

	pub fn then<S: Into<String>>(mut self, line: S) -> Self {
		self.lines.push_back(Ok(ReadLine::Line(line.into())));
		self
	}

	pub fn prompts(&self) -> &[String] {
		&self.prompts
	}

	pub fn remaining(&self) -> usize {
		self.lines.len()
	}

	pub fn is_closed(&self) -> bool {
		self.closed
	}
}

impl LineSource for ScriptedLines {
	fn read_line(&mut self, prompt: &str) -> io::Result<ReadLine> {
		self.prompts.push(prompt.to_string());
		self.lines.pop_front().unwrap_or(Ok(ReadLine::Eof))
	}

	fn close(&mut self) {
		self.closed = true;
	}
}
