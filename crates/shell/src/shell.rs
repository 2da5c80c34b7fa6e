//! The owned shell state threaded through every command.

use std::path::PathBuf;

use crate::config::ShellConfig;
use crate::dispatch::DispatchState;
use crate::installer::Installer;
use crate::output::{Palette, Tone};
use crate::packages::PackageLog;
use crate::registry::Registry;

/// Environment values captured once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellEnv {
	pub user: Option<String>,
	pub home: Option<PathBuf>,
}

impl ShellEnv {
	pub fn from_process() -> Self {
		Self {
			user: std::env::var("USER").ok().filter(|u| !u.is_empty()),
			home: std::env::var_os("HOME")
				.filter(|h| !h.is_empty())
				.map(PathBuf::from),
		}
	}
}

/// Registry, package log and installer for one shell session.
///
/// Nothing here is global: tests build as many independent shells as they
/// like.
pub struct Shell {
	pub(crate) registry: Registry,
	pub(crate) packages: PackageLog,
	pub(crate) installer: Installer,
	pub(crate) env: ShellEnv,
	pub(crate) palette: Palette,
	pub(crate) state: DispatchState,
}

impl Shell {
	pub fn new(installer: Installer, env: ShellEnv, palette: Palette) -> Self {
		Self {
			registry: Registry::new(),
			packages: PackageLog::new(),
			installer,
			env,
			palette,
			state: DispatchState::Running,
		}
	}

	pub fn from_config(config: &ShellConfig) -> Self {
		Self::new(
			Installer::from_config(config),
			ShellEnv::from_process(),
			Palette::new(config.color),
		)
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn registry_mut(&mut self) -> &mut Registry {
		&mut self.registry
	}

	pub fn packages(&self) -> &PackageLog {
		&self.packages
	}

	pub fn installer(&self) -> &Installer {
		&self.installer
	}

	pub fn env(&self) -> &ShellEnv {
		&self.env
	}

	pub fn palette(&self) -> Palette {
		self.palette
	}

	pub fn state(&self) -> DispatchState {
		self.state
	}

	/// Two-line prompt: `┌ user:cwd` then `└ $ `.
	pub fn prompt(&self) -> String {
		let cwd = std::env::current_dir()
			.map(|p| p.display().to_string())
			.unwrap_or_else(|_| "?".to_string());
		let user = self.env.user.as_deref().unwrap_or("?");
		format!(
			"┌ {}:{}\n└ $ ",
			self.palette.paint(Tone::Green, user),
			self.palette.paint(Tone::Blue, cwd)
		)
	}
}
