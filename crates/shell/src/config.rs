//! Shell configuration.
//!
//! dynsh reads an optional TOML file from (in order):
//!
//! 1. the path passed with `--config`
//! 2. `$DYNSH_CONFIG_DIR/config.toml`
//! 3. `$XDG_CONFIG_HOME/dynsh/config.toml` (or the platform equivalent)
//!
//! Every key is optional:
//!
//! ```toml
//! commands_dir = "commands"
//! packages_dir = "packages"
//! source_extension = "rs"
//! color = true
//! history = true
//!
//! [compiler]
//! program = "rustc"
//! args = ["--crate-type", "cdylib", "-o", "{artifact}", "{source}"]
//! timeout_secs = 120
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
	/// Directory holding plugin source modules.
	pub commands_dir: PathBuf,
	/// Directory receiving compiled artifacts.
	pub packages_dir: PathBuf,
	/// Extension of source modules, without the dot.
	pub source_extension: String,
	/// Emit ANSI colours in listings, errors and the prompt.
	pub color: bool,
	/// Persist interactive history across sessions.
	pub history: bool,
	pub compiler: CompilerConfig,
}

impl Default for ShellConfig {
	fn default() -> Self {
		Self {
			commands_dir: PathBuf::from("commands"),
			packages_dir: PathBuf::from("packages"),
			source_extension: "rs".to_string(),
			color: true,
			history: true,
			compiler: CompilerConfig::default(),
		}
	}
}

/// External compiler invocation used by `install`.
///
/// `args` may contain the placeholders `{source}`, `{artifact}`, `{name}`
/// and `{crate}` (the name with `-` replaced by `_`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
	pub program: String,
	pub args: Vec<String>,
	pub timeout_secs: u64,
}

impl Default for CompilerConfig {
	fn default() -> Self {
		Self {
			program: std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string()),
			args: [
				"--crate-type",
				"cdylib",
				"--edition",
				"2021",
				"--crate-name",
				"{crate}",
				"-o",
				"{artifact}",
				"{source}",
			]
			.into_iter()
			.map(String::from)
			.collect(),
			timeout_secs: 120,
		}
	}
}

impl CompilerConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}

/// Directory searched for `config.toml`.
pub fn config_dir() -> Option<PathBuf> {
	if let Ok(dir) = std::env::var("DYNSH_CONFIG_DIR") {
		return Some(PathBuf::from(dir));
	}
	dirs::config_dir().map(|d| d.join("dynsh"))
}

/// Location of the interactive history file.
pub fn history_path() -> Option<PathBuf> {
	dirs::data_dir().map(|d| d.join("dynsh").join("history.txt"))
}

impl ShellConfig {
	/// Parses a configuration document.
	pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
		toml::from_str(content).map_err(|source| ConfigError::Parse {
			path: origin.to_path_buf(),
			source,
		})
	}

	/// Reads the configuration file.
	///
	/// An explicit path must exist. Without one, a missing default file
	/// yields [`ShellConfig::default`].
	pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
		let path = match explicit {
			Some(path) => path.to_path_buf(),
			None => match config_dir().map(|d| d.join("config.toml")) {
				Some(path) if path.exists() => path,
				_ => {
					tracing::debug!("no config file found, using defaults");
					return Ok(Self::default());
				}
			},
		};

		let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
			path: path.clone(),
			source,
		})?;
		let config = Self::from_toml_str(&content, &path)?;
		tracing::debug!(path = %path.display(), "loaded config");
		Ok(config)
	}
}
