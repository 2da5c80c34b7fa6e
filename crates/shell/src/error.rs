//! Error types for installing, loading and running commands.

use std::path::PathBuf;
use std::time::Duration;

use dynsh_plugin_abi::DynshStatus;
use thiserror::Error;

/// Failure to open an artifact and bind its entry point.
#[derive(Debug, Error)]
pub enum LoadError {
	/// `dlopen` rejected the file (missing, malformed, wrong architecture).
	#[error("failed to load {path}: {message}")]
	LoadFailed { path: PathBuf, message: String },

	/// The library has no `dynsh_plugin_entry_v1` symbol.
	#[error("{path} does not export the plugin entry point: {message}")]
	MissingEntry { path: PathBuf, message: String },

	/// The plugin was built against a different ABI version.
	#[error("incompatible plugin ABI in {path}: host={expected}, plugin={actual}")]
	AbiMismatch {
		path: PathBuf,
		expected: u32,
		actual: u32,
	},

	/// The entry point returned a status other than ok or incompatible.
	#[error("plugin entry point in {path} failed with status {status:?}")]
	EntryFailed { path: PathBuf, status: DynshStatus },

	/// The entry point succeeded but left `execute` null.
	#[error("plugin in {path} exports no execute function")]
	MissingExecute { path: PathBuf },
}

/// Failure of the `install` pipeline.
#[derive(Debug, Error)]
pub enum InstallError {
	#[error("invalid command name {0:?} (expected letters, digits, '-' or '_')")]
	InvalidName(String),

	#[error("command source not found: {name} (looked for {path})")]
	SourceNotFound { name: String, path: PathBuf },

	#[error("could not run compiler {program}: {source}")]
	CompilerUnavailable {
		program: String,
		#[source]
		source: std::io::Error,
	},

	#[error("error compiling command: {name} ({status})")]
	CompileFailed { name: String, status: String },

	#[error("compiling {name} did not finish within {timeout:?}")]
	CompileTimedOut { name: String, timeout: Duration },

	#[error("I/O error preparing {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Load(#[from] LoadError),
}

/// Error produced by a command handler, rendered by the dispatcher.
#[derive(Debug, Error)]
pub enum CommandError {
	#[error("command not found: {0}")]
	CommandNotFound(String),

	#[error("missing argument: {0}")]
	MissingArgument(&'static str),

	#[error("home directory not found: HOME is not set")]
	HomeNotSet,

	#[error("{op} {path}: {source}")]
	FileSystemOpFailed {
		op: &'static str,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error(transparent)]
	Install(#[from] InstallError),

	#[error("{name} failed with status {status:?}")]
	PluginFailed { name: String, status: DynshStatus },

	#[error("failed to write output: {0}")]
	Output(#[from] std::io::Error),

	/// A line that could not be decoded; the loop skips it.
	#[error("unreadable input line: {0}")]
	UnreadableInput(String),

	/// The line source itself broke; the loop stops after reporting it.
	#[error("failed to read input: {0}")]
	InputFailed(#[source] std::io::Error),

	/// Independent failures from a multi-target command.
	#[error("{}", render_batch(.0))]
	Batch(Vec<CommandError>),
}

impl CommandError {
	pub(crate) fn fs(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::FileSystemOpFailed {
			op,
			path: path.into(),
			source,
		}
	}

	/// Flattens nested batches into the individual failures.
	pub fn failures(&self) -> Vec<&CommandError> {
		match self {
			Self::Batch(errors) => errors.iter().flat_map(|e| e.failures()).collect(),
			other => vec![other],
		}
	}
}

fn render_batch(errors: &[CommandError]) -> String {
	errors
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join("\n")
}

/// Failure to load the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid config {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}
