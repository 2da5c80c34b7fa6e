//! `install`: source module → compiled artifact → loaded command.
//!
//! Source modules live at `<commands_dir>/<name>.<ext>`, artifacts at
//! `<packages_dir>/lib<name>.so` (the platform's `DLL_PREFIX`/`DLL_SUFFIX`).
//! An existing artifact is reused as-is; delete it to force a rebuild.

mod compiler;
#[cfg(test)]
mod tests;

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::{Path, PathBuf};

pub use compiler::{CompileJob, Compiler, ProcessCompiler};

use crate::config::ShellConfig;
use crate::error::InstallError;
use crate::loader;
use crate::registry::Registry;

/// Where sources and artifacts for a command name live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginLayout {
	pub commands_dir: PathBuf,
	pub packages_dir: PathBuf,
	pub source_extension: String,
}

impl PluginLayout {
	pub fn from_config(config: &ShellConfig) -> Self {
		Self {
			commands_dir: config.commands_dir.clone(),
			packages_dir: config.packages_dir.clone(),
			source_extension: config.source_extension.clone(),
		}
	}

	pub fn source_path(&self, name: &str) -> PathBuf {
		self.commands_dir
			.join(format!("{name}.{}", self.source_extension))
	}

	/// Artifact path; the only place the artifact naming rule lives.
	pub fn artifact_path(&self, name: &str) -> PathBuf {
		self.packages_dir
			.join(format!("{DLL_PREFIX}{name}{DLL_SUFFIX}"))
	}
}

/// Rejects names that could escape the layout directories.
pub fn validate_name(name: &str) -> Result<(), InstallError> {
	let valid = !name.is_empty()
		&& name
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
	if valid {
		Ok(())
	} else {
		Err(InstallError::InvalidName(name.to_string()))
	}
}

/// How a successful install obtained its artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
	Compiled,
	Cached,
}

pub struct Installer {
	layout: PluginLayout,
	compiler: Box<dyn Compiler>,
}

impl Installer {
	pub fn new(layout: PluginLayout, compiler: Box<dyn Compiler>) -> Self {
		Self { layout, compiler }
	}

	pub fn from_config(config: &ShellConfig) -> Self {
		Self::new(
			PluginLayout::from_config(config),
			Box::new(ProcessCompiler::from_config(&config.compiler)),
		)
	}

	pub fn layout(&self) -> &PluginLayout {
		&self.layout
	}

	/// Compiles (unless cached) and loads `name` into `registry`.
	///
	/// No retries: any failure leaves the registry untouched and is
	/// returned immediately.
	pub fn install(
		&self,
		registry: &mut Registry,
		name: &str,
	) -> Result<InstallOutcome, InstallError> {
		validate_name(name)?;
		let source = self.layout.source_path(name);
		let artifact = self.layout.artifact_path(name);

		if !source.exists() {
			return Err(InstallError::SourceNotFound {
				name: name.to_string(),
				path: source,
			});
		}

		let outcome = if artifact.exists() {
			tracing::debug!(name, artifact = %artifact.display(), "reusing compiled artifact");
			InstallOutcome::Cached
		} else {
			ensure_dir(&self.layout.packages_dir)?;
			self.compiler.compile(&CompileJob {
				name,
				source: &source,
				artifact: &artifact,
			})?;
			InstallOutcome::Compiled
		};

		loader::load(registry, name, &artifact)?;
		tracing::info!(name, ?outcome, "installed command");
		Ok(outcome)
	}
}

fn ensure_dir(dir: &Path) -> Result<(), InstallError> {
	if dir.as_os_str().is_empty() || dir.is_dir() {
		return Ok(());
	}
	std::fs::create_dir_all(dir).map_err(|source| InstallError::Io {
		path: dir.to_path_buf(),
		source,
	})
}
