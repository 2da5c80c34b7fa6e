use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::config::CompilerConfig;
use crate::error::InstallError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One source-to-artifact build.
#[derive(Debug, Clone, Copy)]
pub struct CompileJob<'a> {
	pub name: &'a str,
	pub source: &'a Path,
	pub artifact: &'a Path,
}

/// Turns a source module into a loadable artifact.
pub trait Compiler {
	fn compile(&self, job: &CompileJob<'_>) -> Result<(), InstallError>;
}

/// Runs an external compiler process and waits for it.
///
/// Success is defined solely by the exit status. A zero timeout waits
/// forever.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
	program: String,
	args: Vec<String>,
	timeout: Duration,
}

impl ProcessCompiler {
	pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
		Self {
			program: program.into(),
			args,
			timeout,
		}
	}

	pub fn from_config(config: &CompilerConfig) -> Self {
		Self::new(config.program.clone(), config.args.clone(), config.timeout())
	}

	/// Arguments with placeholders filled in for `job`.
	pub fn expand_args(&self, job: &CompileJob<'_>) -> Vec<String> {
		let source = job.source.to_string_lossy();
		let artifact = job.artifact.to_string_lossy();
		let crate_name = job.name.replace('-', "_");
		self.args
			.iter()
			.map(|arg| {
				arg.replace("{source}", &source)
					.replace("{artifact}", &artifact)
					.replace("{crate}", &crate_name)
					.replace("{name}", job.name)
			})
			.collect()
	}
}

impl Compiler for ProcessCompiler {
	fn compile(&self, job: &CompileJob<'_>) -> Result<(), InstallError> {
		let args = self.expand_args(job);
		tracing::info!(program = %self.program, ?args, "compiling {}", job.name);

		let mut child = Command::new(&self.program)
			.args(&args)
			.stdin(Stdio::null())
			.spawn()
			.map_err(|source| InstallError::CompilerUnavailable {
				program: self.program.clone(),
				source,
			})?;

		let started = Instant::now();
		loop {
			match child.try_wait() {
				Ok(Some(status)) if status.success() => {
					tracing::debug!(elapsed = ?started.elapsed(), "compiler finished");
					return Ok(());
				}
				Ok(Some(status)) => {
					return Err(InstallError::CompileFailed {
						name: job.name.to_string(),
						status: status.to_string(),
					});
				}
				Ok(None) if !self.timeout.is_zero() && started.elapsed() >= self.timeout => {
					tracing::warn!(timeout = ?self.timeout, "killing compiler");
					let killed = match child.kill() {
						Ok(()) => true,
						Err(e) => {
							tracing::warn!("failed to kill compiler: {e}");
							false
						}
					};
					return settle_after_timeout(job, self.timeout, killed, child.wait());
				}
				Ok(None) => std::thread::sleep(POLL_INTERVAL),
				Err(source) => {
					return Err(InstallError::Io {
						path: job.source.to_path_buf(),
						source,
					});
				}
			}
		}
	}
}

/// Decides the outcome once a timed-out compiler has been killed and reaped.
///
/// A failed kill means the child exited on its own in the meantime, so its
/// real exit status wins over the timeout.
pub(super) fn settle_after_timeout(
	job: &CompileJob<'_>,
	timeout: Duration,
	killed: bool,
	reaped: io::Result<ExitStatus>,
) -> Result<(), InstallError> {
	match reaped {
		Ok(status) if status.success() => {
			tracing::debug!("compiler finished just as it timed out");
			return Ok(());
		}
		Ok(status) if !killed => {
			return Err(InstallError::CompileFailed {
				name: job.name.to_string(),
				status: status.to_string(),
			});
		}
		Ok(_) => {}
		Err(e) => tracing::warn!("failed to reap compiler: {e}"),
	}
	Err(InstallError::CompileTimedOut {
		name: job.name.to_string(),
		timeout,
	})
}
