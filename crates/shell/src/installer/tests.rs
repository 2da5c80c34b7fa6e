use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tempfile::TempDir;

use super::*;
use crate::error::LoadError;

/// Writes a placeholder artifact and counts invocations.
struct CountingCompiler {
	calls: Rc<Cell<usize>>,
}

impl Compiler for CountingCompiler {
	fn compile(&self, job: &CompileJob<'_>) -> Result<(), InstallError> {
		self.calls.set(self.calls.get() + 1);
		std::fs::write(job.artifact, b"not a shared object").map_err(|source| InstallError::Io {
			path: job.artifact.to_path_buf(),
			source,
		})
	}
}

fn layout(dir: &TempDir) -> PluginLayout {
	PluginLayout {
		commands_dir: dir.path().join("commands"),
		packages_dir: dir.path().join("packages"),
		source_extension: "rs".to_string(),
	}
}

fn counting_installer(dir: &TempDir) -> (Installer, Rc<Cell<usize>>) {
	let calls = Rc::new(Cell::new(0));
	let installer = Installer::new(
		layout(dir),
		Box::new(CountingCompiler {
			calls: calls.clone(),
		}),
	);
	(installer, calls)
}

fn write_source(dir: &TempDir, name: &str) {
	let commands = dir.path().join("commands");
	std::fs::create_dir_all(&commands).unwrap();
	std::fs::write(commands.join(format!("{name}.rs")), "// plugin").unwrap();
}

#[test]
fn layout_uses_one_artifact_naming_rule() {
	let layout = PluginLayout {
		commands_dir: PathBuf::from("commands"),
		packages_dir: PathBuf::from("packages"),
		source_extension: "rs".to_string(),
	};
	assert_eq!(layout.source_path("echo"), PathBuf::from("commands/echo.rs"));
	assert_eq!(
		layout.artifact_path("echo"),
		PathBuf::from(format!("packages/{DLL_PREFIX}echo{DLL_SUFFIX}"))
	);
	#[cfg(target_os = "linux")]
	assert_eq!(layout.artifact_path("echo"), PathBuf::from("packages/libecho.so"));
}

#[test]
fn names_are_validated() {
	for good in ["echo", "my-cmd", "cmd_2"] {
		assert!(validate_name(good).is_ok(), "{good}");
	}
	for bad in ["", "../etc", "a/b", "dot.ted", "sp ace"] {
		assert!(
			matches!(validate_name(bad), Err(InstallError::InvalidName(_))),
			"{bad}"
		);
	}
}

#[test]
fn missing_source_is_reported_without_compiling() {
	let dir = tempfile::tempdir().unwrap();
	let (installer, calls) = counting_installer(&dir);
	let mut registry = Registry::new();

	let err = installer.install(&mut registry, "nothing").unwrap_err();
	assert!(matches!(err, InstallError::SourceNotFound { ref name, .. } if name == "nothing"));
	assert_eq!(calls.get(), 0);
	assert_eq!(registry.loaded_len(), 0);
	assert!(!dir.path().join("packages").exists());
}

#[test]
fn invalid_name_never_touches_disk() {
	let dir = tempfile::tempdir().unwrap();
	let (installer, calls) = counting_installer(&dir);
	let err = installer
		.install(&mut Registry::new(), "../escape")
		.unwrap_err();
	assert!(matches!(err, InstallError::InvalidName(_)));
	assert_eq!(calls.get(), 0);
}

#[test]
fn second_install_reuses_the_artifact() {
	let dir = tempfile::tempdir().unwrap();
	write_source(&dir, "echo");
	let (installer, calls) = counting_installer(&dir);
	let mut registry = Registry::new();

	let first = installer.install(&mut registry, "echo").unwrap_err();
	assert!(matches!(first, InstallError::Load(LoadError::LoadFailed { .. })));
	assert_eq!(calls.get(), 1);
	assert!(installer.layout().artifact_path("echo").exists());

	let second = installer.install(&mut registry, "echo").unwrap_err();
	assert!(matches!(second, InstallError::Load(LoadError::LoadFailed { .. })));
	assert_eq!(calls.get(), 1, "cached artifact must not be rebuilt");
	assert_eq!(registry.loaded_len(), 0);
}

#[test]
fn existing_artifact_skips_compilation_entirely() {
	let dir = tempfile::tempdir().unwrap();
	write_source(&dir, "tool");
	let (installer, calls) = counting_installer(&dir);
	std::fs::create_dir_all(dir.path().join("packages")).unwrap();
	std::fs::write(installer.layout().artifact_path("tool"), b"stale").unwrap();

	let err = installer.install(&mut Registry::new(), "tool").unwrap_err();
	assert!(matches!(err, InstallError::Load(_)));
	assert_eq!(calls.get(), 0);
}

#[cfg(unix)]
#[test]
fn non_zero_exit_is_compile_failed_and_skips_loading() {
	let dir = tempfile::tempdir().unwrap();
	write_source(&dir, "broken");
	let installer = Installer::new(
		layout(&dir),
		Box::new(ProcessCompiler::new("false", Vec::new(), Duration::from_secs(10))),
	);
	let mut registry = Registry::new();

	let err = installer.install(&mut registry, "broken").unwrap_err();
	assert!(matches!(err, InstallError::CompileFailed { ref name, .. } if name == "broken"));
	assert!(err.to_string().starts_with("error compiling command: broken"));
	assert_eq!(registry.loaded_len(), 0);
	assert!(dir.path().join("packages").is_dir());
}

#[test]
fn unknown_compiler_program_is_reported() {
	let dir = tempfile::tempdir().unwrap();
	write_source(&dir, "echo");
	let installer = Installer::new(
		layout(&dir),
		Box::new(ProcessCompiler::new(
			"dynsh-no-such-compiler",
			Vec::new(),
			Duration::from_secs(1),
		)),
	);
	let err = installer.install(&mut Registry::new(), "echo").unwrap_err();
	assert!(matches!(err, InstallError::CompilerUnavailable { .. }));
}

#[cfg(unix)]
#[test]
fn hanging_compiler_is_killed_after_timeout() {
	let dir = tempfile::tempdir().unwrap();
	write_source(&dir, "slow");
	let installer = Installer::new(
		layout(&dir),
		Box::new(ProcessCompiler::new(
			"sleep",
			vec!["30".to_string()],
			Duration::from_millis(200),
		)),
	);

	let started = std::time::Instant::now();
	let err = installer.install(&mut Registry::new(), "slow").unwrap_err();
	assert!(matches!(err, InstallError::CompileTimedOut { .. }));
	assert!(started.elapsed() < Duration::from_secs(10));
}

#[cfg(unix)]
#[test]
fn timed_out_compile_uses_the_reaped_status() {
	use std::os::unix::process::ExitStatusExt;
	use std::process::ExitStatus;

	use super::compiler::settle_after_timeout;

	let job = CompileJob {
		name: "racy",
		source: Path::new("commands/racy.rs"),
		artifact: Path::new("packages/libracy.so"),
	};
	let timeout = Duration::from_millis(200);
	let exited_ok = ExitStatus::from_raw(0);
	let exited_one = ExitStatus::from_raw(1 << 8);
	let sigkill = ExitStatus::from_raw(9);

	// kill lost the race against a clean exit
	assert!(settle_after_timeout(&job, timeout, false, Ok(exited_ok)).is_ok());
	assert!(matches!(
		settle_after_timeout(&job, timeout, false, Ok(exited_one)),
		Err(InstallError::CompileFailed { .. })
	));
	assert!(matches!(
		settle_after_timeout(&job, timeout, true, Ok(sigkill)),
		Err(InstallError::CompileTimedOut { .. })
	));
	let reap_error = std::io::Error::other("no child");
	assert!(matches!(
		settle_after_timeout(&job, timeout, true, Err(reap_error)),
		Err(InstallError::CompileTimedOut { .. })
	));
}

#[test]
fn placeholders_are_expanded() {
	let compiler = ProcessCompiler::new(
		"cc",
		["-o", "{artifact}", "{source}", "--name={name}", "{crate}"]
			.map(String::from)
			.to_vec(),
		Duration::ZERO,
	);
	let args = compiler.expand_args(&CompileJob {
		name: "my-cmd",
		source: Path::new("commands/my-cmd.rs"),
		artifact: Path::new("packages/libmy-cmd.so"),
	});
	assert_eq!(
		args,
		vec![
			"-o",
			"packages/libmy-cmd.so",
			"commands/my-cmd.rs",
			"--name=my-cmd",
			"my_cmd"
		]
	);
}
