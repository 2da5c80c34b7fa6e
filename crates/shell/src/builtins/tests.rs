use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serial_test::serial;

use crate::dispatch::CommandOutcome;
use crate::error::{CommandError, InstallError};
use crate::packages::InstallStatus;
use crate::shell::testing::{Captured, shell_in};

fn path_arg(path: &Path) -> String {
	path.to_string_lossy().into_owned()
}

#[test]
fn exit_requests_termination() {
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	let outcome = shell.dispatch(&["exit"], &mut io.streams()).unwrap();
	assert_eq!(outcome, CommandOutcome::Exit);
}

#[test]
fn rm_keeps_going_after_a_missing_file() {
	let dir = tempfile::tempdir().unwrap();
	let missing = dir.path().join("missing.txt");
	let present = dir.path().join("present.txt");
	fs::write(&present, "x").unwrap();

	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	let (missing_arg, present_arg) = (path_arg(&missing), path_arg(&present));
	let err = shell
		.dispatch(&["rm", &missing_arg, &present_arg], &mut io.streams())
		.unwrap_err();

	match err {
		CommandError::FileSystemOpFailed { op, path, .. } => {
			assert_eq!(op, "rm");
			assert_eq!(path, missing);
		}
		other => panic!("unexpected {other:?}"),
	}
	assert!(!present.exists());
}

#[test]
fn rm_reports_every_failure() {
	let dir = tempfile::tempdir().unwrap();
	let sub = dir.path().join("sub");
	fs::create_dir(&sub).unwrap();
	fs::write(sub.join("keep.txt"), "x").unwrap();
	let gone = dir.path().join("gone");

	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	let (gone_arg, sub_arg) = (path_arg(&gone), path_arg(&sub));
	let err = shell
		.dispatch(&["rm", &gone_arg, &sub_arg], &mut io.streams())
		.unwrap_err();

	assert!(matches!(err, CommandError::Batch(_)));
	assert_eq!(err.failures().len(), 2);
	assert!(sub.is_dir());
}

#[test]
fn rm_removes_empty_directories() {
	let dir = tempfile::tempdir().unwrap();
	let empty = dir.path().join("empty");
	fs::create_dir(&empty).unwrap();
	let file = dir.path().join("file.txt");
	fs::write(&file, "x").unwrap();

	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	let (empty_arg, file_arg) = (path_arg(&empty), path_arg(&file));
	shell
		.dispatch(&["rm", &empty_arg, &file_arg], &mut io.streams())
		.unwrap();

	assert!(!empty.exists());
	assert!(!file.exists());
}

#[test]
fn rm_without_arguments() {
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	assert!(matches!(
		shell.dispatch(&["rm"], &mut io.streams()),
		Err(CommandError::MissingArgument(_))
	));
}

#[test]
fn touch_without_arguments_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	assert!(matches!(
		shell.dispatch(&["touch"], &mut io.streams()),
		Err(CommandError::MissingArgument("file"))
	));
}

#[test]
fn touch_creates_but_never_truncates() {
	let dir = tempfile::tempdir().unwrap();
	let fresh = dir.path().join("fresh.txt");
	let existing = dir.path().join("existing.txt");
	fs::write(&existing, "keep me").unwrap();

	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	let (fresh_arg, existing_arg) = (path_arg(&fresh), path_arg(&existing));
	shell
		.dispatch(&["touch", &fresh_arg, &existing_arg], &mut io.streams())
		.unwrap();

	assert_eq!(fs::read_to_string(&fresh).unwrap(), "");
	assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me");
}

#[test]
fn touch_into_missing_directory_fails() {
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	let target = path_arg(&dir.path().join("no/such/dir/file"));
	assert!(matches!(
		shell.dispatch(&["touch", &target], &mut io.streams()),
		Err(CommandError::FileSystemOpFailed { op: "touch", .. })
	));
}

#[test]
#[serial(cwd)]
fn cd_without_argument_goes_home() {
	let original = std::env::current_dir().unwrap();
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();

	let result = shell.dispatch(&["cd"], &mut io.streams());
	let now = std::env::current_dir().unwrap();
	std::env::set_current_dir(&original).unwrap();

	result.unwrap();
	assert_eq!(
		now.canonicalize().unwrap(),
		dir.path().canonicalize().unwrap()
	);
}

#[test]
#[serial(cwd)]
fn cd_tilde_goes_home() {
	let original = std::env::current_dir().unwrap();
	let dir = tempfile::tempdir().unwrap();
	fs::create_dir(dir.path().join("inner")).unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();

	let result = shell.dispatch(&["cd", "~/inner"], &mut io.streams());
	let now = std::env::current_dir().unwrap();
	std::env::set_current_dir(&original).unwrap();

	result.unwrap();
	assert_eq!(
		now.canonicalize().unwrap(),
		dir.path().join("inner").canonicalize().unwrap()
	);
}

#[test]
#[serial(cwd)]
fn cd_to_missing_path_leaves_cwd_alone() {
	let before = std::env::current_dir().unwrap();
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();

	let target = path_arg(&dir.path().join("does-not-exist"));
	let err = shell.dispatch(&["cd", &target], &mut io.streams()).unwrap_err();

	assert!(matches!(err, CommandError::FileSystemOpFailed { op: "cd", .. }));
	assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
#[serial(cwd)]
fn cd_without_home_reports_an_error() {
	let before = std::env::current_dir().unwrap();
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	shell.env.home = None;
	let mut io = Captured::default();

	assert!(matches!(
		shell.dispatch(&["cd"], &mut io.streams()),
		Err(CommandError::HomeNotSet)
	));
	assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
fn ls_and_ll_take_an_optional_directory() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("visible.txt"), "abc").unwrap();
	fs::write(dir.path().join(".secret"), "").unwrap();
	let mut shell = shell_in(dir.path());
	let arg = path_arg(dir.path());

	let mut short = Captured::default();
	shell.dispatch(&["ls", &arg], &mut short.streams()).unwrap();
	assert_eq!(short.out(), "visible.txt\n");

	let mut long = Captured::default();
	shell.dispatch(&["ll", &arg], &mut long.streams()).unwrap();
	let out = long.out();
	assert!(out.starts_with("total "));
	assert!(out.contains(".secret"));
	assert!(out.contains("visible.txt"));
}

#[test]
fn ls_of_missing_directory_fails() {
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	let arg = path_arg(&dir.path().join("nope"));
	assert!(matches!(
		shell.dispatch(&["ls", &arg], &mut io.streams()),
		Err(CommandError::FileSystemOpFailed { op: "ls", .. })
	));
}

#[test]
fn clear_emits_terminal_escapes() {
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	shell.dispatch(&["clear"], &mut io.streams()).unwrap();
	assert!(io.out().contains("\u{1b}[2J"));
}

#[test]
fn install_requires_a_name() {
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	assert!(matches!(
		shell.dispatch(&["install"], &mut io.streams()),
		Err(CommandError::MissingArgument(_))
	));
	assert!(shell.packages().is_empty());
}

#[test]
fn failed_installs_are_logged_and_listed() {
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();

	let err = shell
		.dispatch(&["install", "ghost"], &mut io.streams())
		.unwrap_err();
	assert!(matches!(
		err,
		CommandError::Install(InstallError::SourceNotFound { .. })
	));
	assert_eq!(shell.packages().records()[0].status, InstallStatus::Failed);
	assert_eq!(shell.registry().loaded_len(), 0);

	let mut listing = Captured::default();
	shell.dispatch(&["list"], &mut listing.streams()).unwrap();
	assert_eq!(listing.out(), "Installed packages:\n- ghost (failed)\n");
}

#[test]
fn install_of_several_names_reports_each() {
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();

	let err = shell
		.dispatch(&["install", "one", "two"], &mut io.streams())
		.unwrap_err();
	assert_eq!(err.failures().len(), 2);
	assert_eq!(shell.packages().names().collect::<Vec<_>>(), vec!["one", "two"]);
}

#[test]
fn help_lists_builtins() {
	let dir = tempfile::tempdir().unwrap();
	let mut shell = shell_in(dir.path());
	let mut io = Captured::default();
	shell.dispatch(&["help"], &mut io.streams()).unwrap();
	let out = io.out();
	for def in super::BUILTINS {
		assert!(out.contains(def.usage), "missing {}", def.name);
	}
	assert!(!out.contains("Loaded commands"));
}

#[test]
fn builtin_names_are_unique() {
	let mut names: Vec<_> = super::BUILTINS.iter().map(|d| d.name).collect();
	names.sort_unstable();
	names.dedup();
	assert_eq!(names.len(), super::BUILTINS.len());
}
