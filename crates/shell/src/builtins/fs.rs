use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crossterm::QueueableCommand;
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};

use super::{CommandContext, collect_failures};
use crate::dispatch::CommandOutcome;
use crate::error::CommandError;
use crate::probe;

pub(super) fn cmd_cd(ctx: &mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError> {
	let home = ctx.shell.env.home.as_deref();
	let target = resolve_cd_target(ctx.args.first().copied(), home)?;

	std::env::set_current_dir(&target).map_err(|e| CommandError::fs("cd", target.clone(), e))?;
	tracing::debug!(cwd = %target.display(), "changed directory");
	Ok(CommandOutcome::Continue)
}

/// `~` and a missing argument mean home; `~/x` is relative to home.
fn resolve_cd_target(arg: Option<&str>, home: Option<&Path>) -> Result<PathBuf, CommandError> {
	match arg {
		None | Some("~") => home.map(Path::to_path_buf).ok_or(CommandError::HomeNotSet),
		Some(path) => match path.strip_prefix("~/") {
			Some(rest) => home
				.map(|h| h.join(rest))
				.ok_or(CommandError::HomeNotSet),
			None => Ok(PathBuf::from(path)),
		},
	}
}

pub(super) fn cmd_pwd(ctx: &mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError> {
	let cwd = std::env::current_dir().map_err(|e| CommandError::fs("pwd", ".", e))?;
	writeln!(ctx.streams.out, "{}", cwd.display())?;
	Ok(CommandOutcome::Continue)
}

fn listing_dir<'a>(ctx: &CommandContext<'a, '_>) -> &'a str {
	ctx.args.first().copied().unwrap_or(".")
}

pub(super) fn cmd_ls(ctx: &mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError> {
	let dir = listing_dir(ctx);
	let entries = probe::read_dir(Path::new(dir)).map_err(|e| CommandError::fs("ls", dir, e))?;
	write!(
		ctx.streams.out,
		"{}",
		probe::render_short(&entries, ctx.shell.palette)
	)?;
	Ok(CommandOutcome::Continue)
}

pub(super) fn cmd_ll(ctx: &mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError> {
	let dir = listing_dir(ctx);
	let entries = probe::read_dir(Path::new(dir)).map_err(|e| CommandError::fs("ll", dir, e))?;
	write!(
		ctx.streams.out,
		"{}",
		probe::render_long(&entries, ctx.shell.palette)
	)?;
	Ok(CommandOutcome::Continue)
}

pub(super) fn cmd_rm(ctx: &mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError> {
	if ctx.args.is_empty() {
		return Err(CommandError::MissingArgument("file"));
	}

	let mut failures = Vec::new();
	for &path in ctx.args {
		match remove_entry(Path::new(path)) {
			Ok(()) => tracing::debug!(path, "removed"),
			Err(e) => failures.push(CommandError::fs("rm", path, e)),
		}
	}
	collect_failures(failures)
}

/// Removes a file, symlink or empty directory.
fn remove_entry(path: &Path) -> std::io::Result<()> {
	match std::fs::symlink_metadata(path) {
		Ok(meta) if meta.is_dir() => std::fs::remove_dir(path),
		_ => std::fs::remove_file(path),
	}
}

pub(super) fn cmd_touch(ctx: &mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError> {
	if ctx.args.is_empty() {
		return Err(CommandError::MissingArgument("file"));
	}

	let mut failures = Vec::new();
	for &path in ctx.args {
		// append keeps existing contents intact
		if let Err(e) = OpenOptions::new().create(true).append(true).open(path) {
			failures.push(CommandError::fs("touch", path, e));
		}
	}
	collect_failures(failures)
}

pub(super) fn cmd_clear(ctx: &mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError> {
	ctx.streams
		.out
		.queue(Clear(ClearType::All))?
		.queue(MoveTo(0, 0))?
		.flush()?;
	Ok(CommandOutcome::Continue)
}
