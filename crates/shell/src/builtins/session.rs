
use super::{BUILTINS, CommandContext, collect_failures};
use crate::dispatch::CommandOutcome;
use crate::error::CommandError;
use crate::installer::InstallOutcome;
use crate::packages::InstallStatus;

pub(super) fn cmd_exit(_: &mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError> {
	Ok(CommandOutcome::Exit)
}

pub(super) fn cmd_list(ctx: &mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError> {
	let out = &mut *ctx.streams.out;
	writeln!(out, "Installed packages:")?;
	for record in ctx.shell.packages.records() {
		match record.status {
			InstallStatus::Installed => writeln!(out, "- {}", record.name)?,
			InstallStatus::Failed => writeln!(out, "- {} ({})", record.name, record.status)?,
		}
	}
	Ok(CommandOutcome::Continue)
}

pub(super) fn cmd_install(
	ctx: &mut CommandContext<'_, '_>,
) -> Result<CommandOutcome, CommandError> {
	if ctx.args.is_empty() {
		return Err(CommandError::MissingArgument("package name"));
	}

	let shell = &mut *ctx.shell;
	let mut failures = Vec::new();
	for &name in ctx.args {
		match shell.installer.install(&mut shell.registry, name) {
			Ok(outcome) => {
				shell.packages.record(name, InstallStatus::Installed);
				let note = match outcome {
					InstallOutcome::Compiled => "",
					InstallOutcome::Cached => " (cached)",
				};
				writeln!(ctx.streams.out, "Installed {name}{note}")?;
			}
			Err(e) => {
				tracing::warn!(name, "install failed: {e}");
				shell.packages.record(name, InstallStatus::Failed);
				failures.push(CommandError::Install(e));
			}
		}
	}
	collect_failures(failures)
}

pub(super) fn cmd_help(ctx: &mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError> {
	let out = &mut *ctx.streams.out;
	writeln!(out, "Built-in commands:")?;
	let width = BUILTINS.iter().map(|d| d.usage.len()).max().unwrap_or(0);
	for def in BUILTINS {
		writeln!(out, "  {:<width$}  {}", def.usage, def.description)?;
	}

	let loaded = ctx.shell.registry.loaded_names();
	if !loaded.is_empty() {
		writeln!(out, "\nLoaded commands:")?;
		for name in loaded {
			let shadowed = if ctx.shell.registry.is_builtin(name) {
				" (shadowed by built-in)"
			} else {
				""
			};
			writeln!(out, "  {name}{shadowed}")?;
		}
	}
	Ok(CommandOutcome::Continue)
}
