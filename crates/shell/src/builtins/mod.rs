//! Commands compiled into the shell.
//!
//! The table is fixed at build time and is consulted before any loaded
//! command, so a plugin can never replace one of these names.

mod fs;
mod session;
#[cfg(test)]
mod tests;

use crate::dispatch::CommandOutcome;
use crate::error::CommandError;
use crate::output::Streams;
use crate::shell::Shell;

/// What a built-in handler gets to work with.
pub struct CommandContext<'a, 'io> {
	pub shell: &'a mut Shell,
	/// Arguments after the command name.
	pub args: &'a [&'a str],
	pub streams: &'a mut Streams<'io>,
}

pub type BuiltinHandler = fn(&mut CommandContext<'_, '_>) -> Result<CommandOutcome, CommandError>;

/// A statically known command.
pub struct BuiltinDef {
	pub name: &'static str,
	pub usage: &'static str,
	pub description: &'static str,
	pub handler: BuiltinHandler,
}

pub static BUILTINS: &[BuiltinDef] = &[
	BuiltinDef {
		name: "exit",
		usage: "exit",
		description: "Leave the shell",
		handler: session::cmd_exit,
	},
	BuiltinDef {
		name: "list",
		usage: "list",
		description: "Show install attempts made in this session",
		handler: session::cmd_list,
	},
	BuiltinDef {
		name: "install",
		usage: "install <name...>",
		description: "Compile commands/<name> and load it as a command",
		handler: session::cmd_install,
	},
	BuiltinDef {
		name: "help",
		usage: "help",
		description: "List built-in and loaded commands",
		handler: session::cmd_help,
	},
	BuiltinDef {
		name: "cd",
		usage: "cd [path|~]",
		description: "Change the working directory (home if omitted)",
		handler: fs::cmd_cd,
	},
	BuiltinDef {
		name: "pwd",
		usage: "pwd",
		description: "Print the working directory",
		handler: fs::cmd_pwd,
	},
	BuiltinDef {
		name: "ls",
		usage: "ls [dir]",
		description: "List visible directory entries",
		handler: fs::cmd_ls,
	},
	BuiltinDef {
		name: "ll",
		usage: "ll [dir]",
		description: "Long listing with permissions, owner, size and time",
		handler: fs::cmd_ll,
	},
	BuiltinDef {
		name: "rm",
		usage: "rm <path...>",
		description: "Remove files and empty directories; each path succeeds or fails on its own",
		handler: fs::cmd_rm,
	},
	BuiltinDef {
		name: "touch",
		usage: "touch <path...>",
		description: "Create empty files that do not exist yet",
		handler: fs::cmd_touch,
	},
	BuiltinDef {
		name: "clear",
		usage: "clear",
		description: "Clear the terminal",
		handler: fs::cmd_clear,
	},
];

pub fn find(name: &str) -> Option<&'static BuiltinDef> {
	BUILTINS.iter().find(|def| def.name == name)
}

/// Folds per-target failures into one result.
fn collect_failures(mut errors: Vec<CommandError>) -> Result<CommandOutcome, CommandError> {
	match errors.len() {
		0 => Ok(CommandOutcome::Continue),
		1 => Err(errors.remove(0)),
		_ => Err(CommandError::Batch(errors)),
	}
}
