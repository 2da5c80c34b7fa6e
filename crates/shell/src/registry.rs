//! Command name → handler mapping.
//!
//! Built-ins live in a static table and always win a name collision; the
//! registry itself only stores dynamically loaded commands, one binding per
//! name, last registration wins.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::builtins::{self, BuiltinDef};
use crate::error::CommandError;
use crate::output::Streams;

/// A command implemented outside the shell binary.
pub trait ExternalCommand {
	fn name(&self) -> &str;

	/// File the command was loaded from, if any.
	fn origin(&self) -> Option<&Path> {
		None
	}

	fn execute(&self, args: &[&str], streams: &mut Streams<'_>) -> Result<(), CommandError>;
}

/// Result of resolving a name.
#[derive(Clone)]
pub enum CommandHandler {
	Builtin(&'static BuiltinDef),
	Loaded(Rc<dyn ExternalCommand>),
}

impl std::fmt::Debug for CommandHandler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Builtin(def) => f.debug_tuple("Builtin").field(&def.name).finish(),
			Self::Loaded(cmd) => f.debug_tuple("Loaded").field(&cmd.name()).finish(),
		}
	}
}

#[derive(Default)]
pub struct Registry {
	loaded: HashMap<String, Rc<dyn ExternalCommand>>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds `name` to `handler`, replacing any previous loaded binding.
	pub fn register(&mut self, name: impl Into<String>, handler: Rc<dyn ExternalCommand>) {
		let name = name.into();
		if builtins::find(&name).is_some() {
			tracing::warn!(name = %name, "loaded command is shadowed by a built-in");
		}
		if self.loaded.insert(name.clone(), handler).is_some() {
			tracing::debug!(name = %name, "replaced loaded command");
		}
	}

	/// Looks `name` up, built-ins first.
	pub fn resolve(&self, name: &str) -> Option<CommandHandler> {
		if let Some(def) = builtins::find(name) {
			return Some(CommandHandler::Builtin(def));
		}
		self.loaded.get(name).cloned().map(CommandHandler::Loaded)
	}

	/// Loaded binding for `name`, ignoring built-ins.
	pub fn loaded(&self, name: &str) -> Option<Rc<dyn ExternalCommand>> {
		self.loaded.get(name).cloned()
	}

	pub fn is_builtin(&self, name: &str) -> bool {
		builtins::find(name).is_some()
	}

	/// Names of loaded commands, sorted.
	pub fn loaded_names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.loaded.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	pub fn loaded_len(&self) -> usize {
		self.loaded.len()
	}
}
