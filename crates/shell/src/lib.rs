//! dynsh: an interactive shell that grows new commands at runtime.
//!
//! A line's first word is resolved against the fixed [`builtins`] table and
//! then the [`registry`] of loaded commands. `install <name>` compiles
//! `commands/<name>.rs` into `packages/lib<name>.so` with the configured
//! compiler ([`installer`]), opens it through the C ABI in
//! `dynsh-plugin-abi` ([`loader`]), and registers it so the very next line
//! can call it.
//!
//! Everything runs on one thread: a compile blocks the prompt until it
//! finishes or hits the configured timeout.

pub mod builtins;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod installer;
pub mod line_source;
pub mod loader;
pub mod output;
pub mod packages;
pub mod probe;
pub mod registry;
pub mod shell;

pub use config::ShellConfig;
pub use dispatch::{CommandOutcome, DispatchState, tokenize};
pub use error::{CommandError, ConfigError, InstallError, LoadError};
pub use installer::{InstallOutcome, Installer, PluginLayout};
pub use line_source::{LineSource, ReadLine, Readline, ScriptedLines};
pub use output::{Palette, Streams};
pub use registry::{CommandHandler, ExternalCommand, Registry};
pub use shell::{Shell, ShellEnv};
