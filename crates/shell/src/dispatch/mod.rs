//! Read-eval-print loop.
//!
//! Lines are split on whitespace with no quoting; the first token names the
//! command. Every error is rendered here and the loop keeps going; only
//! `exit`, end-of-input and a broken line source stop it.


use crate::builtins::CommandContext;
use crate::error::CommandError;
use crate::line_source::{LineSource, ReadLine};
use crate::output::{Streams, Tone};
use crate::registry::CommandHandler;
use crate::shell::Shell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
	Running,
	Terminated,
}

/// What a successful command asks of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
	Continue,
	Exit,
}

pub fn tokenize(line: &str) -> Vec<&str> {
	line.split_whitespace().collect()
}

impl Shell {
	/// Resolves `tokens[0]` and runs it with the remaining tokens.
	pub fn dispatch(
		&mut self,
		tokens: &[&str],
		streams: &mut Streams<'_>,
	) -> Result<CommandOutcome, CommandError> {
		let Some((&name, args)) = tokens.split_first() else {
			return Ok(CommandOutcome::Continue);
		};

		match self.registry.resolve(name) {
			Some(CommandHandler::Builtin(def)) => (def.handler)(&mut CommandContext {
				shell: self,
				args,
				streams,
			}),
			Some(CommandHandler::Loaded(command)) => {
				tracing::debug!(name, ?args, "invoking loaded command");
				command.execute(args, streams)?;
				Ok(CommandOutcome::Continue)
			}
			None => Err(CommandError::CommandNotFound(name.to_string())),
		}
	}

	/// Runs one input line and reports any error on `streams.err`.
	pub fn execute_line(&mut self, line: &str, streams: &mut Streams<'_>) -> DispatchState {
		if self.state == DispatchState::Terminated {
			return self.state;
		}
		let tokens = tokenize(line);
		if tokens.is_empty() {
			return self.state;
		}

		match self.dispatch(&tokens, streams) {
			Ok(CommandOutcome::Continue) => {}
			Ok(CommandOutcome::Exit) => self.state = DispatchState::Terminated,
			Err(error) => self.report(&error, streams),
		}
		if let Err(e) = streams.out.flush() {
			tracing::warn!("failed to flush output: {e}");
		}
		self.state
	}

	pub(crate) fn report(&self, error: &CommandError, streams: &mut Streams<'_>) {
		for failure in error.failures() {
			tracing::debug!(error = ?failure, "command failed");
			let label = self.palette.paint(Tone::Red, "Error:");
			if let Err(e) = writeln!(streams.err, "{label} {failure}") {
				tracing::warn!("failed to write error: {e}");
			}
		}
	}

	/// Reads and executes lines until `exit`, end-of-input, or a read
	/// failure the line source cannot recover from.
	pub fn run(&mut self, source: &mut dyn LineSource, streams: &mut Streams<'_>) {
		while self.state == DispatchState::Running {
			let prompt = self.prompt();
			match source.read_line(&prompt) {
				Ok(ReadLine::Line(line)) => {
					self.execute_line(&line, streams);
				}
				Ok(ReadLine::Interrupted) => continue,
				Ok(ReadLine::Unreadable(reason)) => {
					tracing::debug!(%reason, "skipping unreadable line");
					self.report(&CommandError::UnreadableInput(reason), streams);
				}
				Ok(ReadLine::Eof) => {
					tracing::debug!("end of input");
					self.state = DispatchState::Terminated;
				}
				Err(e) => {
					tracing::error!("line source failed: {e}");
					self.report(&CommandError::InputFailed(e), streams);
					self.state = DispatchState::Terminated;
				}
			}
		}
		source.close();
	}
}
