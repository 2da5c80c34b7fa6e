//! dynsh binary.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dynsh::config::history_path;
use dynsh::{Readline, Shell, ShellConfig, Streams};
use tracing::info;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "dynsh")]
#[command(about = "Interactive shell that compiles and loads new commands at runtime")]
#[command(version)]
struct Cli {
	/// Configuration file (default: $DYNSH_CONFIG_DIR/config.toml)
	#[arg(long, short, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Directory holding command sources
	#[arg(long, value_name = "DIR")]
	commands_dir: Option<PathBuf>,

	/// Directory receiving compiled commands
	#[arg(long, value_name = "DIR")]
	packages_dir: Option<PathBuf>,

	/// Disable coloured output
	#[arg(long)]
	no_color: bool,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let mut config = ShellConfig::load(cli.config.as_deref()).context("failed to load config")?;
	if let Some(dir) = cli.commands_dir {
		config.commands_dir = dir;
	}
	if let Some(dir) = cli.packages_dir {
		config.packages_dir = dir;
	}
	if cli.no_color || !std::io::stdout().is_terminal() {
		config.color = false;
	}

	let history = config.history.then(history_path).flatten();
	let mut source = Readline::new(history).context("failed to open terminal")?;
	let mut shell = Shell::from_config(&config);

	info!(
		commands = %config.commands_dir.display(),
		packages = %config.packages_dir.display(),
		"starting dynsh"
	);

	let (mut stdout, mut stderr) = (std::io::stdout(), std::io::stderr());
	shell.run(&mut source, &mut Streams::new(&mut stdout, &mut stderr));
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use std::fs::OpenOptions;

	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("dynsh=debug,info")
			} else {
				EnvFilter::new("warn")
			}
		})
	};

	// DYNSH_LOG_DIR keeps diagnostics out of the interactive terminal
	if let Some(log_dir) = std::env::var("DYNSH_LOG_DIR").ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("dynsh.{}.log", std::process::id()));
		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer()
				.with_writer(file)
				.with_ansi(false)
				.with_target(true);

			tracing_subscriber::registry()
				.with(filter())
				.with(file_layer)
				.init();

			tracing::info!(path = ?log_path, "tracing initialized");
			return;
		}
	}

	tracing_subscriber::fmt()
		.with_env_filter(filter())
		.with_writer(std::io::stderr)
		.init();
}
