//! Theora Frontend CLI - command-line entry point.
//!
//! A thin presentation layer over `theorafront_core`: parses arguments,
//! loads configuration and renders probe results and live encode
//! progress to the terminal.

use anyhow::Result;
use clap::Parser;

use theorafront_core::config::ConfigManager;

mod args;
mod commands;
mod options;

use args::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let mut config = ConfigManager::new(&cli.config);
    if let Err(e) = config.load_or_create() {
        tracing::warn!(
            "failed to load config {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
    }

    tracing::debug!("core version {}", theorafront_core::version());

    match cli.command {
        Command::Info(cmd) => commands::info::run(cmd, config.settings()),
        Command::Encode(cmd) => commands::encode::run(cmd, config.settings()),
    }
}

/// Stderr logging; `RUST_LOG` is respected, `-v` raises the default.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
