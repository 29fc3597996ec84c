//! CLI module for Aurea.
//!
//! This module provides the command-line interface tmux key bindings and hooks
//! call into. Each invocation loads the configuration, resumes the session the
//! tmux server carries and runs a single command.

mod commands;
mod output;

use std::io;
use std::process::ExitCode;

use clap::Parser;
pub use commands::Cli;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::{AureaError, AureaResult};

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or tmux cannot be
/// reached.
pub fn run() -> AureaResult<ExitCode> {
    let cli = Cli::parse();

    if !cli.needs_session() {
        return cli.execute_standalone();
    }

    // Warnings raised while loading are shown before the configured filter exists.
    let fallback = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::WARN)
        .finish();
    let (options, store, config_path) = tracing::subscriber::with_default(fallback, || {
        let (config, config_path) = cli.load_config()?;
        let (options, store) = Cli::open_store(config)?;
        Ok::<_, AureaError>((options, store, config_path))
    })?;

    init_tracing(filter_directive(cli.verbose, store.config()));
    Ok(cli.execute_session(&options, store, config_path.as_deref()))
}

/// Returns the default filter for the effective configuration.
const fn filter_directive(verbose: bool, config: &Config) -> &'static str {
    if verbose || config.debug { "aurea=debug,aurea_lib=debug" } else { "aurea=warn,aurea_lib=warn" }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `fallback`.
fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    if tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
