//! CLI command definitions using Clap.
//!
//! Session commands run against the tmux server the binary is invoked from.
//! Every invocation resumes the session the server carries, applies the
//! persisted runtime overrides, runs one command and exits.
//!
//! - `config_cmd` - Configuration file commands
//! - `inspect` - Status and pane table output

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Generator, Shell, generate};
use serde_json::{Map, Value};

use crate::commands::{self, Command};
use crate::config::{self, Config, ConfigStore};
use crate::error::AureaResult;
use crate::host::Trigger;
use crate::host::tmux::{OVERRIDES_OPTION, TmuxHost};
use crate::schema;
use crate::session::{self, DefaultController, SessionController};

pub mod config_cmd;
pub mod inspect;

pub use config_cmd::ConfigCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Aurea CLI - golden-ratio sizing for the focused tmux pane.
#[derive(Parser, Debug)]
#[command(name = "aurea")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Install the tmux hooks and size the focused pane.
    Enable,

    /// Remove the tmux hooks and spread all panes evenly.
    Disable,

    /// Enable when disabled, disable when enabled.
    Toggle,

    /// Size the focused pane now.
    Resize,

    /// Switch between the default and the widescreen width factor.
    Widescreen,

    /// Set the width factor of the focused pane.
    #[command(after_long_help = r#"Examples:
  aurea adjust 0.8    # Narrower focused pane
  aurea adjust 1      # Back to the default width"#)]
    Adjust {
        /// Width multiplier, greater than 0.
        #[arg(allow_hyphen_values = true)]
        factor: String,
    },

    /// Change one configuration value until tmux exits.
    ///
    /// The value is parsed as JSON; anything that is not valid JSON is taken
    /// as a string.
    #[command(after_long_help = r#"Examples:
  aurea set ratio 1.5
  aurea set max_width 120
  aurea set exclude_buffer_patterns '["^term://"]'"#)]
    Set {
        /// Configuration key.
        key: String,

        /// New value.
        value: String,
    },

    /// Show the session state and the active configuration.
    Status {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// List the panes of the current window with their exclusion state.
    Inspect,

    /// Handle a tmux hook.
    #[command(hide = true)]
    Trigger {
        /// Event that fired.
        #[arg(value_enum)]
        kind: TriggerKind,
    },

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    ///
    /// Can be redirected to a file for use with editors that support JSON
    /// Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(aurea completions --shell zsh)"
    ///   aurea completions --shell fish > ~/.config/fish/completions/aurea.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

/// Events a tmux hook reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TriggerKind {
    Focus,
    Resized,
    Entered,
}

impl From<TriggerKind> for Trigger {
    fn from(kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::Focus => Self::FocusChanged,
            TriggerKind::Resized => Self::CanvasResized,
            TriggerKind::Entered => Self::ContentEntered,
        }
    }
}

impl Commands {
    /// Maps session commands onto the command surface.
    fn as_session_command(&self) -> Option<Command> {
        Some(match self {
            Self::Enable => Command::Enable,
            Self::Disable => Command::Disable,
            Self::Toggle => Command::Toggle,
            Self::Resize => Command::ResizeNow,
            Self::Widescreen => Command::ToggleWidescreen,
            Self::Adjust { factor } => Command::Adjust(factor.clone()),
            Self::Set { key, value } => Command::Set {
                key: key.clone(),
                value: parse_value(value),
            },
            _ => return None,
        })
    }
}

/// Parses a `set` value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

impl Cli {
    /// Returns true if the command needs the configuration and a session.
    #[must_use]
    pub const fn needs_session(&self) -> bool {
        !matches!(
            self.command,
            Commands::Config(_) | Commands::Schema | Commands::Completions { .. }
        )
    }

    /// Loads the configuration from `--config` or the search paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be loaded.
    pub fn load_config(&self) -> AureaResult<(Config, Option<PathBuf>)> {
        match &self.config {
            Some(path) => Ok((config::load_config_from_path(path)?, Some(path.clone()))),
            None => config::load_config(),
        }
    }

    /// Executes a command that needs no session.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn execute_standalone(&self) -> AureaResult<ExitCode> {
        match &self.command {
            Commands::Config(cmd) => config_cmd::execute(cmd)?,
            Commands::Schema => println!("{}", schema::generate_schema_json()),
            Commands::Completions { shell } => Self::print_completions(*shell),
            _ => {}
        }
        Ok(ExitCode::SUCCESS)
    }

    /// Connects to tmux and builds the store from the file configuration and
    /// the runtime overrides the server carries.
    ///
    /// # Errors
    ///
    /// Returns an error if tmux cannot be reached or the configuration is
    /// invalid.
    pub fn open_store(config: Config) -> AureaResult<(TmuxHost, ConfigStore)> {
        let options = TmuxHost::new()?;
        let store = store_with_overrides(config, &read_overrides(&options))?;
        Ok((options, store))
    }

    /// Executes a session command against tmux.
    pub fn execute_session(
        &self,
        options: &TmuxHost,
        store: ConfigStore,
        config_path: Option<&Path>,
    ) -> ExitCode {
        let controller: DefaultController =
            SessionController::resume(Box::new(options.clone()), store);
        if !session::install_default(controller) {
            tracing::debug!("default controller already installed");
        }

        if let Some(command) = self.command.as_session_command() {
            return run_command(options, command);
        }

        session::with_default(|controller| match &self.command {
            Commands::Status { json } => {
                inspect::print_status(controller.state(), controller.store(), config_path, *json);
            }
            Commands::Inspect => {
                let rows = inspect::pane_rows(controller.host(), controller.store());
                let summary = inspect::target_summary(controller.host(), controller.store());
                inspect::print_inspect(rows, &summary);
            }
            Commands::Trigger { kind } => {
                if controller.on_trigger((*kind).into()) {
                    for report in controller.run_pending() {
                        tracing::debug!(?report, "trigger pass finished");
                    }
                }
            }
            _ => {}
        });
        ExitCode::SUCCESS
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "aurea", &mut io::stdout());
    }
}

/// Runs a command on the default controller and persists the override it made.
fn run_command(options: &TmuxHost, command: Command) -> ExitCode {
    let persisted_key = match &command {
        Command::Adjust(_) | Command::ToggleWidescreen => Some("adjust_factor".to_string()),
        Command::Set { key, .. } => Some(key.clone()),
        _ => None,
    };

    let outcome = session::with_default(|controller| {
        let succeeded = commands::execute(controller, command);
        let persisted = persisted_key.filter(|_| succeeded).and_then(|key| {
            let value = serde_json::to_value(controller.store().config()).ok()?.get(&key)?.clone();
            Some((key, value))
        });
        (succeeded, persisted)
    });

    match outcome {
        Some((true, persisted)) => {
            if let Some((key, value)) = persisted {
                persist_override(options, key, value);
            }
            ExitCode::SUCCESS
        }
        _ => ExitCode::FAILURE,
    }
}

fn read_overrides(options: &TmuxHost) -> Map<String, Value> {
    match options.user_option(OVERRIDES_OPTION) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring malformed {OVERRIDES_OPTION}");
            Map::new()
        }),
        Ok(None) => Map::new(),
        Err(err) => {
            tracing::debug!(error = %err, "failed to read runtime overrides");
            Map::new()
        }
    }
}

/// Builds a store from `config` with `overrides` applied on top.
///
/// # Errors
///
/// Returns an error if `config` itself is invalid. Overrides that no longer
/// apply are skipped.
pub fn store_with_overrides(config: Config, overrides: &Map<String, Value>) -> AureaResult<ConfigStore> {
    let mut store = ConfigStore::new(config)?;
    apply_overrides(&mut store, overrides);
    Ok(store)
}

fn apply_overrides(store: &mut ConfigStore, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        if let Err(err) = store.set(key, value.clone()) {
            tracing::warn!(key = %key, error = %err, "ignoring stale runtime override");
        }
    }
}

fn persist_override(options: &TmuxHost, key: String, value: Value) {
    let mut overrides = read_overrides(options);
    overrides.insert(key, value);
    let raw = Value::Object(overrides).to_string();
    if let Err(err) = options.set_user_option(OVERRIDES_OPTION, &raw) {
        tracing::warn!(error = %err, "failed to persist runtime override");
    }
}
