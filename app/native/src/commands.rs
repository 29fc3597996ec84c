//! Command surface.
//!
//! Each command maps to one [`SessionController`] method. Failures are shown
//! to the user through the host at the level their kind dictates; they are
//! never returned to the caller.

use serde_json::Value;

use crate::host::{Host, NoticeLevel};
use crate::session::SessionController;

/// A user-facing command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Enable,
    Disable,
    Toggle,
    ResizeNow,
    ToggleWidescreen,
    /// Set the width multiplier from raw user input.
    Adjust(String),
    /// Replace one configuration value.
    Set {
        key: String,
        value: Value,
    },
}

/// Executes a command, reporting failures as host notices.
///
/// Returns `true` if the command succeeded.
pub fn execute<H: Host>(controller: &mut SessionController<H>, command: Command) -> bool {
    tracing::debug!(?command, "executing command");

    let result = match command {
        Command::Enable => controller.enable().map(drop),
        Command::Disable => controller.disable(),
        Command::Toggle => controller.toggle().map(|phase| {
            controller.host_mut().notify(NoticeLevel::Info, &format!("aurea {phase}"));
        }),
        Command::ResizeNow => {
            controller.resize_now();
            Ok(())
        }
        Command::ToggleWidescreen => {
            controller.toggle_widescreen();
            Ok(())
        }
        Command::Adjust(text) => controller.set_adjust_factor_arg(&text).map(drop),
        Command::Set { key, value } => controller.set(&key, value),
    };

    match result {
        Ok(()) => true,
        Err(err) => {
            controller.host_mut().notify(err.notice_level(), &err.to_string());
            false
        }
    }
}
