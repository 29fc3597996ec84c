#![allow(clippy::multiple_crate_versions)]

//! Aurea - golden-ratio auto-resizing for the focused tmux pane.
//!
//! This binary serves both the command surface bound to tmux keys and the
//! hooks tmux runs on focus, resize and split events.

use std::process::ExitCode;

fn main() -> ExitCode {
    match aurea_lib::cli::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("aurea: {err}");
            ExitCode::FAILURE
        }
    }
}
