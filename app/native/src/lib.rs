//! Aurea - golden-ratio auto-resizing for the focused pane of a split layout.
//!
//! The library holds the pure sizing core ([`resize`]), the host capability
//! interface it drives ([`host`]), the session that wires both to events
//! ([`session`]) and the command surface built on top ([`commands`], [`cli`]).

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod resize;
pub mod schema;
pub mod session;
