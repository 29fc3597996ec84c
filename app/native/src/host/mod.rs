//! Host capability interface.
//!
//! The resize engine never talks to an editor or multiplexer directly. Every
//! query, mutation, subscription and notice goes through the [`Host`] trait,
//! which keeps the geometry core free of I/O and lets the same orchestration
//! drive very different hosts.
//!
//! # Implementations
//!
//! - [`memory::MemoryHost`]: an in-memory split tree, used by tests and benches
//! - [`tmux::TmuxHost`]: drives a running tmux server through its CLI

pub mod memory;
pub mod tmux;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resize::geometry::{Canvas, PaneGeometry};

/// Result type alias for host operations.
pub type HostResult<T> = Result<T, HostError>;

// ============================================================================
// Identities
// ============================================================================

/// Opaque handle of a pane, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PaneId(pub u32);

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "pane:{}", self.0) }
}

/// Opaque handle of the content displayed in a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentId(pub u32);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "content:{}", self.0) }
}

/// Handle of a registered subscription group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

// ============================================================================
// Pane snapshot types
// ============================================================================

/// A pane as reported by the host at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pane {
    /// Pane identity.
    pub id: PaneId,
    /// Position and size on the canvas.
    pub geometry: PaneGeometry,
    /// Content displayed in the pane.
    pub content: ContentId,
    /// Floating/overlay panes never take part in the tiled layout.
    pub floating: bool,
}

impl Pane {
    /// Returns true if the pane participates in the tiled layout.
    #[must_use]
    pub const fn is_normal(&self) -> bool { !self.floating }
}

/// Name and type tag of a content identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentInfo {
    /// Content identity this info describes.
    pub id: ContentId,
    /// Content name (a buffer name, a pane title).
    pub name: String,
    /// Filetype-equivalent tag (a filetype, a running command).
    pub filetype: String,
}

// ============================================================================
// Events and notices
// ============================================================================

/// Layout-affecting host events a session subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    /// Focus moved to another pane.
    FocusChanged,
    /// The canvas itself changed size.
    CanvasResized,
    /// Content was displayed in a pane (a new split, a buffer switch).
    ContentEntered,
}

impl Trigger {
    /// Every trigger a session subscribes to, in registration order.
    pub const ALL: [Self; 3] = [Self::FocusChanged, Self::CanvasResized, Self::ContentEntered];

    /// Returns the stable name of the trigger.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FocusChanged => "focus",
            Self::CanvasResized => "resized",
            Self::ContentEntered => "entered",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoticeLevel {
    /// Informational message.
    Info,
    /// Something was ignored.
    Warn,
    /// Something was rejected.
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors reported by host operations.
#[derive(Debug, Error)]
pub enum HostError {
    /// The pane does not exist (anymore).
    #[error("{0} not found")]
    PaneNotFound(PaneId),

    /// The host refused the requested size or operation.
    #[error("{pane} rejected the request: {reason}")]
    Rejected {
        /// Pane the request targeted.
        pane: PaneId,
        /// Reason given by the host.
        reason: String,
    },

    /// An external host command exited unsuccessfully.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        /// The command line that was run.
        command: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The host produced output that could not be understood.
    #[error("unexpected host output: {0}")]
    Parse(String),

    /// The host cannot perform this operation at all.
    #[error("operation not supported by this host: {0}")]
    Unsupported(&'static str),

    /// Spawning or talking to the host failed.
    #[error("host I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Host trait
// ============================================================================

/// Capabilities the resize engine needs from its host.
///
/// Query methods must reflect the host's state at call time; the engine never
/// caches their results across resize passes.
pub trait Host {
    /// Returns the size of the whole canvas.
    fn canvas(&self) -> HostResult<Canvas>;

    /// Returns the pane currently receiving focus, if any.
    fn active_pane(&self) -> Option<PaneId>;

    /// Enumerates every pane of the current view, floating ones included.
    fn panes(&self) -> HostResult<Vec<PaneId>>;

    /// Returns a snapshot of one pane.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::PaneNotFound`] if the pane was closed.
    fn pane(&self, id: PaneId) -> HostResult<Pane>;

    /// Resolves a content identity, or `None` when it is invalid or destroyed.
    fn content(&self, id: ContentId) -> Option<ContentInfo>;

    /// Requests a new height for a pane.
    ///
    /// # Errors
    ///
    /// Returns an error if the pane is gone or the host rejects the size.
    fn set_height(&mut self, id: PaneId, height: u32) -> HostResult<()>;

    /// Requests a new width for a pane.
    ///
    /// # Errors
    ///
    /// Returns an error if the pane is gone or the host rejects the size.
    fn set_width(&mut self, id: PaneId, width: u32) -> HostResult<()>;

    /// Rebalances every pane evenly.
    ///
    /// # Errors
    ///
    /// Returns an error if the host could not rebalance.
    fn equalize(&mut self) -> HostResult<()>;

    /// Centers the viewport of a pane on its cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if the pane is gone or the host has no viewport.
    fn center_cursor(&mut self, id: PaneId) -> HostResult<()>;

    /// Registers a named group of handlers for the given triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the host could not register the group.
    fn subscribe(&mut self, group: &str, triggers: &[Trigger]) -> HostResult<SubscriptionId>;

    /// Removes a previously registered group.
    ///
    /// # Errors
    ///
    /// Returns an error if the host could not remove the group.
    fn unsubscribe(&mut self, id: SubscriptionId) -> HostResult<()>;

    /// Looks up a registered group by name.
    fn find_group(&self, group: &str) -> Option<SubscriptionId>;

    /// Shows a message to the user.
    fn notify(&mut self, level: NoticeLevel, message: &str);
}

impl<H: Host + ?Sized> Host for Box<H> {
    fn canvas(&self) -> HostResult<Canvas> { (**self).canvas() }

    fn active_pane(&self) -> Option<PaneId> { (**self).active_pane() }

    fn panes(&self) -> HostResult<Vec<PaneId>> { (**self).panes() }

    fn pane(&self, id: PaneId) -> HostResult<Pane> { (**self).pane(id) }

    fn content(&self, id: ContentId) -> Option<ContentInfo> { (**self).content(id) }

    fn set_height(&mut self, id: PaneId, height: u32) -> HostResult<()> {
        (**self).set_height(id, height)
    }

    fn set_width(&mut self, id: PaneId, width: u32) -> HostResult<()> {
        (**self).set_width(id, width)
    }

    fn equalize(&mut self) -> HostResult<()> { (**self).equalize() }

    fn center_cursor(&mut self, id: PaneId) -> HostResult<()> { (**self).center_cursor(id) }

    fn subscribe(&mut self, group: &str, triggers: &[Trigger]) -> HostResult<SubscriptionId> {
        (**self).subscribe(group, triggers)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> HostResult<()> { (**self).unsubscribe(id) }

    fn find_group(&self, group: &str) -> Option<SubscriptionId> { (**self).find_group(group) }

    fn notify(&mut self, level: NoticeLevel, message: &str) { (**self).notify(level, message) }
}
