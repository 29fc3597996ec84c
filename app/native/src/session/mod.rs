//! Session lifecycle.
//!
//! A session is either disabled or enabled. Enabling subscribes a group of
//! host triggers that schedule resize passes; disabling removes the group and
//! rebalances the layout.
//!
//! Controllers are plain values owning their host. One default process-wide
//! controller can be installed for the command surface to bind to.

mod controller;
pub mod queue;

use std::fmt;
use std::sync::OnceLock;

pub use controller::SessionController;
use parking_lot::Mutex;
pub use queue::{ScheduledApply, TaskQueue};
use serde::Serialize;

use crate::host::{Host, SubscriptionId};

/// Name of the subscription group a session registers.
pub const GROUP_NAME: &str = "aurea";

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Enabled,
    Disabled,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        })
    }
}

/// Enabled flag and the handle of the registered trigger group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Whether triggers schedule resize passes.
    pub enabled: bool,
    /// Handle of the registered group, set while enabled.
    pub group: Option<SubscriptionId>,
}

impl SessionState {
    /// Returns the current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.enabled { SessionPhase::Enabled } else { SessionPhase::Disabled }
    }
}

// ============================================================================
// Default controller
// ============================================================================

/// Controller type of the default process-wide instance.
pub type DefaultController = SessionController<Box<dyn Host + Send>>;

static DEFAULT_CONTROLLER: OnceLock<Mutex<DefaultController>> = OnceLock::new();

/// Installs the default controller.
///
/// Returns `false` if one was already installed; the existing instance is kept.
pub fn install_default(controller: DefaultController) -> bool {
    DEFAULT_CONTROLLER.set(Mutex::new(controller)).is_ok()
}

/// Runs `f` with exclusive access to the default controller.
///
/// Returns `None` if no default controller was installed.
pub fn with_default<R>(f: impl FnOnce(&mut DefaultController) -> R) -> Option<R> {
    DEFAULT_CONTROLLER.get().map(|controller| f(&mut controller.lock()))
}
