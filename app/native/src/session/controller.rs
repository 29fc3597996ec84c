use serde_json::Value;

use super::queue::{ScheduledApply, TaskQueue};
use super::{GROUP_NAME, SessionPhase, SessionState};
use crate::config::ConfigStore;
use crate::error::{AureaError, AureaResult};
use crate::host::{Host, Trigger};
use crate::resize::orchestrator::{self, ApplyReport};

/// Drives resize passes for one host.
///
/// Owns the host, the configuration store, the session state and the queue
/// of scheduled passes.
#[derive(Debug)]
pub struct SessionController<H: Host> {
    host: H,
    store: ConfigStore,
    state: SessionState,
    queue: TaskQueue,
}

impl<H: Host> SessionController<H> {
    /// Creates a disabled controller.
    pub fn new(host: H, store: ConfigStore) -> Self {
        Self {
            host,
            store,
            state: SessionState::default(),
            queue: TaskQueue::new(),
        }
    }

    /// Creates a controller that picks up a session the host already carries.
    ///
    /// The session counts as enabled when the host has the trigger group
    /// registered, e.g. by an earlier invocation of the binary.
    pub fn resume(host: H, store: ConfigStore) -> Self {
        let group = host.find_group(GROUP_NAME);
        Self {
            host,
            store,
            state: SessionState {
                enabled: group.is_some(),
                group,
            },
            queue: TaskQueue::new(),
        }
    }

    /// Returns the host.
    pub const fn host(&self) -> &H { &self.host }

    /// Returns the host mutably.
    pub const fn host_mut(&mut self) -> &mut H { &mut self.host }

    /// Returns the configuration store.
    pub const fn store(&self) -> &ConfigStore { &self.store }

    /// Returns the session state.
    pub const fn state(&self) -> SessionState { self.state }

    /// Returns the number of scheduled passes.
    pub fn pending(&self) -> usize { self.queue.len() }

    /// Subscribes the trigger group and sizes the active pane.
    ///
    /// # Errors
    ///
    /// - [`AureaError::AlreadyInState`] if the session is enabled
    /// - [`AureaError::Host`] if the host could not register the group
    pub fn enable(&mut self) -> AureaResult<ApplyReport> {
        if self.state.enabled {
            return Err(AureaError::AlreadyInState(SessionPhase::Enabled));
        }

        let group = self.host.subscribe(GROUP_NAME, &Trigger::ALL)?;
        self.state = SessionState {
            enabled: true,
            group: Some(group),
        };
        tracing::info!("session enabled");

        Ok(self.resize_now())
    }

    /// Removes the trigger group and rebalances every pane.
    ///
    /// # Errors
    ///
    /// - [`AureaError::AlreadyInState`] if the session is disabled
    /// - [`AureaError::Host`] if the host could not remove the group
    pub fn disable(&mut self) -> AureaResult<()> {
        if !self.state.enabled {
            return Err(AureaError::AlreadyInState(SessionPhase::Disabled));
        }

        if let Some(group) = self.state.group {
            self.host.unsubscribe(group)?;
        }
        if let Err(err) = self.host.equalize() {
            tracing::debug!(error = %err, "failed to rebalance after disable");
        }
        self.state = SessionState::default();
        tracing::info!("session disabled");
        Ok(())
    }

    /// Enables a disabled session or disables an enabled one.
    ///
    /// Returns the phase the session is in afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the host could not (un)register the trigger group.
    pub fn toggle(&mut self) -> AureaResult<SessionPhase> {
        if self.state.enabled {
            self.disable()?;
        } else {
            self.enable()?;
        }
        Ok(self.state.phase())
    }

    /// Switches the width multiplier between 1.0 and the widescreen factor,
    /// then sizes the active pane.
    pub fn toggle_widescreen(&mut self) -> ApplyReport {
        let factor = self.store.toggle_widescreen();
        tracing::info!(factor, "widescreen toggled");
        self.resize_now()
    }

    /// Sets the width multiplier, then sizes the active pane.
    ///
    /// # Errors
    ///
    /// Returns [`AureaError::InvalidConfigValue`] if the factor is not
    /// greater than zero.
    pub fn set_adjust_factor(&mut self, factor: f64) -> AureaResult<ApplyReport> {
        self.store.set_adjust_factor(factor)?;
        Ok(self.resize_now())
    }

    /// Parses a command argument as the width multiplier and applies it.
    ///
    /// # Errors
    ///
    /// Returns [`AureaError::InvalidFactorArgument`] if the text is not a
    /// finite number; nothing is changed and no pass runs.
    pub fn set_adjust_factor_arg(&mut self, text: &str) -> AureaResult<ApplyReport> {
        let factor = parse_factor(text)?;
        self.set_adjust_factor(factor)
    }

    /// Replaces one configuration value.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value invalid; the
    /// configuration is left untouched.
    pub fn set(&mut self, key: &str, value: Value) -> AureaResult<()> {
        self.store.set(key, value).inspect_err(|err| {
            tracing::warn!(key, error = %err, "rejected configuration update");
        })
    }

    /// Runs one resize pass for the active pane right away.
    pub fn resize_now(&mut self) -> ApplyReport {
        let active = self.host.active_pane();
        orchestrator::apply(&mut self.host, &self.store, active, self.state.enabled)
    }

    /// Handles a host trigger by scheduling a pass.
    ///
    /// Returns `false` if the session is disabled and nothing was scheduled.
    pub fn on_trigger(&self, trigger: Trigger) -> bool {
        if !self.state.enabled {
            return false;
        }
        tracing::debug!(%trigger, "resize scheduled");
        self.queue.push(ScheduledApply { trigger });
        true
    }

    /// Runs every scheduled pass in order, each against the active pane at
    /// the time it runs.
    pub fn run_pending(&mut self) -> Vec<ApplyReport> {
        self.queue.take_all().into_iter().map(|_| self.resize_now()).collect()
    }
}

fn parse_factor(text: &str) -> AureaResult<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|factor| factor.is_finite())
        .ok_or_else(|| AureaError::InvalidFactorArgument(text.to_string()))
}
