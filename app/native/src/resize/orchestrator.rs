//! Resize pass orchestration.
//!
//! One pass runs the whole protocol against a [`Host`]:
//!
//! 1. Guard (enabled, active pane normal and not excluded, two normal panes)
//! 2. Snapshot excluded panes
//! 3. Detect eligible axes
//! 4. Compute the target size
//! 5. Rebalance every pane
//! 6. Resize the width, then the height, past the hysteresis thresholds
//! 7. Restore excluded panes to their snapshot size
//! 8. Recenter when configured
//!
//! Host failures in steps 5 to 8 are recorded in the report and logged at
//! debug level. They never abort the pass and never escape [`apply`].

use serde::Serialize;

use super::adjacency::{Axes, detect_axes};
use super::geometry::{ExcludedPaneInfo, ExcludedPanes, PaneGeometry, Target, compute_target};
use super::rules::{ExclusionReason, ExclusionRules};
use crate::config::ConfigStore;
use crate::host::{Host, HostError, Pane, PaneId};

// ============================================================================
// Report types
// ============================================================================

/// Why a pass did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The session is disabled.
    Disabled,
    /// The host reports no active pane, or it vanished.
    NoActivePane,
    /// The active pane is floating.
    ActiveFloating,
    /// The active pane is excluded.
    ActiveExcluded(ExclusionReason),
    /// Fewer than two normal panes exist.
    SinglePane,
    /// The host could not enumerate its panes or report the canvas.
    HostUnavailable,
}

/// Resize step a host failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// Rebalancing every pane.
    Equalize,
    /// Resizing the active pane's width.
    Width,
    /// Resizing the active pane's height.
    Height,
    /// Restoring an excluded pane.
    Restore,
    /// Recentering the active pane.
    Recenter,
}

/// A host operation that failed during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    /// Step the failure happened in.
    pub step: Step,
    /// Pane the operation targeted, `None` for host-wide operations.
    pub pane: Option<PaneId>,
    /// Host error message.
    pub error: String,
}

/// Outcome of a pass that got past the guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applied {
    /// Active pane the pass sized.
    pub active: PaneId,
    /// Computed target size.
    pub target: Target,
    /// Axes that were eligible.
    pub axes: Axes,
    /// Number of excluded panes in the snapshot.
    pub excluded: usize,
    /// The active pane ended the pass with another width than the rebalance
    /// gave it. A restored neighbor sharing the axis can undo the request.
    pub width_resized: bool,
    /// The active pane ended the pass with another height than the rebalance
    /// gave it.
    pub height_resized: bool,
    /// Host operations that failed.
    pub failures: Vec<StepFailure>,
}

/// Result of [`apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status")]
pub enum ApplyReport {
    /// The guard stopped the pass.
    Skipped {
        /// Why the pass did nothing.
        reason: SkipReason,
    },
    /// The pass ran.
    Applied(Applied),
}

impl ApplyReport {
    /// Returns the outcome if the pass ran.
    #[must_use]
    pub const fn applied(&self) -> Option<&Applied> {
        match self {
            Self::Applied(applied) => Some(applied),
            Self::Skipped { .. } => None,
        }
    }

    /// Returns the skip reason if the pass did nothing.
    #[must_use]
    pub const fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped { reason } => Some(*reason),
            Self::Applied(_) => None,
        }
    }

    const fn skipped(reason: SkipReason) -> Self { Self::Skipped { reason } }
}

// ============================================================================
// Guard
// ============================================================================

/// Reads every pane the host enumerates, dropping panes closed mid-query.
fn read_panes<H: Host + ?Sized>(host: &H) -> Option<Vec<Pane>> {
    let ids = match host.panes() {
        Ok(ids) => ids,
        Err(err) => {
            tracing::debug!(error = %err, "failed to enumerate panes");
            return None;
        }
    };
    Some(ids.into_iter().filter_map(|id| host.pane(id).ok()).collect())
}

/// Decides whether a pass may resize the active pane.
///
/// # Errors
///
/// Returns the reason the pass must be skipped.
pub fn should_apply<H: Host + ?Sized>(
    host: &H,
    rules: &ExclusionRules,
    active: &Pane,
    panes: &[Pane],
) -> Result<(), SkipReason> {
    if active.floating {
        return Err(SkipReason::ActiveFloating);
    }
    if let Some(reason) = rules.classify(active, host.content(active.content).as_ref()) {
        return Err(SkipReason::ActiveExcluded(reason));
    }
    if panes.iter().filter(|pane| pane.is_normal()).count() < 2 {
        return Err(SkipReason::SinglePane);
    }
    Ok(())
}

/// Records the geometry of every excluded normal pane other than the active one.
fn snapshot_excluded<H: Host + ?Sized>(
    host: &H,
    rules: &ExclusionRules,
    active: PaneId,
    panes: &[Pane],
) -> ExcludedPanes {
    panes
        .iter()
        .filter(|pane| pane.is_normal() && pane.id != active)
        .filter(|pane| rules.is_excluded(pane, host.content(pane.content).as_ref()))
        .map(|pane| (pane.id, ExcludedPaneInfo::from(&pane.geometry)))
        .collect()
}

// ============================================================================
// Pass
// ============================================================================

/// Runs one resize pass for the active pane.
///
/// # Arguments
///
/// * `host` - Host to query and resize
/// * `store` - Configuration and exclusion rules
/// * `active` - The pane to size, usually `host.active_pane()`
/// * `enabled` - Whether the session is enabled
pub fn apply<H: Host + ?Sized>(
    host: &mut H,
    store: &ConfigStore,
    active: Option<PaneId>,
    enabled: bool,
) -> ApplyReport {
    if !enabled {
        return ApplyReport::skipped(SkipReason::Disabled);
    }
    let Some(active_id) = active else {
        return ApplyReport::skipped(SkipReason::NoActivePane);
    };

    let config = store.config();
    let rules = store.rules();

    let Some(panes) = read_panes(&*host) else {
        return ApplyReport::skipped(SkipReason::HostUnavailable);
    };
    let Some(active_pane) = panes.iter().find(|pane| pane.id == active_id) else {
        return ApplyReport::skipped(SkipReason::NoActivePane);
    };
    if let Err(reason) = should_apply(&*host, rules, active_pane, &panes) {
        if config.debug {
            tracing::debug!(pane = %active_id, ?reason, "resize skipped");
        }
        return ApplyReport::skipped(reason);
    }

    let excluded = snapshot_excluded(&*host, rules, active_id, &panes);
    let normal: Vec<Pane> = panes.iter().filter(|pane| pane.is_normal()).cloned().collect();
    let axes = detect_axes(active_pane, &normal);

    let canvas = match host.canvas() {
        Ok(canvas) => canvas,
        Err(err) => {
            tracing::debug!(error = %err, "failed to read canvas size");
            return ApplyReport::skipped(SkipReason::HostUnavailable);
        }
    };
    let target = compute_target(canvas, &active_pane.geometry, &excluded, config);
    let before = active_pane.geometry;

    let mut failures = Vec::new();
    let mut record = |step: Step, pane: Option<PaneId>, err: &HostError| {
        tracing::debug!(?step, pane = ?pane, error = %err, "host operation failed");
        failures.push(StepFailure {
            step,
            pane,
            error: err.to_string(),
        });
    };

    if let Err(err) = host.equalize() {
        record(Step::Equalize, None, &err);
    }

    // Sizes are measured after the rebalance.
    let current: PaneGeometry = host.pane(active_id).map_or(before, |pane| pane.geometry);

    let mut width_resized = false;
    if axes.vertical && target.width.abs_diff(current.width) >= config.minimal_width_change {
        match host.set_width(active_id, target.width) {
            Ok(()) => width_resized = true,
            Err(err) => record(Step::Width, Some(active_id), &err),
        }
    }

    let mut height_resized = false;
    if axes.horizontal && target.height.abs_diff(current.height) >= config.minimal_height_change {
        match host.set_height(active_id, target.height) {
            Ok(()) => height_resized = true,
            Err(err) => record(Step::Height, Some(active_id), &err),
        }
    }

    for (&id, info) in &excluded {
        if let Err(err) = host.set_width(id, info.width) {
            record(Step::Restore, Some(id), &err);
        }
        if let Err(err) = host.set_height(id, info.height) {
            record(Step::Restore, Some(id), &err);
        }
    }

    let settled = host.pane(active_id).map_or(current, |pane| pane.geometry);
    let width_resized = width_resized && settled.width != current.width;
    let height_resized = height_resized && settled.height != current.height;

    if config.recenter {
        if let Err(err) = host.center_cursor(active_id) {
            record(Step::Recenter, Some(active_id), &err);
        }
    }

    if config.debug {
        tracing::debug!(
            pane = %active_id,
            canvas = ?canvas,
            target = ?target,
            axes = ?axes,
            excluded = excluded.len(),
            width_resized,
            height_resized,
            failures = failures.len(),
            "resize pass finished"
        );
    }

    ApplyReport::Applied(Applied {
        active: active_id,
        target,
        axes,
        excluded: excluded.len(),
        width_resized,
        height_resized,
        failures,
    })
}
