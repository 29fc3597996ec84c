//! Golden-ratio resize engine.
//!
//! The pure core lives in [`geometry`], [`adjacency`] and [`rules`]: plain
//! functions of explicit inputs, testable without a host. [`orchestrator`]
//! sequences them against a [`Host`](crate::host::Host).

pub mod adjacency;
pub mod constants;
pub mod geometry;
pub mod orchestrator;
pub mod rules;

pub use adjacency::{Axes, detect_axes};
pub use geometry::{
    AvailableSpace, Canvas, ExcludedPaneInfo, ExcludedPanes, PaneGeometry, Target, available_space,
    compute_target, scale_factor,
};
pub use orchestrator::{ApplyReport, SkipReason, apply, should_apply};
pub use rules::{ExclusionReason, ExclusionRules};
