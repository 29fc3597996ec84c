//! Geometry engine: available space and golden-ratio targets.
//!
//! Everything here is a pure function of its inputs. The orchestrator feeds
//! it the canvas, the active pane and a snapshot of the excluded panes, and
//! gets back the size the active pane should have.
//!
//! # Algorithm
//!
//! 1. Start from the full canvas.
//! 2. Every excluded pane that shares rows with the active pane sits beside
//!    it, so its width is taken from the available columns.
//! 3. Every excluded pane that shares columns with the active pane is stacked
//!    with it, so its height is taken from the available lines.
//! 4. Divide both by the ratio, scale the width and cap it at `max_width`.
//!
//! A pane that shares both rows and columns with the active pane is
//! subtracted on both axes.

use std::collections::BTreeMap;

use serde::Serialize;

use super::constants::auto_scale;
use crate::config::Config;
use crate::host::PaneId;

// ============================================================================
// Types
// ============================================================================

/// Size of the whole canvas, in lines and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Canvas {
    /// Number of lines.
    pub lines: u32,
    /// Number of columns.
    pub columns: u32,
}

impl Canvas {
    /// Creates a new canvas size.
    #[must_use]
    pub const fn new(lines: u32, columns: u32) -> Self { Self { lines, columns } }
}

/// Position and size of a pane on the canvas.
///
/// Ends are exclusive: a pane at row 0 with height 10 covers rows `0..10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaneGeometry {
    /// First row covered by the pane.
    pub row_start: u32,
    /// First column covered by the pane.
    pub col_start: u32,
    /// Height in lines.
    pub height: u32,
    /// Width in columns.
    pub width: u32,
}

impl PaneGeometry {
    /// Creates a new pane geometry.
    #[must_use]
    pub const fn new(row_start: u32, col_start: u32, height: u32, width: u32) -> Self {
        Self {
            row_start,
            col_start,
            height,
            width,
        }
    }

    /// Row just past the bottom edge.
    #[must_use]
    pub const fn row_end(&self) -> u32 { self.row_start + self.height }

    /// Column just past the right edge.
    #[must_use]
    pub const fn col_end(&self) -> u32 { self.col_start + self.width }

    /// Returns true if both panes cover at least one common row.
    #[must_use]
    pub const fn shares_rows(&self, other: &Self) -> bool {
        ranges_overlap(self.row_start, self.row_end(), other.row_start, other.row_end())
    }

    /// Returns true if both panes cover at least one common column.
    #[must_use]
    pub const fn shares_columns(&self, other: &Self) -> bool {
        ranges_overlap(self.col_start, self.col_end(), other.col_start, other.col_end())
    }
}

/// Geometry of an excluded pane, captured once per resize pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExcludedPaneInfo {
    /// Width at snapshot time.
    pub width: u32,
    /// Height at snapshot time.
    pub height: u32,
    /// First covered row.
    pub row_start: u32,
    /// Row just past the bottom edge.
    pub row_end: u32,
    /// First covered column.
    pub col_start: u32,
    /// Column just past the right edge.
    pub col_end: u32,
}

impl From<&PaneGeometry> for ExcludedPaneInfo {
    fn from(geometry: &PaneGeometry) -> Self {
        Self {
            width: geometry.width,
            height: geometry.height,
            row_start: geometry.row_start,
            row_end: geometry.row_end(),
            col_start: geometry.col_start,
            col_end: geometry.col_end(),
        }
    }
}

/// Snapshot of every excluded pane in one resize pass.
pub type ExcludedPanes = BTreeMap<PaneId, ExcludedPaneInfo>;

/// Space left for the active pane after excluded panes are accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailableSpace {
    /// Available lines, never negative.
    pub lines: u32,
    /// Available columns, never negative.
    pub columns: u32,
}

/// Target size of the active pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Target height in lines.
    pub height: u32,
    /// Target width in columns.
    pub width: u32,
}

// ============================================================================
// Computation
// ============================================================================

/// Returns true if the half-open ranges `a_start..a_end` and `b_start..b_end`
/// have at least one value in common.
#[inline]
#[must_use]
pub const fn ranges_overlap(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && b_start < a_end
}

/// Returns the width multiplier for a canvas of the given width.
///
/// With `auto_scale` the factor is derived from the canvas width: `1.0` at
/// 100 columns, decreasing linearly, never below `0.4`. Otherwise it is the
/// configured `adjust_factor`.
#[must_use]
pub fn scale_factor(config: &Config, canvas_columns: u32) -> f64 {
    if config.auto_scale {
        let columns = f64::from(canvas_columns);
        let factor = 1.0
            - ((columns - auto_scale::BASE_COLUMNS) / auto_scale::SPAN) * auto_scale::SLOPE;
        factor.max(auto_scale::FLOOR)
    } else {
        config.adjust_factor
    }
}

/// Computes the space the active pane can claim.
///
/// Excluded panes sharing rows with the active pane reduce the columns,
/// excluded panes sharing columns reduce the lines. Both results are clamped
/// at zero.
#[must_use]
pub fn available_space(
    canvas: Canvas,
    active: &PaneGeometry,
    excluded: &ExcludedPanes,
) -> AvailableSpace {
    let mut lines = i64::from(canvas.lines);
    let mut columns = i64::from(canvas.columns);

    for info in excluded.values() {
        if ranges_overlap(info.row_start, info.row_end, active.row_start, active.row_end()) {
            columns -= i64::from(info.width);
        }
        if ranges_overlap(info.col_start, info.col_end, active.col_start, active.col_end()) {
            lines -= i64::from(info.height);
        }
    }

    AvailableSpace {
        lines: clamp_to_u32(lines),
        columns: clamp_to_u32(columns),
    }
}

/// Computes the target size of the active pane.
///
/// # Arguments
///
/// * `canvas` - Size of the whole canvas
/// * `active` - Geometry of the active pane
/// * `excluded` - Snapshot of excluded panes for this pass
/// * `config` - Ratio, scale and cap settings
///
/// # Returns
///
/// `floor(lines / ratio)` and `floor(columns / ratio * scale)`, the latter
/// capped at `max_width` when it is set and positive.
#[must_use]
pub fn compute_target(
    canvas: Canvas,
    active: &PaneGeometry,
    excluded: &ExcludedPanes,
    config: &Config,
) -> Target {
    let space = available_space(canvas, active, excluded);
    let scale = scale_factor(config, canvas.columns);

    let height = floor_to_u32(f64::from(space.lines) / config.ratio);
    let mut width = floor_to_u32((f64::from(space.columns) / config.ratio) * scale);

    if let Some(max_width) = config.max_width.filter(|&max| max > 0) {
        width = width.min(max_width);
    }

    Target { height, width }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamped to u32 range first
fn floor_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.floor().clamp(0.0, f64::from(u32::MAX)) as u32
}

fn clamp_to_u32(value: i64) -> u32 { u32::try_from(value.max(0)).unwrap_or(u32::MAX) }

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config { Config::default() }

    fn excluded(entries: &[(u32, PaneGeometry)]) -> ExcludedPanes {
        entries.iter().map(|(id, geometry)| (PaneId(*id), ExcludedPaneInfo::from(geometry))).collect()
    }

    #[test]
    fn test_geometry_ends_are_exclusive() {
        let geometry = PaneGeometry::new(2, 10, 20, 30);
        assert_eq!(geometry.row_end(), 22);
        assert_eq!(geometry.col_end(), 40);
    }

    #[test]
    fn test_touching_ranges_do_not_overlap() {
        assert!(!ranges_overlap(0, 10, 10, 20));
        assert!(ranges_overlap(0, 11, 10, 20));
    }

    #[test]
    fn test_zero_extent_range_inside_another_overlaps() {
        // Only the start bounds are compared against the other range's end.
        assert!(ranges_overlap(5, 5, 0, 10));
        assert!(!ranges_overlap(10, 10, 0, 10));
    }

    #[test]
    fn test_side_by_side_panes_share_rows_only() {
        let left = PaneGeometry::new(0, 0, 50, 100);
        let right = PaneGeometry::new(0, 100, 50, 100);
        assert!(left.shares_rows(&right));
        assert!(!left.shares_columns(&right));
    }

    #[test]
    fn test_scale_factor_uses_adjust_factor_without_auto_scale() {
        let config = Config {
            adjust_factor: 0.75,
            ..config()
        };
        assert!((scale_factor(&config, 300) - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_auto_scale_is_one_at_base_width() {
        let config = Config {
            auto_scale: true,
            ..config()
        };
        assert!((scale_factor(&config, 100) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_auto_scale_decreases_linearly() {
        let config = Config {
            auto_scale: true,
            ..config()
        };
        // 1.0 - (200 / 1000) * 1.8 = 0.64
        assert!((scale_factor(&config, 300) - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_auto_scale_is_floored() {
        let config = Config {
            auto_scale: true,
            ..config()
        };
        assert!((scale_factor(&config, 5000) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_target_without_excluded_panes() {
        let active = PaneGeometry::new(0, 0, 50, 100);
        let target = compute_target(Canvas::new(50, 200), &active, &ExcludedPanes::new(), &config());
        assert_eq!(target.height, 30);
        assert_eq!(target.width, 123);
    }

    #[test]
    fn test_max_width_caps_target() {
        let config = Config {
            max_width: Some(100),
            ..config()
        };
        let active = PaneGeometry::new(0, 0, 50, 100);
        let target = compute_target(Canvas::new(50, 200), &active, &ExcludedPanes::new(), &config);
        assert_eq!(target.width, 100);
    }

    #[test]
    fn test_zero_max_width_is_unset() {
        let config = Config {
            max_width: Some(0),
            ..config()
        };
        let active = PaneGeometry::new(0, 0, 50, 100);
        let target = compute_target(Canvas::new(50, 200), &active, &ExcludedPanes::new(), &config);
        assert_eq!(target.width, 123);
    }

    #[test]
    fn test_adjust_factor_scales_width_only() {
        let config = Config {
            adjust_factor: 0.8,
            ..config()
        };
        let active = PaneGeometry::new(0, 0, 50, 100);
        let target = compute_target(Canvas::new(50, 200), &active, &ExcludedPanes::new(), &config);
        // floor(200 / 1.618 * 0.8) = floor(98.88)
        assert_eq!(target.width, 98);
        assert_eq!(target.height, 30);
    }

    #[test]
    fn test_excluded_sidebar_reduces_columns() {
        let sidebar = PaneGeometry::new(0, 0, 50, 30);
        let active = PaneGeometry::new(0, 30, 50, 85);
        let space = available_space(Canvas::new(50, 200), &active, &excluded(&[(9, sidebar)]));
        assert_eq!(space.columns, 170);
        assert_eq!(space.lines, 50);
    }

    #[test]
    fn test_excluded_bottom_panel_reduces_lines() {
        let panel = PaneGeometry::new(40, 0, 10, 200);
        let active = PaneGeometry::new(0, 0, 40, 200);
        let space = available_space(Canvas::new(50, 200), &active, &excluded(&[(9, panel)]));
        assert_eq!(space.lines, 40);
        assert_eq!(space.columns, 200);
    }

    #[test]
    fn test_excluded_pane_elsewhere_is_ignored() {
        // Bottom-right quadrant does not share rows or columns with top-left
        let quadrant = PaneGeometry::new(25, 100, 25, 100);
        let active = PaneGeometry::new(0, 0, 25, 100);
        let space = available_space(Canvas::new(50, 200), &active, &excluded(&[(9, quadrant)]));
        assert_eq!(space, AvailableSpace { lines: 50, columns: 200 });
    }

    #[test]
    fn test_pane_overlapping_both_axes_is_subtracted_twice() {
        // Kept as observed: sharing rows and columns subtracts on both axes.
        let overlapping = PaneGeometry::new(10, 10, 20, 40);
        let active = PaneGeometry::new(0, 0, 50, 100);
        let space =
            available_space(Canvas::new(50, 200), &active, &excluded(&[(9, overlapping)]));
        assert_eq!(space.columns, 160);
        assert_eq!(space.lines, 30);
    }

    #[test]
    fn test_available_space_is_clamped_at_zero() {
        let huge = PaneGeometry::new(0, 0, 80, 300);
        let active = PaneGeometry::new(0, 0, 50, 100);
        let space = available_space(Canvas::new(50, 200), &active, &excluded(&[(9, huge)]));
        assert_eq!(space, AvailableSpace { lines: 0, columns: 0 });

        let target = compute_target(Canvas::new(50, 200), &active, &excluded(&[(9, huge)]), &config());
        assert_eq!(target, Target { height: 0, width: 0 });
    }

    #[test]
    fn test_floor_to_u32_handles_edge_values() {
        assert_eq!(floor_to_u32(f64::NAN), 0);
        assert_eq!(floor_to_u32(-3.5), 0);
        assert_eq!(floor_to_u32(12.99), 12);
        assert_eq!(floor_to_u32(f64::INFINITY), u32::MAX);
    }
}
