//! Layout adjacency detection.
//!
//! Decides which axes of the active pane may be resized. Resizing the height
//! of a pane that has no stacked neighbor would only fight the host's own
//! space filling, and likewise for the width.

use serde::Serialize;

use crate::host::Pane;

/// Split directions found around the active pane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Axes {
    /// A stacked neighbor exists, so the height may be resized.
    pub horizontal: bool,
    /// A side-by-side neighbor exists, so the width may be resized.
    pub vertical: bool,
}

impl Axes {
    /// Returns true if neither axis is eligible.
    #[must_use]
    pub const fn is_empty(&self) -> bool { !self.horizontal && !self.vertical }
}

/// Detects which kinds of splits surround the active pane.
///
/// Floating panes are ignored. With fewer than two normal panes no axis is
/// eligible. For every other normal pane:
///
/// - sharing rows but starting at another column means a vertical split
/// - sharing columns but starting at another row means a horizontal split
#[must_use]
pub fn detect_axes(active: &Pane, panes: &[Pane]) -> Axes {
    let mut axes = Axes::default();

    if panes.iter().filter(|pane| pane.is_normal()).count() < 2 {
        return axes;
    }

    let current = &active.geometry;
    for pane in panes.iter().filter(|pane| pane.is_normal() && pane.id != active.id) {
        let other = &pane.geometry;

        if current.shares_rows(other) && other.col_start != current.col_start {
            axes.vertical = true;
        }
        if current.shares_columns(other) && other.row_start != current.row_start {
            axes.horizontal = true;
        }

        if axes.vertical && axes.horizontal {
            break;
        }
    }

    axes
}
