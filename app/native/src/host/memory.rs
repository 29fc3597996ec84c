//! In-memory host.
//!
//! Models a canvas subdivided by a tree of splits, the way terminal
//! multiplexers and editors lay out panes. Sizes along a split always sum to
//! the extent of the split, so every resize takes space from siblings:
//! following siblings first, then preceding ones, never shrinking a pane
//! below one cell.

use std::collections::{BTreeMap, BTreeSet};

use super::{
    ContentId, ContentInfo, Host, HostError, HostResult, NoticeLevel, Pane, PaneId,
    SubscriptionId, Trigger,
};
use crate::resize::geometry::{Canvas, PaneGeometry};

// ============================================================================
// Layout description
// ============================================================================

/// Direction children of a split are laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitKind {
    /// Children side by side; sizes are widths.
    Row,
    /// Children stacked; sizes are heights.
    Column,
}

/// Declarative layout used to build a [`MemoryHost`].
#[derive(Debug, Clone)]
pub enum Layout {
    /// A single pane.
    Pane(PaneId),
    /// Children side by side.
    Row(Vec<Self>),
    /// Children stacked top to bottom.
    Column(Vec<Self>),
}

impl Layout {
    /// A single pane.
    #[must_use]
    pub const fn pane(id: u32) -> Self { Self::Pane(PaneId(id)) }

    /// Children side by side.
    pub fn row(children: impl IntoIterator<Item = Self>) -> Self {
        Self::Row(children.into_iter().collect())
    }

    /// Children stacked top to bottom.
    pub fn column(children: impl IntoIterator<Item = Self>) -> Self {
        Self::Column(children.into_iter().collect())
    }
}

// ============================================================================
// Split tree
// ============================================================================

#[derive(Debug, Clone)]
enum Node {
    Leaf(PaneId),
    Split {
        kind: SplitKind,
        children: Vec<Self>,
        sizes: Vec<u32>,
    },
}

impl From<Layout> for Node {
    fn from(layout: Layout) -> Self {
        let (kind, children) = match layout {
            Layout::Pane(id) => return Self::Leaf(id),
            Layout::Row(children) => (SplitKind::Row, children),
            Layout::Column(children) => (SplitKind::Column, children),
        };
        let children: Vec<Self> = children.into_iter().map(Self::from).collect();
        let sizes = vec![0; children.len()];
        Self::Split {
            kind,
            children,
            sizes,
        }
    }
}

const fn extent_along(kind: SplitKind, height: u32, width: u32) -> u32 {
    match kind {
        SplitKind::Row => width,
        SplitKind::Column => height,
    }
}

/// Splits `total` into `count` near-equal parts, the remainder going to the
/// first parts.
fn distribute(total: u32, count: usize) -> Vec<u32> {
    let Ok(parts) = u32::try_from(count) else {
        return vec![0; count];
    };
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts;
    let remainder = total % parts;
    (0..parts).map(|i| base + u32::from(i < remainder)).collect()
}

impl Node {
    fn leaves(&self, out: &mut Vec<PaneId>) {
        match self {
            Self::Leaf(id) => out.push(*id),
            Self::Split { children, .. } => children.iter().for_each(|child| child.leaves(out)),
        }
    }

    fn equalize(&mut self, height: u32, width: u32) {
        if let Self::Split {
            kind,
            children,
            sizes,
        } = self
        {
            *sizes = distribute(extent_along(*kind, height, width), children.len());
            for (child, &size) in children.iter_mut().zip(sizes.iter()) {
                match kind {
                    SplitKind::Row => child.equalize(height, size),
                    SplitKind::Column => child.equalize(size, width),
                }
            }
        }
    }

    fn geometries(&self, area: PaneGeometry, out: &mut Vec<(PaneId, PaneGeometry)>) {
        match self {
            Self::Leaf(id) => out.push((*id, area)),
            Self::Split {
                kind,
                children,
                sizes,
            } => {
                let mut offset = 0;
                for (child, &size) in children.iter().zip(sizes) {
                    let child_area = match kind {
                        SplitKind::Row => PaneGeometry::new(
                            area.row_start,
                            area.col_start + offset,
                            area.height,
                            size,
                        ),
                        SplitKind::Column => PaneGeometry::new(
                            area.row_start + offset,
                            area.col_start,
                            size,
                            area.width,
                        ),
                    };
                    child.geometries(child_area, out);
                    offset += size;
                }
            }
        }
    }

    /// Smallest extent this node can shrink to along `axis`.
    fn min_extent(&self, axis: SplitKind) -> u32 {
        match self {
            Self::Leaf(_) => 1,
            Self::Split { kind, children, .. } => {
                let mins = children.iter().map(|child| child.min_extent(axis));
                if *kind == axis { mins.sum() } else { mins.max().unwrap_or(1) }
            }
        }
    }

    /// Adjusts descendants so this node spans exactly `extent` along `axis`.
    fn fit(&mut self, axis: SplitKind, extent: u32) {
        let Self::Split {
            kind,
            children,
            sizes,
        } = self
        else {
            return;
        };

        if *kind == axis {
            let total: u32 = sizes.iter().sum();
            if extent > total {
                if let Some(last) = sizes.last_mut() {
                    *last += extent - total;
                }
            } else {
                let mut excess = total - extent;
                for (child, size) in children.iter().zip(sizes.iter_mut()).rev() {
                    if excess == 0 {
                        break;
                    }
                    let spare = size.saturating_sub(child.min_extent(axis));
                    let take = spare.min(excess);
                    *size -= take;
                    excess -= take;
                }
            }
            for (child, &size) in children.iter_mut().zip(sizes.iter()) {
                child.fit(axis, size);
            }
        } else {
            for child in children {
                child.fit(axis, extent);
            }
        }
    }

    /// Returns the child indices leading from this node to the pane.
    fn path_to(&self, id: PaneId) -> Option<Vec<usize>> {
        match self {
            Self::Leaf(leaf) => (*leaf == id).then(Vec::new),
            Self::Split { children, .. } => children.iter().enumerate().find_map(|(i, child)| {
                child.path_to(id).map(|mut path| {
                    path.insert(0, i);
                    path
                })
            }),
        }
    }

    fn descend_mut(&mut self, path: &[usize]) -> Option<&mut Self> {
        match path.split_first() {
            None => Some(self),
            Some((&index, rest)) => match self {
                Self::Leaf(_) => None,
                Self::Split { children, .. } => children.get_mut(index)?.descend_mut(rest),
            },
        }
    }

    fn kind_at(&self, path: &[usize]) -> Option<SplitKind> {
        let mut node = self;
        for &index in path {
            match node {
                Self::Leaf(_) => return None,
                Self::Split { children, .. } => node = children.get(index)?,
            }
        }
        match node {
            Self::Leaf(_) => None,
            Self::Split { kind, .. } => Some(*kind),
        }
    }

    /// Sets the size of one child of this split along the split axis.
    fn resize_child(&mut self, index: usize, requested: u32) {
        let Self::Split {
            kind,
            children,
            sizes,
        } = self
        else {
            return;
        };
        let axis = *kind;
        let count = children.len();
        if count < 2 || index >= count {
            return;
        }

        let total: u32 = sizes.iter().sum();
        let others_min: u32 = children
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, child)| child.min_extent(axis))
            .sum();
        let own_min = children[index].min_extent(axis);
        let target = requested.clamp(own_min, total.saturating_sub(others_min).max(own_min));
        let current = sizes[index];

        if target > current {
            let mut needed = target - current;
            for i in (index + 1..count).chain((0..index).rev()) {
                if needed == 0 {
                    break;
                }
                let spare = sizes[i].saturating_sub(children[i].min_extent(axis));
                let take = spare.min(needed);
                sizes[i] -= take;
                needed -= take;
            }
            sizes[index] = target - needed;
        } else if target < current {
            let receiver = if index + 1 < count { index + 1 } else { index - 1 };
            sizes[receiver] += current - target;
            sizes[index] = target;
        }

        for (child, &size) in children.iter_mut().zip(sizes.iter()) {
            child.fit(axis, size);
        }
    }
}

// ============================================================================
// Host
// ============================================================================

#[derive(Debug, Clone)]
struct FloatingPane {
    geometry: PaneGeometry,
    content: ContentId,
}

#[derive(Debug, Clone)]
struct Group {
    id: SubscriptionId,
    triggers: Vec<Trigger>,
}

/// Host backed by an in-memory split tree.
///
/// Every pane shows its own content, `ContentId(n)` for `PaneId(n)`, with an
/// empty name and filetype until [`set_content`](Self::set_content) is called.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    canvas: Canvas,
    root: Node,
    floating: BTreeMap<PaneId, FloatingPane>,
    contents: BTreeMap<ContentId, ContentInfo>,
    active: Option<PaneId>,
    failing: BTreeSet<PaneId>,
    groups: BTreeMap<String, Group>,
    next_subscription: u64,
    notices: Vec<(NoticeLevel, String)>,
    centered: Vec<PaneId>,
    equalize_count: usize,
}

impl MemoryHost {
    /// Creates a host with the given canvas and layout, evenly balanced, with
    /// focus on the first pane.
    #[must_use]
    pub fn new(canvas: Canvas, layout: Layout) -> Self {
        let mut root = Node::from(layout);
        root.equalize(canvas.lines, canvas.columns);

        let mut leaves = Vec::new();
        root.leaves(&mut leaves);
        let contents = leaves
            .iter()
            .map(|id| {
                let content = ContentId(id.0);
                (content, ContentInfo {
                    id: content,
                    name: String::new(),
                    filetype: String::new(),
                })
            })
            .collect();

        Self {
            canvas,
            root,
            floating: BTreeMap::new(),
            contents,
            active: leaves.first().copied(),
            failing: BTreeSet::new(),
            groups: BTreeMap::new(),
            next_subscription: 1,
            notices: Vec::new(),
            centered: Vec::new(),
            equalize_count: 0,
        }
    }

    /// Moves focus to a pane.
    pub fn focus(&mut self, id: PaneId) { self.active = Some(id); }

    /// Adds a floating pane showing its own content.
    pub fn add_floating(&mut self, id: PaneId, geometry: PaneGeometry) {
        let content = ContentId(id.0);
        self.floating.insert(id, FloatingPane { geometry, content });
        self.contents.insert(content, ContentInfo {
            id: content,
            name: String::new(),
            filetype: String::new(),
        });
    }

    /// Sets the name and filetype of the content shown in a pane.
    pub fn set_content(&mut self, id: PaneId, name: &str, filetype: &str) {
        let content = ContentId(id.0);
        self.contents.insert(content, ContentInfo {
            id: content,
            name: name.to_string(),
            filetype: filetype.to_string(),
        });
    }

    /// Destroys the content shown in a pane.
    pub fn invalidate_content(&mut self, id: PaneId) { self.contents.remove(&ContentId(id.0)); }

    /// Makes every resize request for the pane fail.
    pub fn fail_on(&mut self, id: PaneId) { self.failing.insert(id); }

    /// Replaces the canvas size and rebalances.
    pub fn resize_canvas(&mut self, canvas: Canvas) {
        self.canvas = canvas;
        self.root.equalize(canvas.lines, canvas.columns);
    }

    /// Returns the geometry of every tiled pane in layout order.
    #[must_use]
    pub fn geometries(&self) -> Vec<(PaneId, PaneGeometry)> {
        let mut out = Vec::new();
        self.root.geometries(
            PaneGeometry::new(0, 0, self.canvas.lines, self.canvas.columns),
            &mut out,
        );
        out
    }

    /// Returns the triggers registered under a group.
    #[must_use]
    pub fn subscribed_triggers(&self, group: &str) -> Option<&[Trigger]> {
        self.groups.get(group).map(|group| group.triggers.as_slice())
    }

    /// Returns every notice shown so far.
    #[must_use]
    pub fn notices(&self) -> &[(NoticeLevel, String)] { &self.notices }

    /// Returns the panes a recenter was requested for.
    #[must_use]
    pub fn centered(&self) -> &[PaneId] { &self.centered }

    /// Returns how often the layout was rebalanced.
    #[must_use]
    pub const fn equalize_count(&self) -> usize { self.equalize_count }

    fn check_failing(&self, id: PaneId) -> HostResult<()> {
        if self.failing.contains(&id) {
            return Err(HostError::Rejected {
                pane: id,
                reason: "simulated failure".to_string(),
            });
        }
        Ok(())
    }

    fn resize(&mut self, id: PaneId, axis: SplitKind, size: u32) -> HostResult<()> {
        self.check_failing(id)?;

        if let Some(floating) = self.floating.get_mut(&id) {
            match axis {
                SplitKind::Row => floating.geometry.width = size.max(1),
                SplitKind::Column => floating.geometry.height = size.max(1),
            }
            return Ok(());
        }

        let path = self.root.path_to(id).ok_or(HostError::PaneNotFound(id))?;

        // The nearest enclosing split along the axis owns the pane's extent.
        let Some(depth) = (0..path.len())
            .rev()
            .find(|&depth| self.root.kind_at(&path[..depth]) == Some(axis))
        else {
            return Ok(());
        };

        if let Some(split) = self.root.descend_mut(&path[..depth]) {
            split.resize_child(path[depth], size);
        }
        Ok(())
    }
}

impl Host for MemoryHost {
    fn canvas(&self) -> HostResult<Canvas> { Ok(self.canvas) }

    fn active_pane(&self) -> Option<PaneId> { self.active }

    fn panes(&self) -> HostResult<Vec<PaneId>> {
        let mut ids = Vec::new();
        self.root.leaves(&mut ids);
        ids.extend(self.floating.keys().copied());
        Ok(ids)
    }

    fn pane(&self, id: PaneId) -> HostResult<Pane> {
        if let Some(floating) = self.floating.get(&id) {
            return Ok(Pane {
                id,
                geometry: floating.geometry,
                content: floating.content,
                floating: true,
            });
        }
        self.geometries()
            .into_iter()
            .find(|(pane, _)| *pane == id)
            .map(|(_, geometry)| Pane {
                id,
                geometry,
                content: ContentId(id.0),
                floating: false,
            })
            .ok_or(HostError::PaneNotFound(id))
    }

    fn content(&self, id: ContentId) -> Option<ContentInfo> { self.contents.get(&id).cloned() }

    fn set_height(&mut self, id: PaneId, height: u32) -> HostResult<()> {
        self.resize(id, SplitKind::Column, height)
    }

    fn set_width(&mut self, id: PaneId, width: u32) -> HostResult<()> {
        self.resize(id, SplitKind::Row, width)
    }

    fn equalize(&mut self) -> HostResult<()> {
        self.equalize_count += 1;
        self.root.equalize(self.canvas.lines, self.canvas.columns);
        Ok(())
    }

    fn center_cursor(&mut self, id: PaneId) -> HostResult<()> {
        self.pane(id)?;
        self.centered.push(id);
        Ok(())
    }

    fn subscribe(&mut self, group: &str, triggers: &[Trigger]) -> HostResult<SubscriptionId> {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.groups.insert(group.to_string(), Group {
            id,
            triggers: triggers.to_vec(),
        });
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> HostResult<()> {
        self.groups.retain(|_, group| group.id != id);
        Ok(())
    }

    fn find_group(&self, group: &str) -> Option<SubscriptionId> {
        self.groups.get(group).map(|group| group.id)
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        self.notices.push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(host: &MemoryHost, id: u32) -> PaneGeometry { host.pane(PaneId(id)).unwrap().geometry }

    #[test]
    fn test_distribute_gives_remainder_to_first_parts() {
        assert_eq!(distribute(200, 3), vec![67, 67, 66]);
        assert_eq!(distribute(50, 2), vec![25, 25]);
        assert!(distribute(10, 0).is_empty());
    }

    #[test]
    fn test_new_layout_is_balanced() {
        let host = MemoryHost::new(
            Canvas::new(50, 200),
            Layout::row([Layout::pane(1), Layout::column([Layout::pane(2), Layout::pane(3)])]),
        );
        assert_eq!(geometry(&host, 1), PaneGeometry::new(0, 0, 50, 100));
        assert_eq!(geometry(&host, 2), PaneGeometry::new(0, 100, 25, 100));
        assert_eq!(geometry(&host, 3), PaneGeometry::new(25, 100, 25, 100));
        assert_eq!(host.active_pane(), Some(PaneId(1)));
    }

    #[test]
    fn test_growing_takes_from_following_sibling_first() {
        let mut host = MemoryHost::new(
            Canvas::new(10, 90),
            Layout::row([Layout::pane(1), Layout::pane(2), Layout::pane(3)]),
        );
        host.set_width(PaneId(2), 50).unwrap();
        assert_eq!(geometry(&host, 1).width, 30);
        assert_eq!(geometry(&host, 2).width, 50);
        assert_eq!(geometry(&host, 3).width, 10);
    }

    #[test]
    fn test_growing_falls_back_to_preceding_siblings() {
        let mut host = MemoryHost::new(
            Canvas::new(10, 90),
            Layout::row([Layout::pane(1), Layout::pane(2), Layout::pane(3)]),
        );
        host.set_width(PaneId(3), 80).unwrap();
        assert_eq!(geometry(&host, 1).width, 9);
        assert_eq!(geometry(&host, 2).width, 1);
        assert_eq!(geometry(&host, 3).width, 80);
    }

    #[test]
    fn test_size_is_clamped_to_leave_one_cell_per_sibling() {
        let mut host = MemoryHost::new(Canvas::new(10, 90), Layout::row([Layout::pane(1), Layout::pane(2)]));
        host.set_width(PaneId(1), 500).unwrap();
        assert_eq!(geometry(&host, 1).width, 89);
        host.set_width(PaneId(1), 0).unwrap();
        assert_eq!(geometry(&host, 1).width, 1);
        assert_eq!(geometry(&host, 2).width, 89);
    }

    #[test]
    fn test_shrinking_gives_space_to_neighbor() {
        let mut host = MemoryHost::new(Canvas::new(10, 90), Layout::row([Layout::pane(1), Layout::pane(2)]));
        host.set_width(PaneId(2), 20).unwrap();
        assert_eq!(geometry(&host, 1).width, 70);
        assert_eq!(geometry(&host, 2), PaneGeometry::new(0, 70, 10, 20));
    }

    #[test]
    fn test_resizing_a_nested_split_refits_its_children() {
        let mut host = MemoryHost::new(
            Canvas::new(40, 100),
            Layout::column([Layout::row([Layout::pane(1), Layout::pane(2)]), Layout::pane(3)]),
        );
        host.set_height(PaneId(1), 30).unwrap();
        assert_eq!(geometry(&host, 1).height, 30);
        assert_eq!(geometry(&host, 2).height, 30);
        assert_eq!(geometry(&host, 3), PaneGeometry::new(30, 0, 10, 100));
    }

    #[test]
    fn test_width_without_side_by_side_split_is_noop() {
        let mut host =
            MemoryHost::new(Canvas::new(40, 100), Layout::column([Layout::pane(1), Layout::pane(2)]));
        host.set_width(PaneId(1), 30).unwrap();
        assert_eq!(geometry(&host, 1).width, 100);
    }

    #[test]
    fn test_equalize_rebalances() {
        let mut host = MemoryHost::new(Canvas::new(10, 90), Layout::row([Layout::pane(1), Layout::pane(2)]));
        host.set_width(PaneId(1), 80).unwrap();
        host.equalize().unwrap();
        assert_eq!(geometry(&host, 1).width, 45);
        assert_eq!(host.equalize_count(), 1);
    }

    #[test]
    fn test_unknown_pane_is_not_found() {
        let mut host = MemoryHost::new(Canvas::new(10, 90), Layout::pane(1));
        assert!(matches!(host.set_width(PaneId(7), 10), Err(HostError::PaneNotFound(PaneId(7)))));
        assert!(matches!(host.pane(PaneId(7)), Err(HostError::PaneNotFound(_))));
    }

    #[test]
    fn test_failing_pane_rejects_resizes() {
        let mut host = MemoryHost::new(Canvas::new(10, 90), Layout::row([Layout::pane(1), Layout::pane(2)]));
        host.fail_on(PaneId(1));
        assert!(matches!(host.set_height(PaneId(1), 5), Err(HostError::Rejected { .. })));
        assert!(host.set_width(PaneId(2), 5).is_ok());
    }

    #[test]
    fn test_floating_panes_are_enumerated_last() {
        let mut host = MemoryHost::new(Canvas::new(10, 90), Layout::row([Layout::pane(1), Layout::pane(2)]));
        host.add_floating(PaneId(9), PaneGeometry::new(2, 2, 4, 20));
        assert_eq!(host.panes().unwrap(), vec![PaneId(1), PaneId(2), PaneId(9)]);
        assert!(host.pane(PaneId(9)).unwrap().floating);
    }

    #[test]
    fn test_content_can_be_invalidated() {
        let mut host = MemoryHost::new(Canvas::new(10, 90), Layout::pane(1));
        host.set_content(PaneId(1), "notes.md", "markdown");
        assert_eq!(host.content(ContentId(1)).unwrap().filetype, "markdown");
        host.invalidate_content(PaneId(1));
        assert!(host.content(ContentId(1)).is_none());
    }

    #[test]
    fn test_subscription_groups() {
        let mut host = MemoryHost::new(Canvas::new(10, 90), Layout::pane(1));
        let id = host.subscribe("aurea", &Trigger::ALL).unwrap();
        assert_eq!(host.find_group("aurea"), Some(id));
        assert_eq!(host.subscribed_triggers("aurea"), Some(&Trigger::ALL[..]));

        host.unsubscribe(id).unwrap();
        assert_eq!(host.find_group("aurea"), None);
    }
}
