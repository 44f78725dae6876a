//! Grid-equivalence builder.
//!
//! Reproduces the legacy fixed-grid placement (1x1 up to 3x3) as an ordinary
//! split tree, so a grid-initialized workspace stays mutable through the
//! regular split/remove/resize operations in [`crate::tree`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tree::{NodeId, PaneNode, PaneSplit, PaneTree, SplitAxis};

/// Slot ID of the placeholder leaf for a zero-pane workspace.
///
/// The only slot identifier this engine ever generates itself.
pub const EMPTY_SLOT: &str = "empty";

/// Column/row pair for the legacy grid shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub cols: usize,
    pub rows: usize,
}

/// Legacy grid shape for a pane count.
///
/// Counts above nine keep the 3x3 shape and the extra panes spill into
/// additional chunks; this mirrors the fixed CSS-grid behavior being
/// replaced, it is not a general N-by-M layout.
#[must_use]
pub fn grid_dimensions(count: usize) -> GridDimensions {
    let (cols, rows) = match count {
        0 | 1 => (1, 1),
        2 => (2, 1),
        3 => (3, 1),
        4 => (2, 2),
        5 | 6 => (3, 2),
        _ => (3, 3),
    };
    GridDimensions { cols, rows }
}

/// Combine subtrees into one balanced split along `axis`.
///
/// The list is halved at `ceil(n / 2)` recursively. Each split's ratio is the
/// left half's share of the entries below it, so every entry of the original
/// list receives equal space regardless of the depth it ends up at. An empty
/// list degrades to the [`EMPTY_SLOT`] placeholder.
#[must_use]
pub fn build_balanced_split(mut nodes: Vec<PaneTree>, axis: SplitAxis) -> PaneTree {
    if nodes.is_empty() {
        return PaneNode::leaf(EMPTY_SLOT);
    }
    if nodes.len() == 1 {
        return nodes.remove(0);
    }

    let total = nodes.len();
    let mid = total.div_ceil(2);
    let right = nodes.split_off(mid);
    Arc::new(PaneNode::Split(PaneSplit {
        id: NodeId::next(),
        axis,
        ratio: mid as f32 / total as f32,
        first: build_balanced_split(nodes, axis),
        second: build_balanced_split(right, axis),
    }))
}

/// Build the split tree matching the legacy grid placement for `slot_ids`.
///
/// Zero IDs produce a placeholder leaf holding [`EMPTY_SLOT`]; one ID is a
/// plain leaf. Otherwise the IDs are chunked into rows of `cols` (the last
/// row may be short), each row becomes one balanced side-by-side split, and
/// the rows are stacked by one balanced top/bottom split. Canonical slot
/// order is preserved: `tree.slot_ids()` equals the input.
#[must_use]
pub fn build_grid_tree<S: AsRef<str>>(slot_ids: &[S]) -> PaneTree {
    match slot_ids {
        [] => PaneNode::leaf(EMPTY_SLOT),
        [only] => PaneNode::leaf(only.as_ref()),
        _ => {
            let GridDimensions { cols, .. } = grid_dimensions(slot_ids.len());
            let rows = slot_ids
                .chunks(cols)
                .map(|row| {
                    let leaves = row
                        .iter()
                        .map(|slot| PaneNode::leaf(slot.as_ref()))
                        .collect();
                    build_balanced_split(leaves, SplitAxis::Vertical)
                })
                .collect();
            build_balanced_split(rows, SplitAxis::Horizontal)
        }
    }
}
