#![forbid(unsafe_code)]

//! Immutable pane split-tree layout engine.
//!
//! `panetree` decides how the session slots of a multi-pane workspace are
//! arranged: which pane a split lands in, which sibling takes over when a
//! pane closes, and how a flat list of slots is placed in a legacy-compatible
//! grid. It owns no session state and renders nothing; the hosting workspace
//! manager stores one [`PaneTree`] per workspace, calls one operation per
//! user action, and swaps in the returned tree.
//!
//! Operations are pure and structurally sharing: subtrees off the touched
//! path are reused by pointer, so an unchanged result is pointer-identical to
//! its input ([`std::sync::Arc::ptr_eq`]) and re-render checks stay cheap.
//!
//! ```
//! use panetree::{PaneNode, SplitAxis};
//!
//! let tree = PaneNode::leaf("shell");
//! let tree = PaneNode::split_leaf(&tree, "shell", "agent", SplitAxis::Vertical);
//! assert_eq!(tree.slot_ids(), ["shell", "agent"]);
//! assert_eq!(tree.sibling_slot("agent"), Some("shell"));
//!
//! let tree = PaneNode::remove_leaf(&tree, "shell").expect("one pane left");
//! assert_eq!(tree.slot_ids(), ["agent"]);
//! ```

pub mod grid;
pub mod tree;

pub use grid::{EMPTY_SLOT, GridDimensions, build_balanced_split, build_grid_tree, grid_dimensions};
pub use tree::{
    InvariantCode, InvariantIssue, InvariantReport, InvariantSeverity, NodeId, PaneLeaf, PaneNode,
    PaneSplit, PaneTree, SplitAxis,
};
