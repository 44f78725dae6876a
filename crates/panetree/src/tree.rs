//! Immutable pane split-tree model and structural operations.
//!
//! The tree is a strict binary tree: every [`PaneNode::Split`] has exactly two
//! children, every [`PaneNode::Leaf`] holds exactly one slot. Nodes are shared
//! `Arc` values; an operation rebuilds only the path from the root to the
//! touched node and reuses every off-path subtree by pointer. "Not found"
//! never raises: the operation hands the caller back the same `Arc` it was
//! given, detectable with [`Arc::ptr_eq`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Shared handle to one layout tree version.
pub type PaneTree = Arc<PaneNode>;

/// Stable identifier for pane nodes.
///
/// IDs are process-unique and never reused, so a stale UI reference (for
/// example a resize handle bound to a removed split) fails to resolve instead
/// of silently re-binding to an unrelated node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u64);

/// Monotonic sequence for node IDs. Starts at 1 so the ID space never
/// collides with a zero default.
static NEXT_NODE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Coarse per-process timestamp base, captured on first allocation.
static NODE_ID_BASE: OnceLock<u64> = OnceLock::new();

impl NodeId {
    /// Allocate a fresh process-unique ID.
    ///
    /// The value combines a coarse startup timestamp with an atomic counter.
    /// Uniqueness within one process comes from the counter alone; the
    /// timestamp keeps IDs from different runs distinguishable in logs.
    /// Trees never cross process boundaries, so nothing stronger is needed.
    #[must_use]
    pub fn next() -> Self {
        let base = *NODE_ID_BASE.get_or_init(|| {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0);
            secs << 24
        });
        let seq = NEXT_NODE_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(base.wrapping_add(seq))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Orientation of a split node.
///
/// `Horizontal` stacks the two children top/bottom; `Vertical` places them
/// side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAxis {
    Horizontal,
    Vertical,
}

/// Leaf payload: one occupied screen region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneLeaf {
    pub id: NodeId,
    /// Opaque session identifier assigned by the owning workspace manager.
    /// Unique across the tree at any instant; the engine never generates one
    /// except the placeholder used by [`crate::grid::build_grid_tree`].
    pub slot_id: String,
}

/// Split payload: binary division of space along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneSplit {
    pub id: NodeId,
    pub axis: SplitAxis,
    /// First child's fractional share of the available space.
    ///
    /// Stored as given, with no clamp to (0, 1); out-of-range values are
    /// surfaced by [`PaneNode::invariant_report`] instead of being rejected.
    pub ratio: f32,
    pub first: PaneTree,
    pub second: PaneTree,
}

/// A node in the immutable pane layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaneNode {
    Leaf(PaneLeaf),
    Split(PaneSplit),
}

/// Result of one removal step while walking down the tree.
enum RemoveOutcome {
    /// Slot not present in this subtree.
    NotFound,
    /// The subtree was exactly the removed leaf; the parent collapses.
    Emptied,
    /// The subtree survived in rewritten form.
    Replaced(PaneTree),
}

impl PaneNode {
    /// Build a new leaf with a fresh ID for the given slot.
    #[must_use]
    pub fn leaf(slot_id: impl Into<String>) -> PaneTree {
        Arc::new(Self::Leaf(PaneLeaf {
            id: NodeId::next(),
            slot_id: slot_id.into(),
        }))
    }

    /// Node ID regardless of variant.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Leaf(leaf) => leaf.id,
            Self::Split(split) => split.id,
        }
    }

    /// Replace the leaf holding `target_slot` with a split of that leaf and a
    /// freshly created leaf for `new_slot`, at ratio 0.5.
    ///
    /// The original leaf stays the first child; `axis` is carried through
    /// unchanged. When `target_slot` is not present the same `Arc` comes back
    /// pointer-identical. Ancestors on the path to the target are rebuilt
    /// with their original IDs; everything off the path is shared.
    ///
    /// `new_slot` is not checked against the existing slots. Keeping slot IDs
    /// unique is the caller's contract; a violation is visible through
    /// [`PaneNode::invariant_report`].
    #[must_use]
    pub fn split_leaf(
        tree: &PaneTree,
        target_slot: &str,
        new_slot: impl Into<String>,
        axis: SplitAxis,
    ) -> PaneTree {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("split_leaf", target = %target_slot).entered();
        let new_slot: String = new_slot.into();
        Self::split_leaf_inner(tree, target_slot, &new_slot, axis)
            .unwrap_or_else(|| Arc::clone(tree))
    }

    fn split_leaf_inner(
        tree: &PaneTree,
        target_slot: &str,
        new_slot: &str,
        axis: SplitAxis,
    ) -> Option<PaneTree> {
        match tree.as_ref() {
            Self::Leaf(leaf) if leaf.slot_id == target_slot => {
                Some(Arc::new(Self::Split(PaneSplit {
                    id: NodeId::next(),
                    axis,
                    ratio: 0.5,
                    first: Arc::clone(tree),
                    second: Self::leaf(new_slot),
                })))
            }
            Self::Leaf(_) => None,
            Self::Split(split) => {
                if let Some(first) = Self::split_leaf_inner(&split.first, target_slot, new_slot, axis)
                {
                    return Some(Arc::new(Self::Split(PaneSplit {
                        first,
                        ..split.clone()
                    })));
                }
                Self::split_leaf_inner(&split.second, target_slot, new_slot, axis).map(|second| {
                    Arc::new(Self::Split(PaneSplit {
                        second,
                        ..split.clone()
                    }))
                })
            }
        }
    }

    /// Remove the leaf holding `slot_id`, promoting its sibling one level up.
    ///
    /// `None` means the tree was exactly that leaf and the workspace now has
    /// zero panes; that is a valid terminal state, not an error. When
    /// `slot_id` is absent the original `Arc` comes back unchanged inside
    /// `Some`. A split never survives with one child: the sibling subtree
    /// always takes the removed node's position in the parent.
    #[must_use]
    pub fn remove_leaf(tree: &PaneTree, slot_id: &str) -> Option<PaneTree> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("remove_leaf", slot = %slot_id).entered();
        match Self::remove_leaf_inner(tree, slot_id) {
            RemoveOutcome::Emptied => None,
            RemoveOutcome::Replaced(node) => Some(node),
            RemoveOutcome::NotFound => Some(Arc::clone(tree)),
        }
    }

    fn remove_leaf_inner(tree: &PaneTree, slot_id: &str) -> RemoveOutcome {
        match tree.as_ref() {
            Self::Leaf(leaf) if leaf.slot_id == slot_id => RemoveOutcome::Emptied,
            Self::Leaf(_) => RemoveOutcome::NotFound,
            Self::Split(split) => {
                match Self::remove_leaf_inner(&split.first, slot_id) {
                    RemoveOutcome::Emptied => {
                        return RemoveOutcome::Replaced(Arc::clone(&split.second));
                    }
                    RemoveOutcome::Replaced(first) => {
                        return RemoveOutcome::Replaced(Arc::new(Self::Split(PaneSplit {
                            first,
                            ..split.clone()
                        })));
                    }
                    RemoveOutcome::NotFound => {}
                }
                match Self::remove_leaf_inner(&split.second, slot_id) {
                    RemoveOutcome::Emptied => RemoveOutcome::Replaced(Arc::clone(&split.first)),
                    RemoveOutcome::Replaced(second) => {
                        RemoveOutcome::Replaced(Arc::new(Self::Split(PaneSplit {
                            second,
                            ..split.clone()
                        })))
                    }
                    RemoveOutcome::NotFound => RemoveOutcome::NotFound,
                }
            }
        }
    }

    /// Set the ratio of the split identified by `node_id`.
    ///
    /// Unknown IDs and leaf IDs leave the tree pointer-identical, so a stale
    /// resize-handle binding after a close degrades to a no-op. The value is
    /// stored as given, without clamping.
    #[must_use]
    pub fn update_ratio(tree: &PaneTree, node_id: NodeId, ratio: f32) -> PaneTree {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("update_ratio", node = %node_id, ratio).entered();
        Self::update_ratio_inner(tree, node_id, ratio).unwrap_or_else(|| Arc::clone(tree))
    }

    fn update_ratio_inner(tree: &PaneTree, node_id: NodeId, ratio: f32) -> Option<PaneTree> {
        match tree.as_ref() {
            Self::Leaf(_) => None,
            Self::Split(split) if split.id == node_id => Some(Arc::new(Self::Split(PaneSplit {
                ratio,
                ..split.clone()
            }))),
            Self::Split(split) => {
                if let Some(first) = Self::update_ratio_inner(&split.first, node_id, ratio) {
                    return Some(Arc::new(Self::Split(PaneSplit {
                        first,
                        ..split.clone()
                    })));
                }
                Self::update_ratio_inner(&split.second, node_id, ratio).map(|second| {
                    Arc::new(Self::Split(PaneSplit {
                        second,
                        ..split.clone()
                    }))
                })
            }
        }
    }

    /// Slot IDs in canonical order: depth-first, first child before second.
    ///
    /// This order is authoritative for numbered pane shortcuts (pane N is the
    /// N-th element) and for sibling resolution.
    #[must_use]
    pub fn slot_ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_slot_ids(&mut out);
        out
    }

    fn collect_slot_ids<'tree>(&'tree self, out: &mut Vec<&'tree str>) {
        match self {
            Self::Leaf(leaf) => out.push(leaf.slot_id.as_str()),
            Self::Split(split) => {
                split.first.collect_slot_ids(out);
                split.second.collect_slot_ids(out);
            }
        }
    }

    /// First slot of this subtree in canonical order.
    #[must_use]
    pub fn first_slot(&self) -> &str {
        match self {
            Self::Leaf(leaf) => &leaf.slot_id,
            Self::Split(split) => split.first.first_slot(),
        }
    }

    /// Slot to treat as adjacent to `slot_id` for focus cycling.
    ///
    /// When the target leaf is a direct child of a split, the sibling is the
    /// first slot of the split's other child, which may itself be a whole
    /// subtree. `None` for a root-only tree and for absent slots.
    #[must_use]
    pub fn sibling_slot(&self, slot_id: &str) -> Option<&str> {
        match self {
            Self::Leaf(_) => None,
            Self::Split(split) => {
                if split.first.holds_slot_directly(slot_id) {
                    return Some(split.second.first_slot());
                }
                if split.second.holds_slot_directly(slot_id) {
                    return Some(split.first.first_slot());
                }
                split
                    .first
                    .sibling_slot(slot_id)
                    .or_else(|| split.second.sibling_slot(slot_id))
            }
        }
    }

    fn holds_slot_directly(&self, slot_id: &str) -> bool {
        matches!(self, Self::Leaf(leaf) if leaf.slot_id == slot_id)
    }

    /// Whether any leaf holds `slot_id`.
    #[must_use]
    pub fn contains_slot(&self, slot_id: &str) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.slot_id == slot_id,
            Self::Split(split) => {
                split.first.contains_slot(slot_id) || split.second.contains_slot(slot_id)
            }
        }
    }

    /// Number of leaves, i.e. open panes.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Split(split) => split.first.leaf_count() + split.second.leaf_count(),
        }
    }

    /// Find the split node with the given ID.
    #[must_use]
    pub fn find_split(&self, node_id: NodeId) -> Option<&PaneSplit> {
        match self {
            Self::Leaf(_) => None,
            Self::Split(split) if split.id == node_id => Some(split),
            Self::Split(split) => split
                .first
                .find_split(node_id)
                .or_else(|| split.second.find_split(node_id)),
        }
    }

    /// Deterministic structural hash over the DFS encoding of the tree.
    ///
    /// Covers node IDs, slot IDs, axes, and raw ratio bits. Intended for
    /// operation logs and structural-equivalence checks where pointer
    /// identity is too strict.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        let mut hash = OFFSET_BASIS;
        self.mix_into(&mut hash);
        hash
    }

    fn mix_into(&self, hash: &mut u64) {
        const PRIME: u64 = 0x0000_0001_0000_01b3;

        fn mix(hash: &mut u64, byte: u8) {
            *hash ^= u64::from(byte);
            *hash = hash.wrapping_mul(PRIME);
        }

        fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
            for byte in bytes {
                mix(hash, *byte);
            }
        }

        fn mix_u64(hash: &mut u64, value: u64) {
            mix_bytes(hash, &value.to_le_bytes());
        }

        fn mix_str(hash: &mut u64, value: &str) {
            mix_u64(hash, value.len() as u64);
            mix_bytes(hash, value.as_bytes());
        }

        match self {
            Self::Leaf(leaf) => {
                mix(hash, 1);
                mix_u64(hash, leaf.id.get());
                mix_str(hash, &leaf.slot_id);
            }
            Self::Split(split) => {
                mix(hash, 2);
                mix_u64(hash, split.id.get());
                let axis_byte = match split.axis {
                    SplitAxis::Horizontal => 1,
                    SplitAxis::Vertical => 2,
                };
                mix(hash, axis_byte);
                mix_bytes(hash, &split.ratio.to_bits().to_le_bytes());
                split.first.mix_into(hash);
                split.second.mix_into(hash);
            }
        }
    }

    /// Inspect tree-wide invariants and collect findings.
    ///
    /// The operations themselves never reject input: not-found degrades to a
    /// no-op and ratios are stored as given. This report is where a hosting
    /// layer audits a tree it assembled. Duplicated slot IDs are errors;
    /// out-of-range ratios are warnings.
    #[must_use]
    pub fn invariant_report(&self) -> InvariantReport {
        let mut seen = BTreeMap::new();
        let mut issues = Vec::new();
        self.inspect(&mut seen, &mut issues);
        InvariantReport { issues }
    }

    fn inspect<'tree>(
        &'tree self,
        seen: &mut BTreeMap<&'tree str, NodeId>,
        issues: &mut Vec<InvariantIssue>,
    ) {
        match self {
            Self::Leaf(leaf) => {
                if let Some(holder) = seen.insert(leaf.slot_id.as_str(), leaf.id) {
                    issues.push(InvariantIssue {
                        code: InvariantCode::DuplicateSlotId,
                        severity: InvariantSeverity::Error,
                        node_id: leaf.id,
                        message: format!(
                            "slot {:?} already held by node {holder}",
                            leaf.slot_id
                        ),
                    });
                }
            }
            Self::Split(split) => {
                if !split.ratio.is_finite() {
                    issues.push(InvariantIssue {
                        code: InvariantCode::NonFiniteRatio,
                        severity: InvariantSeverity::Error,
                        node_id: split.id,
                        message: format!("split ratio {} is not finite", split.ratio),
                    });
                } else if split.ratio <= 0.0 || split.ratio >= 1.0 {
                    issues.push(InvariantIssue {
                        code: InvariantCode::RatioOutOfRange,
                        severity: InvariantSeverity::Warning,
                        node_id: split.id,
                        message: format!(
                            "split ratio {} outside the open interval (0, 1)",
                            split.ratio
                        ),
                    });
                }
                split.first.inspect(seen, issues);
                split.second.inspect(seen, issues);
            }
        }
    }
}

/// Severity for one invariant finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantSeverity {
    Error,
    Warning,
}

/// Stable code for invariant findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantCode {
    DuplicateSlotId,
    NonFiniteRatio,
    RatioOutOfRange,
}

/// One actionable invariant finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantIssue {
    pub code: InvariantCode,
    pub severity: InvariantSeverity,
    pub node_id: NodeId,
    pub message: String,
}

/// Structured invariant report over one tree version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantReport {
    pub issues: Vec<InvariantIssue>,
}

impl InvariantReport {
    /// Return true if any error-level finding exists.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == InvariantSeverity::Error)
    }
}
