//! Node views handed to reduce callbacks.

/// A terminal node reached during a reduce: a leaf of a full tree, or a
/// node of a partial tree whose hash is given directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafNode<'a> {
    /// Display-order hex hash of the node.
    pub hash: &'a str,
    /// Height above the leaves (0 for transaction hashes).
    pub height: u32,
    /// Horizontal position within its level.
    pub offset: u64,
    /// Whether this is a transaction hash the proof commits to. Always
    /// `true` for full trees; for partial trees, a height 0 node whose flag
    /// bit was set.
    pub matched: bool,
}

/// An inner node reached during a reduce, after both children.
///
/// When the level has no right sibling, `right_hash` and `right_state` are
/// copies of the left ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerNode<'a, S> {
    /// Display-order hex hash of this node.
    pub hash: &'a str,
    /// Hash of the left child.
    pub left_hash: &'a str,
    /// Hash of the right child.
    pub right_hash: &'a str,
    /// State returned for the left child.
    pub left_state: S,
    /// State returned for the right child.
    pub right_state: S,
    /// Height above the leaves (at least 1).
    pub height: u32,
    /// Horizontal position within its level.
    pub offset: u64,
}

/// Hash and state of a reduced subtree.
#[derive(Debug, Clone)]
pub(crate) struct Reduced<S> {
    pub hash: String,
    pub state: S,
}
