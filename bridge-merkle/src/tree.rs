use log::trace;
use once_cell::sync::OnceCell;

use crate::{
    hash::{combine, ZERO_HASH},
    helper::{level_width, tree_height},
    node::Reduced,
    InnerNode, LeafNode, MerkleError, Result,
};

/// A Merkle tree over the complete, ordered transaction hash list of a block.
///
/// Leaves are display-order hex hashes. The tree is immutable: the leaf list
/// is never modified after construction and the root is computed at most once.
///
/// Levels with an odd number of nodes pair the last node with itself, as
/// Bitcoin does.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    hashes: Vec<String>,
    merkle_root: OnceCell<String>,
}

impl MerkleTree {
    /// Create a tree over `hashes`, in block order.
    ///
    /// Nothing is validated here; an empty list fails on first use.
    pub fn new<I, H>(hashes: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        Self {
            hashes: hashes.into_iter().map(Into::into).collect(),
            merkle_root: OnceCell::new(),
        }
    }

    /// Create the BIP141 witness tree over block wtxids.
    ///
    /// The coinbase wtxid (the first one) is committed as the zero hash.
    pub fn witness<I, H>(wtxids: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        let mut tree = Self::new(wtxids);
        if let Some(coinbase) = tree.hashes.first_mut() {
            *coinbase = ZERO_HASH.to_owned();
        }
        tree
    }

    /// The Merkle root, computed on first call.
    pub fn merkle_root(&self) -> Result<String> {
        self.merkle_root
            .get_or_try_init(|| {
                let root = self.reduce_root(&mut skip_leaf, &mut skip_inner)?.hash;
                trace!("computed merkle root {} over {} leaves", root, self.hashes.len());
                Ok::<_, MerkleError>(root)
            })
            .cloned()
    }

    /// A copy of the leaf hashes.
    pub fn hashes(&self) -> Vec<String> {
        self.hashes.clone()
    }

    /// Number of leaves.
    pub fn tx_count(&self) -> usize {
        self.hashes.len()
    }

    /// Whether `hash` is one of the leaves. Comparison is exact, so callers
    /// must normalize case first.
    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.iter().any(|h| h == hash)
    }

    /// Fold the tree bottom-up.
    ///
    /// `leaf` is called for every leaf and `inner` for every inner node once
    /// both children are done; the state they return flows up to the parent.
    /// Returns the state of the root.
    pub fn reduce<S, L, I>(&self, mut leaf: L, mut inner: I) -> Result<S>
    where
        S: Clone,
        L: FnMut(LeafNode<'_>) -> S,
        I: FnMut(InnerNode<'_, S>) -> S,
    {
        Ok(self.reduce_root(&mut leaf, &mut inner)?.state)
    }

    pub(crate) fn leaf_count(&self) -> Result<u32> {
        u32::try_from(self.hashes.len()).map_err(|_| {
            MerkleError::InvalidInput(format!(
                "{} leaves do not fit a bitcoin transaction count",
                self.hashes.len()
            ))
        })
    }

    fn reduce_root<S, L, I>(&self, leaf: &mut L, inner: &mut I) -> Result<Reduced<S>>
    where
        S: Clone,
        L: FnMut(LeafNode<'_>) -> S,
        I: FnMut(InnerNode<'_, S>) -> S,
    {
        let leaf_count = self.leaf_count()?;
        let height = tree_height(leaf_count)?;
        self.reduce_from(leaf_count, height, 0, leaf, inner)
    }

    fn reduce_from<S, L, I>(
        &self,
        leaf_count: u32,
        height: u32,
        offset: u64,
        leaf: &mut L,
        inner: &mut I,
    ) -> Result<Reduced<S>>
    where
        S: Clone,
        L: FnMut(LeafNode<'_>) -> S,
        I: FnMut(InnerNode<'_, S>) -> S,
    {
        if height == 0 {
            let hash = usize::try_from(offset)
                .ok()
                .and_then(|index| self.hashes.get(index))
                .ok_or_else(|| {
                    MerkleError::InvalidInput(format!("no leaf at offset {}", offset))
                })?;
            let state = leaf(LeafNode {
                hash,
                height,
                offset,
                matched: true,
            });
            return Ok(Reduced {
                hash: hash.clone(),
                state,
            });
        }

        let left = self.reduce_from(leaf_count, height - 1, offset * 2, leaf, inner)?;
        let right = if offset * 2 + 1 < level_width(leaf_count, height - 1) {
            self.reduce_from(leaf_count, height - 1, offset * 2 + 1, leaf, inner)?
        } else {
            left.clone()
        };

        let hash = combine(&left.hash, &right.hash)?;
        let state = inner(InnerNode {
            hash: &hash,
            left_hash: &left.hash,
            right_hash: &right.hash,
            left_state: left.state,
            right_state: right.state,
            height,
            offset,
        });
        Ok(Reduced { hash, state })
    }
}

fn skip_leaf(_: LeafNode<'_>) {}

fn skip_inner(_: InnerNode<'_, ()>) {}
