//! Partial Merkle tree construction.
//!
//! Built as a reduce over the full tree: every subtree folds into its
//! pre-order encoding, and a subtree without matched leaves collapses into
//! its own hash.

use log::trace;

use crate::{helper::level_width, FlagBits, MerkleBlock, MerkleError, MerkleTree, Result};

/// Pre-order encoding of one subtree.
#[derive(Debug, Clone, Default)]
struct Encoding {
    has_match: bool,
    flags: Vec<bool>,
    hashes: Vec<String>,
}

impl Encoding {
    fn pruned(hash: &str) -> Self {
        Self {
            has_match: false,
            flags: vec![false],
            hashes: vec![hash.to_owned()],
        }
    }
}

impl MerkleTree {
    /// Build the partial Merkle tree proving the leaves flagged in `matches`.
    ///
    /// `matches` holds one entry per leaf, in block order.
    pub fn build_partial_tree(&self, matches: &[bool]) -> Result<MerkleBlock> {
        if matches.len() != self.tx_count() {
            return Err(MerkleError::InvalidInput(format!(
                "{} match flags for {} leaves",
                matches.len(),
                self.tx_count()
            )));
        }
        let leaf_count = self.leaf_count()?;

        let encoding = self.reduce(
            |node| {
                let matched = usize::try_from(node.offset)
                    .ok()
                    .and_then(|index| matches.get(index))
                    .copied()
                    .unwrap_or(false);
                Encoding {
                    has_match: matched,
                    flags: vec![matched],
                    hashes: vec![node.hash.to_owned()],
                }
            },
            |node| {
                let has_right = node.offset * 2 + 1 < level_width(leaf_count, node.height - 1);
                let has_match =
                    node.left_state.has_match || (has_right && node.right_state.has_match);
                if !has_match {
                    return Encoding::pruned(node.hash);
                }

                let mut encoding = Encoding {
                    has_match,
                    flags: vec![true],
                    hashes: Vec::new(),
                };
                encoding.flags.extend(node.left_state.flags);
                encoding.hashes.extend(node.left_state.hashes);
                if has_right {
                    encoding.flags.extend(node.right_state.flags);
                    encoding.hashes.extend(node.right_state.hashes);
                }
                encoding
            },
        )?;

        let root = self.merkle_root()?;
        trace!(
            "built partial merkle tree with {} hashes and {} flag bits for root {}",
            encoding.hashes.len(),
            encoding.flags.len(),
            root
        );
        Ok(MerkleBlock::new(
            root,
            encoding.hashes,
            FlagBits::from_bits(encoding.flags),
            leaf_count,
        ))
    }

    /// Build the partial Merkle tree proving the given leaf hashes.
    ///
    /// Every requested hash must be a leaf of this tree.
    pub fn build_partial_tree_for(&self, hashes: &[&str]) -> Result<MerkleBlock> {
        if let Some(missing) = hashes.iter().find(|hash| !self.contains(hash)) {
            return Err(MerkleError::InvalidInput(format!(
                "{} is not a leaf of this tree",
                missing
            )));
        }
        let matches: Vec<bool> = self
            .hashes()
            .iter()
            .map(|leaf| hashes.contains(&leaf.as_str()))
            .collect();
        self.build_partial_tree(&matches)
    }
}
