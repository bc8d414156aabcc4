use crate::{MerkleError, Result};

/// Height of the Merkle tree over `leaf_count` leaves: `ceil(log2(n))`.
///
/// A single leaf is already the root, so its height is 0. A tree must have at
/// least one leaf.
pub fn tree_height(leaf_count: u32) -> Result<u32> {
    if leaf_count == 0 {
        return Err(MerkleError::InvalidInput(
            "a merkle tree needs at least one leaf".into(),
        ));
    }
    Ok(u32::BITS - (leaf_count - 1).leading_zeros())
}

/// Number of nodes at `height` in the tree over `leaf_count` leaves.
///
/// Follows the Bitcoin convention where an odd node at the end of a level is
/// paired with itself, so every level is `ceil(width_below / 2)` wide:
///
/// ```text
/// width(n, h) = (n + 2^h - 1) / 2^h
/// ```
pub fn level_width(leaf_count: u32, height: u32) -> u64 {
    // Everything above height 32 has collapsed into the root.
    if height > u32::BITS {
        return u64::from(leaf_count != 0);
    }
    (leaf_count as u64 + (1u64 << height) - 1) >> height
}
