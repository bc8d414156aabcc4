//! Partial Merkle tree verification.
//!
//! A partial tree lists, in pre-order, one flag bit per visited node and one
//! hash per node that is not expanded further. Decoding walks the implied
//! tree from the root, recomputes every expanded node, and finally checks
//! that both streams were consumed exactly and that the recomputed root is
//! the expected one.

use log::debug;

use crate::{
    flags::{FlagBits, FlagReader},
    hash::{combine, encode_hash},
    helper::{level_width, tree_height},
    node::Reduced,
    InnerNode, LeafNode, MerkleError, RawMerkleBlock, Result,
};

/// A partial Merkle tree together with the root it claims to commit to.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct MerkleBlock {
    merkle_root: String,
    hashes: Vec<String>,
    flags: FlagBits,
    tx_count: u32,
}

impl MerkleBlock {
    /// Wrap a partial tree.
    ///
    /// `hashes` is the pre-order partial hash list, `flags` the expanded flag
    /// bits and `tx_count` the number of transactions in the full block.
    pub fn new(
        merkle_root: impl Into<String>,
        hashes: Vec<String>,
        flags: FlagBits,
        tx_count: u32,
    ) -> Self {
        Self {
            merkle_root: merkle_root.into(),
            hashes,
            flags,
            tx_count,
        }
    }

    /// Convert a wire-format merkleblock, reversing the raw hashes into
    /// display order and expanding the flag bytes.
    pub fn from_raw(raw: &RawMerkleBlock) -> Self {
        Self::new(
            raw.merkle_root(),
            raw.hashes.iter().map(encode_hash).collect(),
            FlagBits::from_bytes(&raw.flags),
            raw.num_transactions,
        )
    }

    /// The root this partial tree is expected to commit to.
    pub fn merkle_root(&self) -> &str {
        &self.merkle_root
    }

    /// A copy of the partial hash list.
    pub fn hashes(&self) -> Vec<String> {
        self.hashes.clone()
    }

    /// The flag bits as a `'0'`/`'1'` string.
    pub fn flags(&self) -> String {
        self.flags.to_string()
    }

    /// The flag bits.
    pub fn flag_bits(&self) -> &FlagBits {
        &self.flags
    }

    /// Number of transactions in the full block.
    pub fn tx_count(&self) -> u32 {
        self.tx_count
    }

    /// Whether `hash` appears in the partial hash list. Comparison is exact.
    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.iter().any(|h| h == hash)
    }

    /// Fold the partial tree, guided by the flag bits, and validate it.
    ///
    /// `leaf` is called for every node whose hash is given directly and
    /// `inner` for every expanded node. Fails with
    /// [`MerkleError::InvalidMerkleProof`] if a stream runs short, sibling
    /// branches hash equal, hashes or non-padding flag bits are left over, or
    /// the recomputed root differs from [`merkle_root`](Self::merkle_root).
    pub fn reduce<S, L, I>(&self, mut leaf: L, mut inner: I) -> Result<S>
    where
        S: Clone,
        L: FnMut(LeafNode<'_>) -> S,
        I: FnMut(InnerNode<'_, S>) -> S,
    {
        let height = tree_height(self.tx_count)?;
        let mut cursor = Cursor {
            hashes: &self.hashes,
            flags: self.flags.reader(),
        };
        let root = self
            .reduce_from(height, 0, &mut cursor, &mut leaf, &mut inner)
            .inspect_err(|e| debug!("partial merkle tree rejected: {}", e))?;

        if !cursor.hashes.is_empty() {
            return Err(reject(format!(
                "{} of {} hashes were not consumed",
                cursor.hashes.len(),
                self.hashes.len()
            )));
        }
        if !cursor.flags.remaining_is_padding() {
            return Err(reject(format!(
                "{} flag bits left over after bit {} are not zero padding",
                cursor.flags.remaining(),
                cursor.flags.position()
            )));
        }
        if root.hash != self.merkle_root {
            return Err(reject(format!(
                "computed root {} does not match expected root {}",
                root.hash, self.merkle_root
            )));
        }

        Ok(root.state)
    }

    /// Validate the partial tree without collecting anything.
    pub fn verify(&self) -> Result<()> {
        self.reduce(|_| (), |_| ())
    }

    /// The transaction hashes this proof commits to, in block order.
    pub fn matched_hashes(&self) -> Result<Vec<String>> {
        self.reduce(
            |node| {
                if node.matched {
                    vec![node.hash.to_owned()]
                } else {
                    Vec::new()
                }
            },
            |node| {
                let mut matched = node.left_state;
                // a duplicated right branch repeats the left one
                if node.left_hash != node.right_hash {
                    matched.extend(node.right_state);
                }
                matched
            },
        )
    }

    /// Whether this proof is valid and commits to `hash` as a transaction.
    pub fn proves(&self, hash: &str) -> Result<bool> {
        self.reduce(
            |node| node.matched && node.hash == hash,
            |node| node.left_state || node.right_state,
        )
    }

    fn reduce_from<S, L, I>(
        &self,
        height: u32,
        offset: u64,
        cursor: &mut Cursor<'_>,
        leaf: &mut L,
        inner: &mut I,
    ) -> Result<Reduced<S>>
    where
        S: Clone,
        L: FnMut(LeafNode<'_>) -> S,
        I: FnMut(InnerNode<'_, S>) -> S,
    {
        let expand = cursor.next_flag()?;

        // At the bottom level the node is a leaf whatever the flag says.
        if !expand || height == 0 {
            let hash = cursor.next_hash()?;
            let state = leaf(LeafNode {
                hash,
                height,
                offset,
                matched: expand,
            });
            return Ok(Reduced {
                hash: hash.to_owned(),
                state,
            });
        }

        let left = self.reduce_from(height - 1, offset * 2, cursor, leaf, inner)?;
        let right = if offset * 2 + 1 < level_width(self.tx_count, height - 1) {
            let right = self.reduce_from(height - 1, offset * 2 + 1, cursor, leaf, inner)?;
            if right.hash == left.hash {
                return Err(MerkleError::InvalidMerkleProof(format!(
                    "found equal hashes for left and right branches at height {} offset {}",
                    height, offset
                )));
            }
            right
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

/// Read position in both streams of a partial tree.
struct Cursor<'a> {
    hashes: &'a [String],
    flags: FlagReader<'a>,
}

impl<'a> Cursor<'a> {
    fn next_flag(&mut self) -> Result<bool> {
        self.flags.next_bit().ok_or_else(|| {
            MerkleError::InvalidMerkleProof(format!(
                "ran out of flag bits after {}",
                self.flags.position()
            ))
        })
    }

    fn next_hash(&mut self) -> Result<&'a str> {
        let (first, rest) = self
            .hashes
            .split_first()
            .ok_or_else(|| MerkleError::InvalidMerkleProof("ran out of hashes".into()))?;
        self.hashes = rest;
        Ok(first.as_str())
    }
}

fn reject(reason: String) -> MerkleError {
    debug!("partial merkle tree rejected: {}", reason);
    MerkleError::InvalidMerkleProof(reason)
}
