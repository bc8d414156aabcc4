//! Bitcoin Merkle trees and partial Merkle trees for two-way-peg bridge
//! tests.
//!
//! Bridge scenarios prove Bitcoin transactions to the Rootstock bridge with
//! SPV proofs: a block header plus a partial Merkle tree (PMT) that commits
//! the transaction to the header's merkle root. This crate computes and
//! checks those trees with Bitcoin's exact rules:
//!
//! - node hash: `SHA256(SHA256(left || right))` over internal byte order,
//!   with hashes exchanged as display-order hex;
//! - an odd node at the end of a level is paired with itself;
//! - PMT flags are consumed in pre-order, least significant bit first per
//!   byte.
//!
//! # Core types
//!
//! - [`MerkleTree`]: root and generalized reduce over a full transaction
//!   list, plus PMT construction.
//! - [`MerkleBlock`]: PMT verification and generalized reduce. Rejects
//!   unconsumed hashes, non-padding leftover flag bits, equal sibling
//!   branches and root mismatches.
//! - [`RawMerkleBlock`]: the `merkleblock` wire format.
//! - [`FlagBits`]: packed flag bits with a cursor.

#![warn(missing_docs)]

mod block;
mod builder;
mod error;
mod flags;
pub(crate) mod hash;
/// Tree shape arithmetic.
pub(crate) mod helper;
mod node;
mod raw;
mod tree;

#[cfg(test)]
mod tests;

pub use block::MerkleBlock;
pub use error::{MerkleError, Result};
pub use flags::{expand_flag_bits, FlagBits, FlagReader};
pub use hash::{combine, double_sha256, HASH_SIZE, ZERO_HASH};
pub use helper::{level_width, tree_height};
pub use node::{InnerNode, LeafNode};
pub use raw::{RawMerkleBlock, HEADER_SIZE};
pub use tree::MerkleTree;
