//! Double SHA-256 node hashing in Bitcoin byte order.
//!
//! Hashes cross the public API as lowercase hex in display order (the
//! reversed rendering shown by block explorers and RPCs). Hashing itself
//! works on the internal order, so every combine reverses on the way in and
//! on the way out.

use sha2::{Digest, Sha256};

use crate::{MerkleError, Result};

/// Size of a Bitcoin hash in bytes.
pub const HASH_SIZE: usize = 32;

/// The all-zero hash in display hex.
pub const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// `SHA256(SHA256(data))`.
pub fn double_sha256(data: &[u8]) -> [u8; HASH_SIZE] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Hash two sibling nodes into their parent.
///
/// Both inputs are display-order hex. They are reversed into internal order,
/// concatenated `left || right`, double hashed, and the digest is reversed
/// back before hex encoding.
pub fn combine(left: &str, right: &str) -> Result<String> {
    let mut preimage = [0u8; 2 * HASH_SIZE];
    preimage[..HASH_SIZE].copy_from_slice(&decode_hash(left)?);
    preimage[HASH_SIZE..].copy_from_slice(&decode_hash(right)?);
    Ok(encode_hash(&double_sha256(&preimage)))
}

/// Decode a display-order hex hash into internal byte order.
pub(crate) fn decode_hash(hash: &str) -> Result<[u8; HASH_SIZE]> {
    let mut bytes = [0u8; HASH_SIZE];
    hex::decode_to_slice(hash, &mut bytes).map_err(|e| {
        MerkleError::InvalidInput(format!("hash {:?} is not 32 bytes of hex: {}", hash, e))
    })?;
    bytes.reverse();
    Ok(bytes)
}

/// Encode internal-order bytes as a display-order hex hash.
pub(crate) fn encode_hash(internal: &[u8; HASH_SIZE]) -> String {
    let mut bytes = *internal;
    bytes.reverse();
    hex::encode(bytes)
}
