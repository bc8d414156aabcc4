use thiserror::Error;

/// Alias for `core::result::Result<T, MerkleError>`.
pub type Result<T> = core::result::Result<T, MerkleError>;

/// Errors from Merkle root computation and partial Merkle tree handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// Arguments rejected before any traversal starts (zero leaves,
    /// malformed hex, mismatched lengths).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The partial Merkle tree is structurally inconsistent or does not
    /// commit to the expected root. Never trust a proof that produced this.
    #[error("invalid merkle proof: {0}")]
    InvalidMerkleProof(String),
    /// Serialized merkleblock bytes could not be decoded.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
