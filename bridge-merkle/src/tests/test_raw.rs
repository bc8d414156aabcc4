use assert_matches::assert_matches;

use super::{header_for, init_logger, leaf, leaves};
use crate::{MerkleBlock, MerkleError, MerkleTree, RawMerkleBlock, HEADER_SIZE};

const REGTEST_GENESIS_ROOT: &str =
    "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";
const REGTEST_GENESIS_HASH: &str =
    "0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206";

fn four_leaf_raw() -> RawMerkleBlock {
    let tree = MerkleTree::new(leaves(4));
    let block = tree.build_partial_tree_for(&[leaf(2).as_str()]).unwrap();
    RawMerkleBlock::from_partial(header_for(block.merkle_root()), &block).unwrap()
}

#[test]
fn test_genesis_block_proof() {
    let tree = MerkleTree::new([REGTEST_GENESIS_ROOT]);
    let block = tree.build_partial_tree(&[true]).unwrap();
    let raw = RawMerkleBlock::from_partial(header_for(REGTEST_GENESIS_ROOT), &block).unwrap();

    assert_eq!(raw.block_hash(), REGTEST_GENESIS_HASH);
    assert_eq!(raw.merkle_root(), REGTEST_GENESIS_ROOT);

    let decoded = MerkleBlock::from_raw(&RawMerkleBlock::from_hex(&raw.to_hex()).unwrap());
    assert!(decoded.proves(REGTEST_GENESIS_ROOT).unwrap());
}

#[test]
fn test_wire_layout() {
    let raw = four_leaf_raw();
    let bytes = raw.encode_to_vec();

    assert_eq!(bytes.len(), HEADER_SIZE + 4 + 1 + 3 * 32 + 1 + 1);
    assert_eq!(&bytes[..HEADER_SIZE], &raw.header[..]);
    assert_eq!(&bytes[80..84], &4u32.to_le_bytes());
    assert_eq!(bytes[84], 3);
    // first hash stored in internal (reversed) order
    let mut first = raw.hashes[0];
    first.reverse();
    assert_eq!(hex::encode(first), crate::combine(&leaf(0), &leaf(1)).unwrap());
    assert_eq!(&bytes[85..117], &raw.hashes[0][..]);
    assert_eq!(bytes[181], 1);
    // "10110" packed least significant bit first
    assert_eq!(bytes[182], 0b0000_1101);
}

#[test]
fn test_round_trip_through_hex() {
    init_logger();
    let tree = MerkleTree::new(leaves(7));
    let block = tree
        .build_partial_tree_for(&[leaf(3).as_str(), leaf(5).as_str()])
        .unwrap();
    let raw = RawMerkleBlock::from_partial(header_for(block.merkle_root()), &block).unwrap();

    let decoded = RawMerkleBlock::from_hex(&raw.to_hex()).unwrap();
    assert_eq!(decoded, raw);

    let from_wire = MerkleBlock::from_raw(&decoded);
    assert_eq!(from_wire.merkle_root(), tree.merkle_root().unwrap());
    assert_eq!(from_wire.hashes(), block.hashes());
    assert_eq!(from_wire.tx_count(), 7);
    assert_eq!(from_wire.flags().len() % 8, 0);
    assert!(from_wire.flags().starts_with(&block.flags()));
    assert_eq!(from_wire.matched_hashes().unwrap(), vec![leaf(3), leaf(5)]);
}

#[test]
fn test_header_must_commit_to_partial_tree_root() {
    let tree = MerkleTree::new(leaves(4));
    let block = tree.build_partial_tree(&[true, false, false, false]).unwrap();
    assert_matches!(
        RawMerkleBlock::from_partial(header_for(&leaf(9)), &block),
        Err(MerkleError::InvalidInput(_))
    );
}

#[test]
fn test_tampered_wire_hash_fails_verification() {
    let mut raw = four_leaf_raw();
    raw.hashes[1][0] ^= 0x01;
    assert_matches!(
        MerkleBlock::from_raw(&raw).verify(),
        Err(MerkleError::InvalidMerkleProof(_))
    );
}

#[test]
fn test_decode_rejects_truncated_input() {
    let bytes = four_leaf_raw().encode_to_vec();
    for len in [0, 10, HEADER_SIZE, HEADER_SIZE + 2, 100, bytes.len() - 1] {
        assert_matches!(
            RawMerkleBlock::decode_from_slice(&bytes[..len]),
            Err(MerkleError::InvalidData(_)),
            "length {}",
            len
        );
    }
}

#[test]
fn test_decode_rejects_trailing_bytes() {
    let mut bytes = four_leaf_raw().encode_to_vec();
    bytes.push(0);
    assert_matches!(
        RawMerkleBlock::decode_from_slice(&bytes),
        Err(MerkleError::InvalidData(msg)) if msg.contains("trailing")
    );
}

#[test]
fn test_decode_rejects_non_canonical_length() {
    let bytes = four_leaf_raw().encode_to_vec();
    let mut widened = bytes[..84].to_vec();
    widened.extend_from_slice(&[0xfd, 0x03, 0x00]);
    widened.extend_from_slice(&bytes[85..]);
    assert_matches!(
        RawMerkleBlock::decode_from_slice(&widened),
        Err(MerkleError::InvalidData(msg)) if msg.contains("non-canonical")
    );
}

#[test]
fn test_decode_rejects_oversized_hash_count() {
    let bytes = four_leaf_raw().encode_to_vec();
    let mut inflated = bytes[..84].to_vec();
    inflated.extend_from_slice(&[0xfe, 0xff, 0xff, 0xff, 0x00]);
    inflated.extend_from_slice(&bytes[85..]);
    assert_matches!(
        RawMerkleBlock::decode_from_slice(&inflated),
        Err(MerkleError::InvalidData(msg)) if msg.contains("announced")
    );
}

#[test]
fn test_from_hex_rejects_garbage() {
    assert_matches!(
        RawMerkleBlock::from_hex("not hex"),
        Err(MerkleError::InvalidData(_))
    );
}
