mod test_raw;

use crate::{
    hash::{decode_hash, double_sha256, encode_hash},
    HEADER_SIZE,
};

/// Transaction hashes of mainnet block 100000.
pub(crate) const BLOCK_100000_TXIDS: [&str; 4] = [
    "8c14f0db3df150123e6f3dbbf30f8b955a8249b62ac1d1ff16284aefa3d06d87",
    "fff2525b8931402dd09222c50775608f75787bd2b87e56995a7bdd30f79702c4",
    "6359f0868171b1d194cbee1af2f16ea598ae8fad666d9b012c8ed2b79a236ec4",
    "e9a66845e05d5abc0ad04ec80f774a7e585c6e8db975962d069a522137b80c1d",
];

/// Merkle root of mainnet block 100000.
pub(crate) const BLOCK_100000_ROOT: &str =
    "f3e94742aca4b5ef85488dc37c06c3282295ffec960994b2c0d5ac2a25a95766";

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A deterministic, distinct leaf hash for index `i`.
pub(crate) fn leaf(i: u32) -> String {
    encode_hash(&double_sha256(&i.to_le_bytes()))
}

pub(crate) fn leaves(count: u32) -> Vec<String> {
    (0..count).map(leaf).collect()
}

/// A header shaped like the regtest genesis block, committing to
/// `merkle_root`.
pub(crate) fn header_for(merkle_root: &str) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&1u32.to_le_bytes());
    header[36..68].copy_from_slice(&decode_hash(merkle_root).expect("valid root"));
    header[68..72].copy_from_slice(&1_296_688_602u32.to_le_bytes());
    header[72..76].copy_from_slice(&0x207f_ffffu32.to_le_bytes());
    header[76..80].copy_from_slice(&2u32.to_le_bytes());
    header
}

/// Replace the hex digit at `position` with a different one.
pub(crate) fn tamper_hex(hash: &str, position: usize) -> String {
    let mut chars: Vec<char> = hash.chars().collect();
    chars[position] = if chars[position] == '0' { '1' } else { '0' };
    chars.into_iter().collect()
}
