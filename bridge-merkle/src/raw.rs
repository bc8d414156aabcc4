//! Bitcoin `merkleblock` wire format, as returned by `gettxoutproof`.
//!
//! ```text
//! header              80 bytes, merkle root at bytes 36..68
//! total_transactions  u32 little endian
//! hash_count          CompactSize
//! hashes              hash_count * 32 bytes, internal byte order
//! flag_byte_count     CompactSize
//! flags               flag_byte_count bytes
//! ```

use core::ops::Range;
use std::io::Read;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::debug;

use crate::{
    hash::{decode_hash, double_sha256, encode_hash, HASH_SIZE},
    MerkleBlock, MerkleError, Result,
};

/// Size of a serialized block header.
pub const HEADER_SIZE: usize = 80;

const MERKLE_ROOT_RANGE: Range<usize> = 36..68;

/// A merkleblock exactly as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMerkleBlock {
    /// Serialized block header.
    pub header: [u8; HEADER_SIZE],
    /// Number of transactions in the full block.
    pub num_transactions: u32,
    /// Partial tree hashes in internal byte order.
    pub hashes: Vec<[u8; HASH_SIZE]>,
    /// Packed flag bits, least significant bit first.
    pub flags: Vec<u8>,
}

impl RawMerkleBlock {
    /// Pack a partial tree under `header`.
    ///
    /// The merkle root in the header must be the one the partial tree
    /// commits to.
    pub fn from_partial(header: [u8; HEADER_SIZE], block: &MerkleBlock) -> Result<Self> {
        let root = decode_hash(block.merkle_root())?;
        if header[MERKLE_ROOT_RANGE] != root {
            return Err(MerkleError::InvalidInput(format!(
                "header commits to merkle root {}, partial tree to {}",
                encode_hash(&header_root(&header)),
                block.merkle_root()
            )));
        }
        let hashes = block
            .hashes()
            .iter()
            .map(|hash| decode_hash(hash))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            header,
            num_transactions: block.tx_count(),
            hashes,
            flags: block.flag_bits().to_bytes(),
        })
    }

    /// Merkle root committed in the header, display-order hex.
    pub fn merkle_root(&self) -> String {
        encode_hash(&header_root(&self.header))
    }

    /// Hash of the block header, display-order hex.
    pub fn block_hash(&self) -> String {
        encode_hash(&double_sha256(&self.header))
    }

    /// Serialize to wire bytes.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            HEADER_SIZE + 4 + 9 + self.hashes.len() * HASH_SIZE + 9 + self.flags.len(),
        );
        out.extend_from_slice(&self.header);
        let mut count = [0u8; 4];
        LittleEndian::write_u32(&mut count, self.num_transactions);
        out.extend_from_slice(&count);
        write_compact_size(&mut out, self.hashes.len() as u64);
        for hash in &self.hashes {
            out.extend_from_slice(hash);
        }
        write_compact_size(&mut out, self.flags.len() as u64);
        out.extend_from_slice(&self.flags);
        out
    }

    /// Serialize to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.encode_to_vec())
    }

    /// Deserialize from wire bytes. The whole slice must be consumed.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        decode(bytes).inspect_err(|e| debug!("merkleblock decoding failed: {}", e))
    }

    /// Deserialize from hex, e.g. the output of `gettxoutproof`.
    pub fn from_hex(data: &str) -> Result<Self> {
        let bytes = hex::decode(data.trim())
            .map_err(|e| MerkleError::InvalidData(format!("merkleblock is not hex: {}", e)))?;
        Self::decode_from_slice(&bytes)
    }
}

fn header_root(header: &[u8; HEADER_SIZE]) -> [u8; HASH_SIZE] {
    let mut root = [0u8; HASH_SIZE];
    root.copy_from_slice(&header[MERKLE_ROOT_RANGE]);
    root
}

fn decode(bytes: &[u8]) -> Result<RawMerkleBlock> {
    let mut reader = bytes;

    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header).map_err(truncated("header"))?;
    let num_transactions = reader
        .read_u32::<LittleEndian>()
        .map_err(truncated("transaction count"))?;

    let hash_count = read_compact_size(&mut reader)?;
    if hash_count > (reader.len() / HASH_SIZE) as u64 {
        return Err(MerkleError::InvalidData(format!(
            "{} hashes announced but only {} bytes remain",
            hash_count,
            reader.len()
        )));
    }
    let mut hashes = Vec::with_capacity(hash_count as usize);
    for _ in 0..hash_count {
        let mut hash = [0u8; HASH_SIZE];
        reader.read_exact(&mut hash).map_err(truncated("hash"))?;
        hashes.push(hash);
    }

    let flag_count = read_compact_size(&mut reader)?;
    if flag_count > reader.len() as u64 {
        return Err(MerkleError::InvalidData(format!(
            "{} flag bytes announced but only {} bytes remain",
            flag_count,
            reader.len()
        )));
    }
    let (flags, rest) = reader.split_at(flag_count as usize);
    if !rest.is_empty() {
        return Err(MerkleError::InvalidData(format!(
            "{} trailing bytes after merkleblock",
            rest.len()
        )));
    }

    Ok(RawMerkleBlock {
        header,
        num_transactions,
        hashes,
        flags: flags.to_vec(),
    })
}

fn truncated(field: &'static str) -> impl Fn(std::io::Error) -> MerkleError {
    move |_| MerkleError::InvalidData(format!("merkleblock ends inside the {}", field))
}

fn read_compact_size(reader: &mut &[u8]) -> Result<u64> {
    let prefix = reader.read_u8().map_err(truncated("length prefix"))?;
    let (value, min) = match prefix {
        0xfd => (
            reader
                .read_u16::<LittleEndian>()
                .map_err(truncated("length prefix"))? as u64,
            0xfd,
        ),
        0xfe => (
            reader
                .read_u32::<LittleEndian>()
                .map_err(truncated("length prefix"))? as u64,
            0x1_0000,
        ),
        0xff => (
            reader
                .read_u64::<LittleEndian>()
                .map_err(truncated("length prefix"))?,
            0x1_0000_0000,
        ),
        n => return Ok(n as u64),
    };
    if value < min {
        return Err(MerkleError::InvalidData(format!(
            "non-canonical length prefix {:#04x} for {}",
            prefix, value
        )));
    }
    Ok(value)
}

fn write_compact_size(out: &mut Vec<u8>, value: u64) {
    match value {
        0..=0xfc => out.push(value as u8),
        0xfd..=0xffff => {
            let mut buf = [0u8; 2];
            LittleEndian::write_u16(&mut buf, value as u16);
            out.push(0xfd);
            out.extend_from_slice(&buf);
        }
        0x1_0000..=0xffff_ffff => {
            let mut buf = [0u8; 4];
            LittleEndian::write_u32(&mut buf, value as u32);
            out.push(0xfe);
            out.extend_from_slice(&buf);
        }
        _ => {
            let mut buf = [0u8; 8];
            LittleEndian::write_u64(&mut buf, value);
            out.push(0xff);
            out.extend_from_slice(&buf);
        }
    }
}
