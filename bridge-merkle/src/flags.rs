//! Partial Merkle tree flag bits.
//!
//! On the wire, flags are packed into bytes and read least significant bit
//! first. [`FlagBits`] keeps that packed form and hands out a
//! [`FlagReader`] cursor, so walking a tree never slices or allocates
//! strings. The textual form (`"10110"`) is the same bit sequence written
//! left to right in consumption order.

use core::{fmt, str::FromStr};

use crate::{MerkleError, Result};

/// Expand wire-format flag bytes into a `'0'`/`'1'` string in consumption
/// order (each byte contributes its bits least significant first).
pub fn expand_flag_bits(flag_bytes: &[u8]) -> String {
    FlagBits::from_bytes(flag_bytes).to_string()
}

/// An ordered sequence of flag bits, packed LSB first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct FlagBits {
    bytes: Vec<u8>,
    len: usize,
}

impl FlagBits {
    /// Wrap wire-format flag bytes. Every bit of every byte is kept,
    /// including the zero padding of the last byte.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            len: bytes.len() * 8,
        }
    }

    /// Build from bits in consumption order.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut flags = Self::default();
        for bit in bits {
            flags.push(bit);
        }
        flags
    }

    /// Append one bit.
    pub fn push(&mut self, bit: bool) {
        let byte = self.len / 8;
        if byte == self.bytes.len() {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[byte] |= 1 << (self.len % 8);
        }
        self.len += 1;
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no bits at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bit at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some((self.bytes[index / 8] >> (index % 8)) & 1 == 1)
    }

    /// Iterate over the bits in consumption order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Packed wire form; the last byte is zero padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// A cursor positioned at the first bit.
    pub fn reader(&self) -> FlagReader<'_> {
        FlagReader {
            flags: self,
            position: 0,
        }
    }
}

impl fmt::Display for FlagBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for FlagBits {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self> {
        let mut flags = Self::default();
        for (i, c) in s.chars().enumerate() {
            match c {
                '0' => flags.push(false),
                '1' => flags.push(true),
                other => {
                    return Err(MerkleError::InvalidInput(format!(
                        "flag string has {:?} at position {}, expected '0' or '1'",
                        other, i
                    )))
                }
            }
        }
        Ok(flags)
    }
}

impl TryFrom<String> for FlagBits {
    type Error = MerkleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FlagBits> for String {
    fn from(flags: FlagBits) -> Self {
        flags.to_string()
    }
}

/// Left-to-right cursor over [`FlagBits`].
#[derive(Debug, Clone)]
pub struct FlagReader<'a> {
    flags: &'a FlagBits,
    position: usize,
}

impl FlagReader<'_> {
    /// Consume the next bit, or `None` once exhausted.
    pub fn next_bit(&mut self) -> Option<bool> {
        let bit = self.flags.get(self.position)?;
        self.position += 1;
        Some(bit)
    }

    /// Number of bits consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of bits not yet consumed.
    pub fn remaining(&self) -> usize {
        self.flags.len() - self.position
    }

    /// Whether the unconsumed tail is byte-alignment padding: fewer than 8
    /// bits, all zero.
    pub fn remaining_is_padding(&self) -> bool {
        self.remaining() < 8
            && (self.position..self.flags.len()).all(|i| self.flags.get(i) == Some(false))
    }
}
