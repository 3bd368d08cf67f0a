// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! # RLE+ Bitset Encoding
//!
//! RLE+ is a lossless compression format based on [RLE](https://en.wikipedia.org/wiki/Run-length_encoding).
//! Its primary goal is to reduce the size in the case of many individual bits, where RLE breaks down quickly,
//! while keeping the same level of compression for large sets of contiguous bits.
//!
//! ## Format
//!
//! The format consists of a header, followed by a series of blocks, of which there are three different types.
//!
//! The format can be expressed as the following [BNF](https://en.wikipedia.org/wiki/Backus%E2%80%93Naur_form) grammar.
//!
//! ```text
//!     <encoding>  ::= <header> <blocks>
//!       <header>  ::= <version> <bit>
//!      <version>  ::= "00"
//!       <blocks>  ::= <block> <blocks> | ""
//!        <block>  ::= <block_single> | <block_short> | <block_long>
//! <block_single>  ::= "1"
//!  <block_short>  ::= "01" <bit> <bit> <bit> <bit>
//!   <block_long>  ::= "00" <unsigned_varint>
//!          <bit>  ::= "0" | "1"
//! ```
//!
//! An `<unsigned_varint>` is defined as specified [here](https://github.com/multiformats/unsigned-varint).
//!
//! The header stores the very first bit of the bit vector to encode. Each block stores the
//! length of the current run of bits; as `0` and `1` alternate, the header bit is enough to
//! determine which bit every run refers to. A zero-length run terminates decoding; anything
//! following it is ignored.

mod reader;
mod writer;

pub use reader::BitReader;
pub use writer::BitWriter;

use super::BitField;
use fvm_ipld_encoding::strict_bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The maximum encoded size of a bitfield. When expanded into a slice of runs,
/// a bitfield of this size should not exceed 2MiB of memory. It can fit at
/// least 3072 sparse elements.
pub const MAX_ENCODED_SIZE: usize = 32 << 10;

/// An error decoding an RLE+ encoded bitfield.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("incorrect version, expected 00")]
    Version,
    #[error("invalid varint")]
    InvalidVarint,
    #[error("run lengths overflow u64")]
    RunOverflow,
    #[error("encoded bitfield exceeds {MAX_ENCODED_SIZE} bytes")]
    TooLarge,
}

impl Serialize for BitField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bytes = self.to_bytes();
        if bytes.len() > MAX_ENCODED_SIZE {
            return Err(serde::ser::Error::custom(Error::TooLarge));
        }
        strict_bytes::serialize(bytes.as_slice(), serializer)
    }
}

impl<'de> Deserialize<'de> for BitField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = strict_bytes::deserialize(deserializer)?;
        Self::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

impl BitField {
    /// Decodes RLE+ encoded bytes into a bitfield.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() > MAX_ENCODED_SIZE {
            return Err(Error::TooLarge);
        }

        let mut reader = BitReader::new(bytes);

        if reader.read(2) != 0 {
            return Err(Error::Version);
        }

        let mut next_value = reader.read(1) == 1;
        let mut ranges = Vec::new();
        let mut index = 0u64;

        while let Some(len) = reader.read_len()? {
            let start = index;
            index = index.checked_add(len).ok_or(Error::RunOverflow)?;

            if next_value {
                ranges.push(start..index);
            }

            next_value = !next_value;
        }

        Ok(Self { ranges })
    }

    /// Turns a bitfield into its RLE+ encoded form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut iter = self.ranges();

        let first_range = match iter.next() {
            Some(range) => range,
            None => return Default::default(),
        };

        let mut writer = BitWriter::new();
        writer.write(0, 2); // version 00

        if first_range.start == 0 {
            writer.write(1, 1); // the first bit is a 1
        } else {
            writer.write(0, 1); // the first bit is a 0
            writer.write_len(first_range.start); // the number of leading 0s
        }

        writer.write_len(first_range.end - first_range.start);
        let mut index = first_range.end;

        // for each run of 1s, first encode the number of 0s that came before it
        for range in iter {
            writer.write_len(range.start - index); // zeros
            writer.write_len(range.end - range.start); // ones
            index = range.end;
        }

        writer.finish()
    }
}
