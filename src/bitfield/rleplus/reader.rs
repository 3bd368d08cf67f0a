// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::Error;

/// A `BitReader` allows for efficiently reading bits from a byte buffer, up to a byte at a time.
///
/// Bits are read in order from least significant to most significant. Reads past the end of
/// the buffer yield zero bits.
pub struct BitReader<'a> {
    /// The bytes that have not been read from yet.
    bytes: &'a [u8],
    /// The bits from the buffer that have been read into `bits` but not yet consumed.
    bits: u64,
    /// The number of valid bits in `bits`.
    num_bits: u32,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            bits: 0,
            num_bits: 0,
        }
    }

    /// Reads the given number of bits from the buffer. Must be 8 or fewer.
    pub fn read(&mut self, num_bits: u32) -> u8 {
        debug_assert!(num_bits <= 8);

        while self.num_bits < num_bits {
            let (&byte, rest) = match self.bytes.split_first() {
                Some(split) => split,
                // reads beyond the end of the buffer produce zeros
                None => break,
            };
            self.bits |= u64::from(byte) << self.num_bits;
            self.num_bits += 8;
            self.bytes = rest;
        }

        let res = (self.bits & ((1 << num_bits) - 1)) as u8;
        self.bits >>= num_bits;
        self.num_bits = self.num_bits.saturating_sub(num_bits);
        res
    }

    /// Reads an unsigned varint from the buffer, erroring on overlong or
    /// non-minimal encodings.
    fn read_varint(&mut self) -> Result<u64, Error> {
        let mut len = 0u64;

        for i in 0..10 {
            let byte = self.read(8);

            // the tenth byte can only contribute the 64th bit
            if i == 9 && byte > 1 {
                return Err(Error::InvalidVarint);
            }
            len |= u64::from(byte & 0x7f) << (i * 7);

            if byte & 0x80 == 0 {
                // a zero continuation byte would make the encoding non-minimal
                if byte == 0 && i > 0 {
                    return Err(Error::InvalidVarint);
                }
                return Ok(len);
            }
        }

        Err(Error::InvalidVarint)
    }

    /// Reads a run length from the buffer, or `None` once a zero-length run (the
    /// terminator) is reached.
    pub fn read_len(&mut self) -> Result<Option<u64>, Error> {
        let len = if self.read(1) == 1 {
            // single block
            1
        } else if self.read(1) == 1 {
            // short block
            u64::from(self.read(4))
        } else {
            // long block
            self.read_varint()?
        };

        Ok((len > 0).then_some(len))
    }
}
