// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

/// A `BitWriter` allows for efficiently writing bits to a byte buffer, up to a byte at a time.
///
/// Bits are written in order from least significant to most significant.
pub struct BitWriter {
    /// The buffer that is written to.
    bytes: Vec<u8>,
    /// The bits that have not been written to the buffer yet.
    bits: u64,
    /// The number of bits in `bits`.
    num_bits: u32,
}

impl BitWriter {
    /// Creates a new `BitWriter`.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            bits: 0,
            num_bits: 0,
        }
    }

    /// Writes a given number of bits from `bits` to the buffer. Must be 8 or fewer.
    pub fn write(&mut self, bits: u8, num_bits: u32) {
        debug_assert!(num_bits <= 8);
        debug_assert!(num_bits == 8 || bits < (1 << num_bits));

        self.bits |= u64::from(bits) << self.num_bits;
        self.num_bits += num_bits;

        while self.num_bits >= 8 {
            self.bytes.push(self.bits as u8);
            self.bits >>= 8;
            self.num_bits -= 8;
        }
    }

    /// Writes a non-zero run length to the buffer.
    pub fn write_len(&mut self, len: u64) {
        debug_assert!(len > 0);

        if len == 1 {
            // single block: "1"
            self.write(1, 1);
        } else if len < 16 {
            // short block: "01" followed by 4 bits
            self.write(2, 2);
            self.write(len as u8, 4);
        } else {
            // long block: "00" followed by an unsigned varint
            self.write(0, 2);
            let mut len = len;
            while len >= 0x80 {
                self.write((len & 0x7f) as u8 | 0x80, 8);
                len >>= 7;
            }
            self.write(len as u8, 8);
        }
    }

    /// Writes any remaining bits to the buffer and returns it. Trailing bytes
    /// that carry no set bits are omitted, the decoder reads past-the-end bits
    /// as zeros.
    pub fn finish(mut self) -> Vec<u8> {
        if self.num_bits > 0 && self.bits != 0 {
            self.bytes.push(self.bits as u8);
        }
        while let Some(&0) = self.bytes.last() {
            self.bytes.pop();
        }
        self.bytes
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}
