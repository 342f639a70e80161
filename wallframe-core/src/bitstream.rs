//! Byte and bit level readers for container parsing.
//!
//! [`ByteReader`] is a bounds-checked cursor over a byte slice. Every multi-byte
//! read names its endianness: PNG stores integers big-endian while GIF stores
//! them little-endian, and mixing the two silently corrupts dimensions.
//!
//! [`BitReader`] and [`BitWriter`] pack codes least-significant-bit first, the
//! order used by GIF's LZW stream.

use crate::error::{BitstreamError, Error, Result};

/// A sequential cursor over a byte buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Create a reader positioned at `pos`.
    pub fn with_position(data: &'a [u8], pos: usize) -> Self {
        Self {
            data,
            pos: pos.min(data.len()),
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check if the cursor reached the end of the buffer.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// The unread tail of the buffer.
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(BitstreamError::UnexpectedEnd {
                offset: self.pos,
                needed,
                available: self.remaining(),
            }
            .into());
        }
        Ok(())
    }

    /// Read `n` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Read a fixed-size array, advancing the cursor.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Look at the next `n` bytes without consuming them.
    pub fn peek_bytes(&self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        Ok(&self.data[self.pos..self.pos + n])
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read an unsigned 8-bit value.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let value = self.data[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Read an unsigned 16-bit value (big-endian).
    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// Read an unsigned 16-bit value (little-endian).
    pub fn read_u16_le(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read an unsigned 32-bit value (big-endian).
    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Read an unsigned 32-bit value (little-endian).
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read a block whose length is given by a leading big-endian `u32`.
    pub fn read_block_u32_be(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32_be()? as usize;
        self.read_bytes(len)
    }

    /// Read a chain of sub-blocks and concatenate their payloads.
    ///
    /// Each sub-block is a size byte followed by that many bytes; a size of
    /// zero terminates the chain and is consumed.
    pub fn read_sub_blocks(&mut self) -> Result<Vec<u8>> {
        let mut collected = Vec::new();
        loop {
            let size = self.read_u8()? as usize;
            if size == 0 {
                break;
            }
            collected.extend_from_slice(self.read_bytes(size)?);
        }
        Ok(collected)
    }

    /// Skip a chain of sub-blocks, including its terminator.
    pub fn skip_sub_blocks(&mut self) -> Result<()> {
        loop {
            let size = self.read_u8()? as usize;
            if size == 0 {
                return Ok(());
            }
            self.skip(size)?;
        }
    }
}

/// A bit reader that consumes bits least-significant-bit first.
///
/// Codes may straddle byte boundaries; the low bits of a code come from the
/// earlier byte.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new bit reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Get the total number of bits in the stream.
    pub fn total_bits(&self) -> usize {
        self.data.len() * 8
    }

    /// Get the current bit position in the stream.
    pub fn position(&self) -> usize {
        self.bit_pos
    }

    /// Get the number of remaining bits.
    pub fn remaining_bits(&self) -> usize {
        self.total_bits().saturating_sub(self.bit_pos)
    }

    /// Read up to 16 bits as an unsigned integer.
    pub fn read_bits(&mut self, n: u8) -> Result<u16> {
        if n > 16 {
            return Err(Error::invalid_param(format!(
                "Cannot read {n} bits at once (max 16)"
            )));
        }
        if self.remaining_bits() < n as usize {
            return Err(BitstreamError::UnexpectedEnd {
                offset: self.bit_pos / 8,
                needed: (n as usize).div_ceil(8),
                available: self.data.len() - self.bit_pos / 8,
            }
            .into());
        }

        let mut value = 0u16;
        let mut filled = 0u8;
        while filled < n {
            let byte = self.data[self.bit_pos / 8];
            let bit_offset = (self.bit_pos % 8) as u8;
            let take = (8 - bit_offset).min(n - filled);
            let bits = (byte >> bit_offset) as u16 & ((1u16 << take) - 1);
            value |= bits << filled;
            filled += take;
            self.bit_pos += take as usize;
        }

        Ok(value)
    }
}

/// A bit writer that packs bits least-significant-bit first.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    data: Vec<u8>,
    bit_pos: usize,
}

impl BitWriter {
    /// Create a new, empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `n` bits of `value` (at most 16).
    pub fn write_bits(&mut self, value: u16, n: u8) -> Result<()> {
        if n > 16 {
            return Err(Error::invalid_param(format!(
                "Cannot write {n} bits at once (max 16)"
            )));
        }
        for i in 0..n {
            if self.bit_pos % 8 == 0 {
                self.data.push(0);
            }
            let bit = ((value >> i) & 1) as u8;
            if let Some(last) = self.data.last_mut() {
                *last |= bit << (self.bit_pos % 8);
            }
            self.bit_pos += 1;
        }
        Ok(())
    }

    /// Number of bits written so far.
    pub fn position(&self) -> usize {
        self.bit_pos
    }

    /// Get the written bytes; the final byte is zero-padded.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the writer and return its bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
