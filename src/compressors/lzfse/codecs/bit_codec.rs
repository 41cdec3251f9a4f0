//! # Backward bit reader
//!
//! LZFSE entropy coded payloads are written back to front: the encoder emits the
//! last symbol first, so the decoder starts at the end of the payload and walks
//! towards its start. Within that order, each byte is consumed from its most
//! significant bit down.
//!
//! The reader keeps up to 63 bits in a `u64` cache. The valid bits are always the
//! low `count` bits of the cache, and reads take from the top of that range.
//! [`BitReader::fill`] tops the cache back up to at least 56 bits, which is enough
//! for one full LMD triple or four literals.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use crate::error::{Error, Result};
use crate::utils::scratch_buffer::ScratchBuffer;

#[derive(Debug, Default)]
pub struct BitReader {
    buf: ScratchBuffer,
    pos: usize,
    cache: u64,
    count: u32,
}

impl BitReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a payload of `len` bytes from `reader`, with `padding` zeroes in front of it,
    /// and position the reader at its end.
    pub fn load(&mut self, reader: impl Read, padding: usize, len: usize, bits: i32) -> Result<()> {
        self.buf.load(reader, padding, len)?;
        self.init(bits)
    }

    /// Position the reader at the end of the loaded buffer.
    ///
    /// `bits` is 0 for a byte aligned end, or `-7..=-1` to drop that many dummy bits
    /// from the top of the last byte.
    pub fn init(&mut self, bits: i32) -> Result<()> {
        let buf = self.buf.as_slice();
        let end = buf.len();
        if end < 8 {
            return Err(Error::Format("bit stream buffer too small"));
        }

        let last_word = LittleEndian::read_u64(&buf[end - 8..]);
        match bits {
            0 => {
                self.pos = end - 7;
                self.cache = last_word >> 8;
                self.count = 56;
            }
            -7..=-1 => {
                self.pos = end - 8;
                self.cache = last_word;
                self.count = (64 + bits) as u32;
            }
            _ => return Err(Error::Format("bit stream offset out of range")),
        }

        trace!(len = end, bits, "bit stream initialised");
        Ok(())
    }

    /// Refill the cache so that at least 56 bits are available.
    #[inline(always)]
    pub fn fill(&mut self) -> Result<()> {
        if self.count < 56 {
            let n_bytes = ((63 - self.count) >> 3) as usize;
            if n_bytes > self.pos {
                return Err(Error::Format("bit stream underflow"));
            }
            self.pos -= n_bytes;
            self.cache = LittleEndian::read_u64(&self.buf.as_slice()[self.pos..]);
            self.count += (n_bytes as u32) << 3;
        }
        Ok(())
    }

    /// Take the next `n` bits, `n <= 32`.
    #[inline(always)]
    pub fn read(&mut self, n: u32) -> Result<u32> {
        debug_assert!(n <= 32);
        if n > self.count {
            return Err(Error::Truncated);
        }
        self.count -= n;
        Ok(((self.cache >> self.count) & ((1u64 << n) - 1)) as u32)
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}
