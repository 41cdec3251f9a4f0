//! # LZFSE streams
//!
//! A stream is a sequence of blocks, each introduced by a 4 byte magic, and closed by
//! an end of stream magic. Blocks of different kinds can be mixed freely and share a
//! single match buffer, so a block may refer back into the output of any earlier one.
//!
//! [`LzfseReader`] pulls from its source only as far as it needs to, one block at a
//! time. Once the end of stream magic has been read the source is never touched again,
//! so any data following the stream stays in the source.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use super::codecs::header_codec::{
    parse_lzvn_header, parse_raw_header, LzfseBlockHeader, V1_HEADER_SIZE,
};
use super::codecs::lmd_codec::match_buffer::MatchBuffer;
use super::codecs::lzfse_block_codec::{LzfseBlockDecoder, LzfseBlockSource};
use super::codecs::lzvn_block_codec::{LzvnBlockDecoder, LzvnBlockSource};
use super::codecs::raw_block_codec::{RawBlockDecoder, RawBlockSource};
use super::config::LzfseDecoderConfig;
use super::{MAGIC_EOS, MAGIC_LZFSE_V1, MAGIC_LZFSE_V2, MAGIC_LZVN, MAGIC_RAW};
use crate::error::{Error, Result};
use crate::utils::scratch_buffer::ScratchBuffer;

const DECODE_CHUNK_SIZE: usize = 1 << 16;

/// Whether a reader may still produce bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Pending,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveBlock {
    Lzfse,
    Lzvn,
    Raw,
}

/// Decompresses an LZFSE stream from `R`.
///
/// Any error is terminal: the reader is poisoned and every later read fails with
/// [`Error::Poisoned`]. Bytes returned before the error are valid output.
pub struct LzfseReader<R> {
    inner: R,
    mb: MatchBuffer,

    lzfse_header: LzfseBlockHeader,
    header_scratch: ScratchBuffer,

    lzfse_decoder: LzfseBlockDecoder,
    lzvn_decoder: LzvnBlockDecoder,
    raw_decoder: RawBlockDecoder,

    active: Option<ActiveBlock>,
    eos: bool,
    poisoned: bool,
}

impl<R: Read> LzfseReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_match_buffer(inner, MatchBuffer::default())
    }

    pub fn with_config(inner: R, config: LzfseDecoderConfig) -> Result<Self> {
        let mb = MatchBuffer::new(config.match_buffer_size)?;
        Ok(Self::with_match_buffer(inner, mb))
    }

    fn with_match_buffer(inner: R, mb: MatchBuffer) -> Self {
        Self {
            inner,
            mb,
            lzfse_header: LzfseBlockHeader::new(),
            header_scratch: ScratchBuffer::with_capacity(V1_HEADER_SIZE),
            lzfse_decoder: LzfseBlockDecoder::new(LzfseBlockSource::new()),
            lzvn_decoder: LzvnBlockDecoder::new(LzvnBlockSource::new()),
            raw_decoder: RawBlockDecoder::new(RawBlockSource::new()),
            active: None,
            eos: false,
            poisoned: false,
        }
    }

    /// Decode the next byte, or `None` at the end of the stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        self.guard(Self::next_byte)
    }

    /// Decode up to `len` bytes into `buf[off..off + len]`. Returns `None` at the end of
    /// the stream, and `Some(0)` only when `len` is 0.
    pub fn read_at(&mut self, buf: &mut [u8], off: usize, len: usize) -> Result<Option<usize>> {
        let end = off
            .checked_add(len)
            .filter(|&end| end <= buf.len())
            .ok_or(Error::Usage("read range outside the buffer"))?;
        if len == 0 {
            return Ok(Some(0));
        }

        let n = self.guard(|reader| reader.next_bytes(&mut buf[off..end]))?;
        Ok(if n == 0 { None } else { Some(n) })
    }

    pub fn available(&self) -> Availability {
        if self.eos {
            Availability::Exhausted
        } else {
            Availability::Pending
        }
    }

    /// Decode the rest of the stream into `sink`, returning the number of bytes written.
    pub fn decode_to(&mut self, mut sink: impl Write) -> Result<u64> {
        let mut buf = vec![0u8; DECODE_CHUNK_SIZE];
        let mut total = 0;
        loop {
            let n = self.guard(|reader| reader.next_bytes(&mut buf))?;
            if n == 0 {
                return Ok(total);
            }
            sink.write_all(&buf[..n])?;
            total += n as u64;
        }
    }

    /// Total bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.mb.written()
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn guard<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.poisoned {
            return Err(Error::Poisoned);
        }
        let result = f(self);
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    /// Read the next block's magic and header, and make its decoder active.
    fn next_block(&mut self) -> Result<()> {
        let magic = self.inner.read_u32::<LittleEndian>()?;
        self.active = match magic {
            MAGIC_LZFSE_V2 => {
                self.lzfse_header
                    .load_v2(&mut self.inner, &mut self.header_scratch)?;
                self.lzfse_decoder.init(&self.lzfse_header, &mut self.inner)?;
                Some(ActiveBlock::Lzfse)
            }
            MAGIC_LZFSE_V1 => {
                self.lzfse_header
                    .load_v1(&mut self.inner, &mut self.header_scratch)?;
                self.lzfse_decoder.init(&self.lzfse_header, &mut self.inner)?;
                Some(ActiveBlock::Lzfse)
            }
            MAGIC_LZVN => {
                let header = parse_lzvn_header(&mut self.inner)?;
                self.lzvn_decoder.init(&header, &mut self.inner)?;
                Some(ActiveBlock::Lzvn)
            }
            MAGIC_RAW => {
                let header = parse_raw_header(&mut self.inner)?;
                self.raw_decoder.init(&header, &mut self.inner)?;
                Some(ActiveBlock::Raw)
            }
            MAGIC_EOS => {
                debug!(total_out = self.mb.written(), "end of lzfse stream");
                self.eos = true;
                None
            }
            _ => return Err(Error::BadMagic(magic)),
        };
        Ok(())
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        while !self.eos {
            let Some(block) = self.active else {
                self.next_block()?;
                continue;
            };

            let b = match block {
                ActiveBlock::Lzfse => self.lzfse_decoder.read_byte(&mut self.mb)?,
                ActiveBlock::Lzvn => self.lzvn_decoder.read_byte(&mut self.mb)?,
                ActiveBlock::Raw => self.raw_decoder.read_byte(&mut self.mb)?,
            };
            match b {
                Some(b) => return Ok(Some(b)),
                None => self.active = None,
            }
        }
        Ok(None)
    }

    /// Fill as much of `buf` as the active block allows, moving on to later blocks when
    /// it's exhausted. Returns 0 only at the end of the stream, or if `buf` is empty.
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while !self.eos {
            let Some(block) = self.active else {
                self.next_block()?;
                continue;
            };

            let n = match block {
                ActiveBlock::Lzfse => self.lzfse_decoder.read(&mut self.mb, buf)?,
                ActiveBlock::Lzvn => self.lzvn_decoder.read(&mut self.mb, buf)?,
                ActiveBlock::Raw => self.raw_decoder.read(&mut self.mb, buf)?,
            };
            if n > 0 {
                return Ok(n);
            }
            self.active = None;
        }
        Ok(0)
    }
}

impl<R: Read> Read for LzfseReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        Ok(self.guard(|reader| reader.next_bytes(buf))?)
    }
}

/// Decompress a whole in-memory stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    LzfseReader::new(data).decode_to(&mut out)?;
    Ok(out)
}
