//! # Raw blocks
//!
//! An uncompressed block is a single triple: every payload byte is a literal and
//! there's no match. The bytes still go through the match buffer, since later blocks
//! may refer back into them.

use std::io::Read;

use super::header_codec::RawBlockHeader;
use super::lmd_codec::{Lmd, LmdBlockDecoder, LmdSource};
use crate::error::{Error, Result};
use crate::utils::scratch_buffer::ScratchBuffer;

#[derive(Debug, Default)]
pub struct RawBlockSource {
    payload: ScratchBuffer,
    pos: usize,
    emitted: bool,
}

pub type RawBlockDecoder = LmdBlockDecoder<RawBlockSource>;

impl RawBlockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, header: &RawBlockHeader, reader: impl Read) -> Result<()> {
        self.payload
            .load(reader, 0, header.n_raw_bytes as usize)?;
        self.pos = 0;
        self.emitted = false;
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        let bytes = self
            .payload
            .data()
            .get(self.pos..self.pos + n)
            .ok_or(Error::Format("raw block overrun"))?;
        self.pos += n;
        Ok(bytes)
    }
}

impl LmdSource for RawBlockSource {
    fn next_triple(&mut self, lmd: &mut Lmd) -> Result<bool> {
        if self.emitted {
            return Ok(false);
        }
        self.emitted = true;
        lmd.l = self.payload.data().len() as u32;
        lmd.m = 0;
        Ok(lmd.l > 0)
    }

    #[inline(always)]
    fn next_literal_byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn next_literal_run(&mut self, out: &mut [u8]) -> Result<()> {
        out.copy_from_slice(self.take(out.len())?);
        Ok(())
    }
}

impl RawBlockDecoder {
    /// Start a new block. The distance of an earlier block doesn't carry over.
    pub fn init(&mut self, header: &RawBlockHeader, reader: impl Read) -> Result<()> {
        self.reset();
        self.source_mut().init(header, reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compressors::lzfse::codecs::lmd_codec::match_buffer::MatchBuffer;
    use std::io::Cursor;

    #[test]
    fn test_copies_and_records() {
        let mut mb = MatchBuffer::new(16).unwrap();
        let mut decoder = RawBlockDecoder::new(RawBlockSource::new());
        let mut source = Cursor::new(b"hello, trailing".to_vec());
        let header = RawBlockHeader { n_raw_bytes: 5 };
        decoder.init(&header, &mut source).unwrap();
        assert_eq!(source.position(), 5);

        let mut buf = [0u8; 3];
        assert_eq!(decoder.read(&mut mb, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(decoder.read_byte(&mut mb).unwrap(), Some(b'l'));
        assert_eq!(decoder.read(&mut mb, &mut buf).unwrap(), 1);
        assert_eq!(buf[0], b'o');
        assert_eq!(decoder.read(&mut mb, &mut buf).unwrap(), 0);
        assert_eq!(decoder.read_byte(&mut mb).unwrap(), None);

        let mut out = [0u8; 5];
        mb.match_into(5, &mut out);
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn test_empty_block() {
        let mut mb = MatchBuffer::new(16).unwrap();
        let mut decoder = RawBlockDecoder::new(RawBlockSource::new());
        let header = RawBlockHeader { n_raw_bytes: 0 };
        decoder.init(&header, Cursor::new(b"xyz".to_vec())).unwrap();
        assert_eq!(decoder.read_byte(&mut mb).unwrap(), None);
        assert_eq!(mb.written(), 0);
    }

    #[test]
    fn test_short_source() {
        let mut decoder = RawBlockDecoder::new(RawBlockSource::new());
        let header = RawBlockHeader { n_raw_bytes: 8 };
        let err = decoder
            .init(&header, Cursor::new(b"abc".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::Truncated));
    }
}
