//! # LZFSE blocks
//!
//! An entropy coded block carries two payloads, back to back: the literal payload,
//! which is decoded up front into a literal buffer, and the LMD payload, which is
//! decoded one triple at a time as output is requested. Both are read backwards by a
//! [`BitReader`].
//!
//! The L, M and D values of each triple are read in that order after a single fill.
//! A D value of 0 repeats the previous distance, and the distance carries over from
//! one LZFSE block to the next.

use std::io::Read;

use super::bit_codec::BitReader;
use super::header_codec::LzfseBlockHeader;
use super::literals_codec::LiteralDecoder;
use super::lmd_codec::{Lmd, LmdBlockDecoder, LmdSource};
use super::value_codec::{
    d_decoder, l_decoder, m_decoder, DValueDecoder, LValueDecoder, MValueDecoder,
};
use crate::compressors::lzfse::{LITERALS_PER_BLOCK, LMD_PADDING};
use crate::error::{Error, Result};

pub struct LzfseBlockSource {
    l_decoder: LValueDecoder,
    m_decoder: MValueDecoder,
    d_decoder: DValueDecoder,
    literal_decoder: LiteralDecoder,
    reader: BitReader,

    literals: Vec<u8>,
    n_literals: usize,
    pos: usize,

    /// Triples left in the block.
    symbols: u32,
}

pub type LzfseBlockDecoder = LmdBlockDecoder<LzfseBlockSource>;

impl LzfseBlockSource {
    pub fn new() -> Self {
        Self {
            l_decoder: l_decoder(),
            m_decoder: m_decoder(),
            d_decoder: d_decoder(),
            literal_decoder: LiteralDecoder::new(),
            reader: BitReader::new(),
            // Room for the last group of four to overrun
            literals: vec![0; LITERALS_PER_BLOCK + 64],
            n_literals: 0,
            pos: 0,
            symbols: 0,
        }
    }

    /// Set up for the block described by `header`, reading both payloads from `reader`.
    pub fn init(&mut self, header: &LzfseBlockHeader, mut reader: impl Read) -> Result<()> {
        self.l_decoder.init(&header.l_freq, header.l_state)?;
        self.m_decoder.init(&header.m_freq, header.m_state)?;
        self.d_decoder.init(&header.d_freq, header.d_state)?;

        self.literal_decoder
            .decode_into(&mut reader, header, &mut self.literals)?;

        self.reader.load(
            &mut reader,
            LMD_PADDING,
            header.n_lmd_payload_bytes as usize,
            header.lmd_bits,
        )?;

        self.n_literals = header.n_literals as usize;
        self.pos = 0;
        self.symbols = header.n_matches;
        Ok(())
    }

    pub fn remaining_matches(&self) -> u32 {
        self.symbols
    }
}

impl Default for LzfseBlockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LmdSource for LzfseBlockSource {
    fn next_triple(&mut self, lmd: &mut Lmd) -> Result<bool> {
        if self.symbols == 0 {
            return Ok(false);
        }
        self.symbols -= 1;

        self.reader.fill()?;
        lmd.l = self.l_decoder.decode(&mut self.reader)?;
        lmd.m = self.m_decoder.decode(&mut self.reader)?;
        let d = self.d_decoder.decode(&mut self.reader)?;
        lmd.set_distance(d);
        Ok(true)
    }

    #[inline(always)]
    fn next_literal_byte(&mut self) -> Result<u8> {
        if self.pos >= self.n_literals {
            return Err(Error::Format("literal run past the block's literals"));
        }
        let b = self.literals[self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn next_literal_run(&mut self, out: &mut [u8]) -> Result<()> {
        let end = self.pos + out.len();
        if end > self.n_literals {
            return Err(Error::Format("literal run past the block's literals"));
        }
        out.copy_from_slice(&self.literals[self.pos..end]);
        self.pos = end;
        Ok(())
    }
}

impl LzfseBlockDecoder {
    pub fn init(&mut self, header: &LzfseBlockHeader, reader: impl Read) -> Result<()> {
        self.source_mut().init(header, reader)
    }
}
