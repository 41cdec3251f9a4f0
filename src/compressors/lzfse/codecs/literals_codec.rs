use std::io::Read;

use super::bit_codec::BitReader;
use super::header_codec::LzfseBlockHeader;
use super::tans_codec::{check_state, TansTable};
use crate::compressors::lzfse::{LITERAL_PADDING, LITERAL_STATES};
use crate::error::Result;

/// Decodes the literals of an LZFSE block. Four interleaved lanes share one table,
/// literal `i` comes from lane `i % 4`.
#[derive(Debug)]
pub struct LiteralDecoder {
    table: TansTable<LITERAL_STATES>,
    reader: BitReader,
}

impl LiteralDecoder {
    pub fn new() -> Self {
        Self {
            table: TansTable::new(),
            reader: BitReader::new(),
        }
    }

    /// Read the literal payload of the block described by `header` from `reader`, and
    /// decode all of its literals into `literals`.
    ///
    /// Literals are produced four at a time, so up to three bytes past
    /// `header.n_literals` are overwritten.
    pub fn decode_into(
        &mut self,
        reader: impl Read,
        header: &LzfseBlockHeader,
        literals: &mut [u8],
    ) -> Result<()> {
        self.table.init(&header.literal_freq)?;

        let mut states = [0u16; 4];
        for (state, &initial) in states.iter_mut().zip(header.literal_state.iter()) {
            *state = check_state::<LITERAL_STATES>(initial)?;
        }

        self.reader.load(
            reader,
            LITERAL_PADDING,
            header.n_literal_payload_bytes as usize,
            header.literal_bits,
        )?;

        let n_groups = (header.n_literals as usize + 3) / 4;
        for group in literals.chunks_exact_mut(4).take(n_groups) {
            // 4 transitions of at most 10 bits each fit in one fill
            self.reader.fill()?;
            for (literal, state) in group.iter_mut().zip(states.iter_mut()) {
                *literal = self.table.transition(state, &mut self.reader)?.symbol;
            }
        }

        Ok(())
    }
}

impl Default for LiteralDecoder {
    fn default() -> Self {
        Self::new()
    }
}
