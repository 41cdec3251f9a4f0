use super::bit_codec::BitReader;
use super::tans_codec::{check_state, TansTable};
use crate::compressors::lzfse::{D_STATES, D_SYMBOLS, L_STATES, L_SYMBOLS, M_STATES, M_SYMBOLS};
use crate::error::{Error, Result};

pub static L_EXTRA_BITS: [u8; L_SYMBOLS] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 3, 5, 8,
];

pub static L_BASE_VALUE: [u32; L_SYMBOLS] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 20, 28, 60,
];

pub static M_EXTRA_BITS: [u8; M_SYMBOLS] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 5, 8, 11,
];

pub static M_BASE_VALUE: [u32; M_SYMBOLS] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 24, 56, 312,
];

pub static D_EXTRA_BITS: [u8; D_SYMBOLS] = [
    0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, //
    4, 4, 4, 4, 5, 5, 5, 5, 6, 6, 6, 6, 7, 7, 7, 7, //
    8, 8, 8, 8, 9, 9, 9, 9, 10, 10, 10, 10, 11, 11, 11, 11, //
    12, 12, 12, 12, 13, 13, 13, 13, 14, 14, 14, 14, 15, 15, 15, 15,
];

pub static D_BASE_VALUE: [u32; D_SYMBOLS] = [
    0, 1, 2, 3, 4, 6, 8, 10, //
    12, 16, 20, 24, 28, 36, 44, 52, //
    60, 76, 92, 108, 124, 156, 188, 220, //
    252, 316, 380, 444, 508, 636, 764, 892, //
    1020, 1276, 1532, 1788, 2044, 2556, 3068, 3580, //
    4092, 5116, 6140, 7164, 8188, 10236, 12284, 14332, //
    16380, 20476, 24572, 28668, 32764, 40956, 49148, 57340, //
    65532, 81916, 98300, 114684, 131068, 163836, 196604, 229372,
];

/// Decodes one of the L, M or D values: a tANS symbol picks a base value, and
/// the symbol's extra bits are read straight from the stream and added to it.
#[derive(Debug, Clone)]
pub struct ValueDecoder<const N: usize> {
    table: TansTable<N>,
    state: u16,
    extra_bits: &'static [u8],
    base_value: &'static [u32],
}

pub type LValueDecoder = ValueDecoder<L_STATES>;
pub type MValueDecoder = ValueDecoder<M_STATES>;
pub type DValueDecoder = ValueDecoder<D_STATES>;

impl<const N: usize> ValueDecoder<N> {
    pub fn new(extra_bits: &'static [u8], base_value: &'static [u32]) -> Self {
        Self {
            table: TansTable::new(),
            state: 0,
            extra_bits,
            base_value,
        }
    }

    /// Rebuild the table for a new block and set its starting state.
    pub fn init(&mut self, weights: &[u16], state: u16) -> Result<()> {
        if weights.len() > self.base_value.len() {
            return Err(Error::Format("too many value symbols"));
        }
        self.table.init(weights)?;
        self.state = check_state::<N>(state)?;
        Ok(())
    }

    #[inline(always)]
    pub fn decode(&mut self, reader: &mut BitReader) -> Result<u32> {
        let entry = self.table.transition(&mut self.state, reader)?;
        let symbol = entry.symbol as usize;
        let extra = reader.read(self.extra_bits[symbol] as u32)?;
        Ok(self.base_value[symbol] + extra)
    }
}

pub fn l_decoder() -> LValueDecoder {
    ValueDecoder::new(&L_EXTRA_BITS, &L_BASE_VALUE)
}

pub fn m_decoder() -> MValueDecoder {
    ValueDecoder::new(&M_EXTRA_BITS, &M_BASE_VALUE)
}

pub fn d_decoder() -> DValueDecoder {
    ValueDecoder::new(&D_EXTRA_BITS, &D_BASE_VALUE)
}
