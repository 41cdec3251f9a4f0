//! Block header parsers. Each parser is called after the block's magic has been read.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::compressors::lzfse::{
    D_SYMBOLS, LITERALS_PER_BLOCK, LITERAL_SYMBOLS, L_SYMBOLS, M_SYMBOLS,
};
use crate::error::{Error, Result};
use crate::utils::scratch_buffer::ScratchBuffer;

/// Size of a V1 header after the magic: 7 + 1 `i32`s, 4 + 3 `u16` states,
/// 360 `u16` weights and 2 bytes of trailing padding.
pub const V1_HEADER_SIZE: usize = 768;

/// Size of the fixed part of a V2 header after the magic.
pub const V2_HEADER_SIZE: usize = 28;

/// Compressed V2 frequency tables must fit the same scratch space as a V1 header.
pub const V2_TABLES_MAX_SIZE: usize = V1_HEADER_SIZE;

const FREQ_NBITS_TABLE: [u8; 32] = [
    2, 3, 2, 5, 2, 3, 2, 8, 2, 3, 2, 5, 2, 3, 2, 14, //
    2, 3, 2, 5, 2, 3, 2, 8, 2, 3, 2, 5, 2, 3, 2, 14,
];

// Entries for the 8 and 14 bit escapes are never used.
const FREQ_VALUE_TABLE: [u16; 32] = [
    0, 2, 1, 4, 0, 3, 1, 0, 0, 2, 1, 5, 0, 3, 1, 0, //
    0, 2, 1, 6, 0, 3, 1, 0, 0, 2, 1, 7, 0, 3, 1, 0,
];

fn non_negative(value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Format("negative header field"))
}

/// Extract `width` bits of `word` starting at bit `offset`.
#[inline(always)]
fn field(word: u64, offset: u32, width: u32) -> u32 {
    ((word >> offset) & ((1u64 << width) - 1)) as u32
}

/// The header of an entropy coded block. One instance is reused for every
/// V1 and V2 block in a stream.
#[derive(Debug, Clone)]
pub struct LzfseBlockHeader {
    pub n_raw_bytes: u32,
    pub n_payload_bytes: u32,
    pub n_literals: u32,
    pub n_matches: u32,
    pub n_literal_payload_bytes: u32,
    pub n_lmd_payload_bytes: u32,

    pub literal_bits: i32,
    pub literal_state: [u16; 4],

    pub lmd_bits: i32,
    pub l_state: u16,
    pub m_state: u16,
    pub d_state: u16,

    pub l_freq: [u16; L_SYMBOLS],
    pub m_freq: [u16; M_SYMBOLS],
    pub d_freq: [u16; D_SYMBOLS],
    pub literal_freq: [u16; LITERAL_SYMBOLS],
}

impl LzfseBlockHeader {
    pub fn new() -> Self {
        Self {
            n_raw_bytes: 0,
            n_payload_bytes: 0,
            n_literals: 0,
            n_matches: 0,
            n_literal_payload_bytes: 0,
            n_lmd_payload_bytes: 0,
            literal_bits: 0,
            literal_state: [0; 4],
            lmd_bits: 0,
            l_state: 0,
            m_state: 0,
            d_state: 0,
            l_freq: [0; L_SYMBOLS],
            m_freq: [0; M_SYMBOLS],
            d_freq: [0; D_SYMBOLS],
            literal_freq: [0; LITERAL_SYMBOLS],
        }
    }

    /// Parse an uncompressed-tables header. `scratch` holds the raw header bytes.
    pub fn load_v1(&mut self, reader: impl Read, scratch: &mut ScratchBuffer) -> Result<()> {
        scratch.load(reader, 0, V1_HEADER_SIZE)?;
        let mut header = Cursor::new(scratch.data());

        self.n_raw_bytes = non_negative(header.read_i32::<LittleEndian>()?)?;
        self.n_payload_bytes = non_negative(header.read_i32::<LittleEndian>()?)?;
        self.n_literals = non_negative(header.read_i32::<LittleEndian>()?)?;
        self.n_matches = non_negative(header.read_i32::<LittleEndian>()?)?;
        self.n_literal_payload_bytes = non_negative(header.read_i32::<LittleEndian>()?)?;
        self.n_lmd_payload_bytes = non_negative(header.read_i32::<LittleEndian>()?)?;

        self.literal_bits = header.read_i32::<LittleEndian>()?;
        header.read_u16_into::<LittleEndian>(&mut self.literal_state)?;

        self.lmd_bits = header.read_i32::<LittleEndian>()?;
        self.l_state = header.read_u16::<LittleEndian>()?;
        self.m_state = header.read_u16::<LittleEndian>()?;
        self.d_state = header.read_u16::<LittleEndian>()?;

        header.read_u16_into::<LittleEndian>(&mut self.l_freq)?;
        header.read_u16_into::<LittleEndian>(&mut self.m_freq)?;
        header.read_u16_into::<LittleEndian>(&mut self.d_freq)?;
        header.read_u16_into::<LittleEndian>(&mut self.literal_freq)?;

        self.validate("v1")
    }

    /// Parse a compressed-tables header. `scratch` receives the packed frequency tables.
    pub fn load_v2(&mut self, mut reader: impl Read, scratch: &mut ScratchBuffer) -> Result<()> {
        self.n_raw_bytes = non_negative(reader.read_i32::<LittleEndian>()?)?;
        let v0 = reader.read_u64::<LittleEndian>()?;
        let v1 = reader.read_u64::<LittleEndian>()?;
        let v2 = reader.read_u64::<LittleEndian>()?;

        self.n_literals = field(v0, 0, 20);
        self.n_literal_payload_bytes = field(v0, 20, 20);
        self.n_matches = field(v0, 40, 20);
        self.literal_bits = field(v0, 60, 3) as i32 - 7;

        for (lane, state) in self.literal_state.iter_mut().enumerate() {
            *state = field(v1, lane as u32 * 10, 10) as u16;
        }
        self.n_lmd_payload_bytes = field(v1, 40, 20);
        self.lmd_bits = field(v1, 60, 3) as i32 - 7;

        let header_size = field(v2, 0, 32) as usize;
        self.l_state = field(v2, 32, 10) as u16;
        self.m_state = field(v2, 42, 10) as u16;
        self.d_state = field(v2, 52, 10) as u16;

        self.n_payload_bytes = self.n_literal_payload_bytes + self.n_lmd_payload_bytes;

        // The header size counts the magic as well
        let n_tables = header_size
            .checked_sub(V2_HEADER_SIZE + 4)
            .ok_or(Error::Format("v2 header size too small"))?;

        if n_tables == 0 {
            self.l_freq.fill(0);
            self.m_freq.fill(0);
            self.d_freq.fill(0);
            self.literal_freq.fill(0);
        } else if n_tables > V2_TABLES_MAX_SIZE {
            return Err(Error::Format("v2 frequency tables too large"));
        } else {
            scratch.load(reader, 0, n_tables)?;
            decode_v2_tables(
                scratch.data(),
                [
                    &mut self.l_freq[..],
                    &mut self.m_freq[..],
                    &mut self.d_freq[..],
                    &mut self.literal_freq[..],
                ],
            )?;
        }

        self.validate("v2")
    }

    fn validate(&self, version: &'static str) -> Result<()> {
        if self.n_literals as usize > LITERALS_PER_BLOCK {
            return Err(Error::Format("too many literals in block"));
        }

        debug!(
            version,
            n_raw_bytes = self.n_raw_bytes,
            n_literals = self.n_literals,
            n_matches = self.n_matches,
            n_literal_payload_bytes = self.n_literal_payload_bytes,
            n_lmd_payload_bytes = self.n_lmd_payload_bytes,
            "lzfse block header"
        );
        Ok(())
    }
}

impl Default for LzfseBlockHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode the variable length weight codes of a V2 header into `tables`, in order.
///
/// Codes are read from the low bits of a little endian bit stream. The low 5 bits of
/// the accumulator select the code width, widths 8 and 14 carry a literal value.
fn decode_v2_tables(data: &[u8], tables: [&mut [u16]; 4]) -> Result<()> {
    let mut bytes = data.iter();
    let mut cache: u32 = 0;
    let mut cache_size: u32 = 0;

    for table in tables {
        for weight in table.iter_mut() {
            while cache_size + 8 <= 32 {
                match bytes.next() {
                    Some(&b) => {
                        cache |= (b as u32) << cache_size;
                        cache_size += 8;
                    }
                    None => break,
                }
            }

            let code = (cache & 0x1F) as usize;
            let n_bits = FREQ_NBITS_TABLE[code] as u32;
            if n_bits > cache_size {
                return Err(Error::Format("v2 frequency tables truncated"));
            }

            *weight = match n_bits {
                8 => 8 + ((cache >> 4) & 0xF) as u16,
                14 => 24 + ((cache >> 4) & 0x3FF) as u16,
                _ => FREQ_VALUE_TABLE[code],
            };

            cache >>= n_bits;
            cache_size -= n_bits;
        }
    }

    if cache_size >= 8 || bytes.next().is_some() {
        return Err(Error::Format("trailing data after v2 frequency tables"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzvnBlockHeader {
    pub n_raw_bytes: u32,
    pub n_payload_bytes: u32,
}

pub fn parse_lzvn_header(mut reader: impl Read) -> Result<LzvnBlockHeader> {
    let n_raw_bytes = non_negative(reader.read_i32::<LittleEndian>()?)?;
    let n_payload_bytes = non_negative(reader.read_i32::<LittleEndian>()?)?;

    debug!(n_raw_bytes, n_payload_bytes, "lzvn block header");
    Ok(LzvnBlockHeader {
        n_raw_bytes,
        n_payload_bytes,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlockHeader {
    pub n_raw_bytes: u32,
}

pub fn parse_raw_header(mut reader: impl Read) -> Result<RawBlockHeader> {
    let n_raw_bytes = non_negative(reader.read_i32::<LittleEndian>()?)?;

    debug!(n_raw_bytes, "raw block header");
    Ok(RawBlockHeader { n_raw_bytes })
}
