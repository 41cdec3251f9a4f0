//! # LZVN blocks
//!
//! An LZVN payload is a byte oriented sequence of opcodes, each optionally followed
//! by distance or length bytes and then by its literal bytes. The opcode byte alone
//! picks the instruction class:
//!
//! | Bits       | Class    | Fields                                   |
//! |------------|----------|------------------------------------------|
//! | `LLMMMDDD` | smlD     | 1 byte, D = `DDD` << 8 \| byte           |
//! | `101LLMMM` | medD     | u16 `s`, M low bits = `s & 3`, D = s >> 2 |
//! | `LLMMM111` | lrgD     | u16 D                                    |
//! | `LLMMM110` | preD     | previous D                               |
//! | `1110LLLL` | smlL     | L only                                   |
//! | `11100000` | lrgL     | 1 byte, L = byte + 16                    |
//! | `1111MMMM` | smlM     | M only, previous D                       |
//! | `11110000` | lrgM     | 1 byte, M = byte + 16                    |
//!
//! Match lengths in the distance classes are `MMM + 3`. Opcode 6 ends the block.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use super::header_codec::LzvnBlockHeader;
use super::lmd_codec::{Lmd, LmdBlockDecoder, LmdSource};
use crate::error::{Error, Result};
use crate::utils::scratch_buffer::ScratchBuffer;

const OPCODE_EOS: u8 = 0x06;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    SmallDistance,
    MediumDistance,
    LargeDistance,
    PreviousDistance,
    SmallLiteral,
    LargeLiteral,
    SmallMatch,
    LargeMatch,
    Nop,
    EndOfStream,
    Undefined,
}

const fn classify(opc: u8) -> Opcode {
    match opc {
        0xA0..=0xBF => Opcode::MediumDistance,
        0xE0 => Opcode::LargeLiteral,
        0xE1..=0xEF => Opcode::SmallLiteral,
        0xF0 => Opcode::LargeMatch,
        0xF1..=0xFF => Opcode::SmallMatch,
        0x70..=0x7F | 0xD0..=0xDF => Opcode::Undefined,
        _ => match opc & 7 {
            7 => Opcode::LargeDistance,
            6 => match opc {
                OPCODE_EOS => Opcode::EndOfStream,
                0x0E | 0x16 => Opcode::Nop,
                0x00..=0x3F => Opcode::Undefined,
                _ => Opcode::PreviousDistance,
            },
            _ => Opcode::SmallDistance,
        },
    }
}

const fn opcode_table() -> [Opcode; 256] {
    let mut table = [Opcode::Undefined; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = classify(i as u8);
        i += 1;
    }
    table
}

pub static OPCODES: [Opcode; 256] = opcode_table();

#[derive(Debug, Default)]
pub struct LzvnBlockSource {
    payload: ScratchBuffer,
    pos: usize,
    eos: bool,
}

pub type LzvnBlockDecoder = LmdBlockDecoder<LzvnBlockSource>;

impl LzvnBlockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, header: &LzvnBlockHeader, reader: impl Read) -> Result<()> {
        self.payload
            .load(reader, 0, header.n_payload_bytes as usize)?;
        self.pos = 0;
        self.eos = false;
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        let data = self.payload.data();
        let bytes = data
            .get(self.pos..self.pos + n)
            .ok_or(Error::Format("lzvn payload overrun"))?;
        self.pos += n;
        Ok(bytes)
    }

    #[inline(always)]
    fn byte(&mut self) -> Result<u32> {
        Ok(self.take(1)?[0] as u32)
    }

    #[inline(always)]
    fn word(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u16(self.take(2)?) as u32)
    }
}

impl LmdSource for LzvnBlockSource {
    fn next_triple(&mut self, lmd: &mut Lmd) -> Result<bool> {
        while !self.eos {
            let opc = self.byte()?;
            let opcode = OPCODES[opc as usize];

            match opcode {
                Opcode::SmallDistance => {
                    lmd.l = opc >> 6;
                    lmd.m = ((opc >> 3) & 7) + 3;
                    let d = ((opc & 7) << 8) | self.byte()?;
                    lmd.set_distance(d);
                }
                Opcode::MediumDistance => {
                    let s = self.word()?;
                    lmd.l = (opc >> 3) & 3;
                    lmd.m = (((opc & 7) << 2) | (s & 3)) + 3;
                    lmd.set_distance(s >> 2);
                }
                Opcode::LargeDistance => {
                    lmd.l = opc >> 6;
                    lmd.m = ((opc >> 3) & 7) + 3;
                    let d = self.word()?;
                    lmd.set_distance(d);
                }
                Opcode::PreviousDistance => {
                    lmd.l = opc >> 6;
                    lmd.m = ((opc >> 3) & 7) + 3;
                }
                Opcode::SmallLiteral => {
                    lmd.l = opc & 0xF;
                    lmd.m = 0;
                }
                Opcode::LargeLiteral => {
                    lmd.l = self.byte()? + 16;
                    lmd.m = 0;
                }
                Opcode::SmallMatch => {
                    lmd.l = 0;
                    lmd.m = opc & 0xF;
                }
                Opcode::LargeMatch => {
                    lmd.l = 0;
                    lmd.m = self.byte()? + 16;
                }
                Opcode::Nop => continue,
                Opcode::EndOfStream => {}
                Opcode::Undefined => return Err(Error::Format("undefined lzvn opcode")),
            }

            if opc == OPCODE_EOS as u32 {
                trace!(pos = self.pos, "lzvn end of block");
                self.eos = true;
                break;
            }
            return Ok(true);
        }

        Ok(false)
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

impl LzvnBlockDecoder {
    /// Start a new block. Pending lengths and the distance don't carry over.
    pub fn init(&mut self, header: &LzvnBlockHeader, reader: impl Read) -> Result<()> {
        self.reset();
        self.source_mut().init(header, reader)
    }
}
