pub mod codecs;
pub mod config;
pub mod lzfse_stream;

pub use config::LzfseDecoderConfig;
pub use lzfse_stream::{decompress, Availability, LzfseReader};

/// Block magic numbers, read as little endian `u32`s.
pub const MAGIC_LZFSE_V1: u32 = 0x31787662; // bvx1
pub const MAGIC_LZFSE_V2: u32 = 0x32787662; // bvx2
pub const MAGIC_LZVN: u32 = 0x6e787662; // bvxn
pub const MAGIC_RAW: u32 = 0x2d787662; // bvx-
pub const MAGIC_EOS: u32 = 0x24787662; // bvx$

pub const L_SYMBOLS: usize = 20;
pub const M_SYMBOLS: usize = 20;
pub const D_SYMBOLS: usize = 64;
pub const LITERAL_SYMBOLS: usize = 256;

pub const L_STATES: usize = 64;
pub const M_STATES: usize = 64;
pub const D_STATES: usize = 256;
pub const LITERAL_STATES: usize = 1024;

pub const MATCHES_PER_BLOCK: usize = 10000;
pub const LITERALS_PER_BLOCK: usize = 4 * MATCHES_PER_BLOCK;

pub const MAX_L_VALUE: u32 = 315;
pub const MAX_M_VALUE: u32 = 2359;
pub const MAX_D_VALUE: u32 = 262139;

/// The default match buffer size, enough for any LZFSE distance.
pub const MATCH_BUFFER_SIZE: usize = 1 << 18;

/// Zeroed bytes in front of the literal and LMD payloads.
pub(crate) const LITERAL_PADDING: usize = 8;
pub(crate) const LMD_PADDING: usize = 32;
