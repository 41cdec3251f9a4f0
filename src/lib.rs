//! A streaming decoder for Apple's LZFSE compression format, covering LZFSE (V1 and V2),
//! LZVN and uncompressed blocks.

pub mod compressors;
pub mod error;
pub mod utils;

pub use compressors::lzfse::{decompress, Availability, LzfseDecoderConfig, LzfseReader};
pub use error::{Error, Result};
