pub mod bit_codec;
pub mod header_codec;
pub mod literals_codec;
pub mod lmd_codec;
pub mod lzfse_block_codec;
pub mod lzvn_block_codec;
pub mod raw_block_codec;
pub mod tans_codec;
pub mod value_codec;
