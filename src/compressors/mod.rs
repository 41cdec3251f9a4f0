pub mod lzfse;
