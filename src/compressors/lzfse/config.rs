use super::MATCH_BUFFER_SIZE;

/// Settings for an [`LzfseReader`](super::LzfseReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzfseDecoderConfig {
    /// Size of the back reference window, which must be a power of two. Streams whose
    /// distances reach further back than this fail to decode.
    pub match_buffer_size: usize,
}

impl LzfseDecoderConfig {
    pub fn new() -> Self {
        Self {
            match_buffer_size: MATCH_BUFFER_SIZE,
        }
    }

    pub fn with_match_buffer_size(mut self, size: usize) -> Self {
        self.match_buffer_size = size;
        self
    }
}

impl Default for LzfseDecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}
