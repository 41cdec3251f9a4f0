use std::io::{self, Read};

/// A heap buffer that's reused between blocks. It grows on demand and is never shrunk.
///
/// Every load puts `padding` zeroed bytes in front of the data, so readers that walk
/// backwards from the end of the payload can overrun its start without leaving the
/// allocation.
#[derive(Debug, Default)]
pub struct ScratchBuffer {
    buf: Vec<u8>,
    padding: usize,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            padding: 0,
        }
    }

    /// Replace the contents with exactly `len` bytes from `reader`, after `padding` zeroes.
    ///
    /// The buffer only grows as bytes actually arrive, so a length taken from an untrusted
    /// header can't allocate more than the source holds.
    pub fn load(&mut self, reader: impl Read, padding: usize, len: usize) -> io::Result<()> {
        self.buf.clear();
        self.buf.resize(padding, 0);
        self.padding = padding;

        let n = reader.take(len as u64).read_to_end(&mut self.buf)?;
        if n < len {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        Ok(())
    }

    /// The loaded payload, without the padding.
    pub fn data(&self) -> &[u8] {
        &self.buf[self.padding..]
    }

    /// The whole buffer, padding included.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn padding(&self) -> usize {
        self.padding
    }
}
