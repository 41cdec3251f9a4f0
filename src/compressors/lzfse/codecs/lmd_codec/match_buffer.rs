use crate::compressors::lzfse::MATCH_BUFFER_SIZE;
use crate::error::{Error, Result};

/// A power of two sized ring of the most recent output bytes, used to resolve
/// back references.
///
/// Every produced byte is written through the ring, whether it came from a literal,
/// a match or a raw block.
#[derive(Debug, Clone)]
pub struct MatchBuffer {
    buf: Vec<u8>,
    mask: usize,

    /// The write cursor, always `< buf.len()`.
    pos: usize,

    /// Total bytes written over the buffer's lifetime.
    written: u64,
}

impl MatchBuffer {
    pub fn new(size: usize) -> Result<Self> {
        if !size.is_power_of_two() {
            return Err(Error::Usage("match buffer size must be a power of two"));
        }
        Ok(Self::alloc(size))
    }

    fn alloc(size: usize) -> Self {
        Self {
            buf: vec![0; size],
            mask: size - 1,
            pos: 0,
            written: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.buf.len()
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Check that a match distance will point at bytes that are in the ring, once
    /// `pending` more bytes have been written ahead of the match.
    pub fn check_distance(&self, d: u32, pending: u32) -> Result<()> {
        if d == 0 || d as usize > self.buf.len() || d as u64 > self.written + pending as u64 {
            return Err(Error::Format("match distance out of range"));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn write_byte(&mut self, b: u8) {
        self.buf[self.pos] = b;
        self.pos = (self.pos + 1) & self.mask;
        self.written += 1;
    }

    pub fn write(&mut self, bytes: &[u8]) {
        self.written += bytes.len() as u64;

        // Only the tail can survive in the ring
        let bytes = &bytes[bytes.len().saturating_sub(self.buf.len())..];

        let first = bytes.len().min(self.buf.len() - self.pos);
        let (head, tail) = bytes.split_at(first);
        self.buf[self.pos..self.pos + first].copy_from_slice(head);
        self.buf[..tail.len()].copy_from_slice(tail);
        self.pos = (self.pos + bytes.len()) & self.mask;
    }

    /// Copy the byte `d` positions back to the cursor, and return it.
    #[inline(always)]
    pub fn match_byte(&mut self, d: u32) -> u8 {
        let b = self.buf[self.pos.wrapping_sub(d as usize) & self.mask];
        self.write_byte(b);
        b
    }

    /// Copy `out.len()` bytes starting `d` positions back to the cursor, and into `out`.
    ///
    /// When `out` is longer than `d` the source overlaps the bytes being written,
    /// which repeats the last `d` bytes.
    pub fn match_into(&mut self, d: u32, out: &mut [u8]) {
        let size = self.buf.len();
        let d = d as usize;
        let mut done = 0;

        while done < out.len() {
            let src = self.pos.wrapping_sub(d) & self.mask;

            // A chunk no longer than `d` only reads bytes that were in the ring
            // before the chunk, and never crosses either end of the buffer.
            let n = (out.len() - done)
                .min(d)
                .min(size - src)
                .min(size - self.pos);

            self.buf.copy_within(src..src + n, self.pos);
            out[done..done + n].copy_from_slice(&self.buf[self.pos..self.pos + n]);

            self.pos = (self.pos + n) & self.mask;
            done += n;
        }

        self.written += out.len() as u64;
    }
}

impl Default for MatchBuffer {
    fn default() -> Self {
        Self::alloc(MATCH_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched_bytewise(mb: &mut MatchBuffer, d: u32, len: usize) -> Vec<u8> {
        (0..len).map(|_| mb.match_byte(d)).collect()
    }

    #[test]
    fn test_size_must_be_power_of_two() {
        assert!(matches!(MatchBuffer::new(0), Err(Error::Usage(_))));
        assert!(matches!(MatchBuffer::new(24), Err(Error::Usage(_))));
        assert!(MatchBuffer::new(1).is_ok());
        assert_eq!(MatchBuffer::new(64).unwrap().size(), 64);
        assert_eq!(MatchBuffer::default().size(), MATCH_BUFFER_SIZE);
    }

    #[test]
    fn test_overlapping_match_repeats() {
        let mut mb = MatchBuffer::new(64).unwrap();
        mb.write(b"abc");
        let mut out = [0u8; 10];
        mb.match_into(3, &mut out);
        assert_eq!(&out, b"abcabcabca");

        let mut out = [0u8; 5];
        mb.match_into(1, &mut out);
        assert_eq!(&out, b"aaaaa");
        assert_eq!(mb.written(), 18);
    }

    #[test]
    fn test_match_byte_agrees_with_match_into() {
        let mut a = MatchBuffer::new(16).unwrap();
        let mut b = MatchBuffer::new(16).unwrap();
        for mb in [&mut a, &mut b] {
            mb.write(b"0123456789abc");
        }

        for &(d, len) in &[(5u32, 12usize), (16, 16), (15, 40), (1, 3), (7, 7)] {
            let mut out = vec![0u8; len];
            a.match_into(d, &mut out);
            assert_eq!(out, matched_bytewise(&mut b, d, len), "d = {}, len = {}", d, len);
        }
    }

    #[test]
    fn test_write_wraps() {
        let mut mb = MatchBuffer::new(8).unwrap();
        mb.write(b"012345");
        mb.write(b"6789");
        let mut out = [0u8; 8];
        mb.match_into(8, &mut out);
        assert_eq!(&out, b"23456789");
    }

    #[test]
    fn test_long_write_keeps_tail() {
        let mut mb = MatchBuffer::new(4).unwrap();
        mb.write_byte(b'x');
        mb.write(b"abcdefghij");
        assert_eq!(mb.written(), 11);
        let mut out = [0u8; 4];
        mb.match_into(4, &mut out);
        assert_eq!(&out, b"ghij");
    }

    #[test]
    fn test_check_distance() {
        let mut mb = MatchBuffer::new(8).unwrap();
        assert!(mb.check_distance(1, 0).is_err());
        assert!(mb.check_distance(1, 1).is_ok());
        mb.write(b"abc");
        assert!(mb.check_distance(0, 0).is_err());
        assert!(mb.check_distance(3, 0).is_ok());
        assert!(mb.check_distance(4, 0).is_err());
        assert!(mb.check_distance(5, 2).is_ok());
        mb.write(b"defghijk");
        assert!(mb.check_distance(8, 0).is_ok());
        assert!(mb.check_distance(9, 0).is_err());
    }
}
