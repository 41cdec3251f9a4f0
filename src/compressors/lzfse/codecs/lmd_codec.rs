pub mod match_buffer;

use self::match_buffer::MatchBuffer;
use crate::error::Result;

/// One LZ step: copy `l` literals, then `m` bytes from `d` bytes back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lmd {
    pub l: u32,
    pub m: u32,
    d: u32,
}

impl Lmd {
    pub fn new(l: u32, m: u32, d: u32) -> Self {
        Self { l, m, d }
    }

    pub fn d(&self) -> u32 {
        self.d
    }

    /// A distance of 0 keeps the previous distance.
    #[inline(always)]
    pub fn set_distance(&mut self, d: u32) {
        if d != 0 {
            self.d = d;
        }
    }
}

/// Where the LMD triples and their literal bytes come from.
pub trait LmdSource {
    /// Decode the next triple into `lmd`. Returns `false` once the block has no more.
    ///
    /// Fields that a triple doesn't set keep their values, callers only ask for a new
    /// triple once the previous literals and match have been fully consumed.
    fn next_triple(&mut self, lmd: &mut Lmd) -> Result<bool>;

    fn next_literal_byte(&mut self) -> Result<u8>;

    fn next_literal_run(&mut self, out: &mut [u8]) -> Result<()> {
        for b in out.iter_mut() {
            *b = self.next_literal_byte()?;
        }
        Ok(())
    }
}

/// Expands the triples of an [`LmdSource`] into bytes, through the match buffer.
#[derive(Debug, Clone)]
pub struct LmdBlockDecoder<S> {
    source: S,
    lmd: Lmd,
}

impl<S: LmdSource> LmdBlockDecoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            lmd: Lmd::default(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Forget the pending lengths and the distance.
    pub fn reset(&mut self) {
        self.lmd = Lmd::default();
    }

    fn next_triple(&mut self, mb: &MatchBuffer) -> Result<bool> {
        if !self.source.next_triple(&mut self.lmd)? {
            return Ok(false);
        }
        if self.lmd.m > 0 {
            mb.check_distance(self.lmd.d, self.lmd.l)?;
        }
        Ok(true)
    }

    /// Produce the next byte of the block, or `None` once it's exhausted.
    pub fn read_byte(&mut self, mb: &mut MatchBuffer) -> Result<Option<u8>> {
        loop {
            if self.lmd.l > 0 {
                self.lmd.l -= 1;
                let b = self.source.next_literal_byte()?;
                mb.write_byte(b);
                return Ok(Some(b));
            }

            if self.lmd.m > 0 {
                self.lmd.m -= 1;
                return Ok(Some(mb.match_byte(self.lmd.d)));
            }

            if !self.next_triple(mb)? {
                return Ok(None);
            }
        }
    }

    /// Fill as much of `buf` as the block allows. Returns 0 only once the block is
    /// exhausted, or if `buf` is empty.
    pub fn read(&mut self, mb: &mut MatchBuffer, buf: &mut [u8]) -> Result<usize> {
        let mut index = 0;
        loop {
            let n_literals = (buf.len() - index).min(self.lmd.l as usize);
            if n_literals > 0 {
                let out = &mut buf[index..index + n_literals];
                self.source.next_literal_run(out)?;
                mb.write(out);

                index += n_literals;
                self.lmd.l -= n_literals as u32;
            }

            let n_matches = (buf.len() - index).min(self.lmd.m as usize);
            if n_matches > 0 {
                mb.match_into(self.lmd.d, &mut buf[index..index + n_matches]);

                index += n_matches;
                self.lmd.m -= n_matches as u32;
            }

            if index >= buf.len() || !self.next_triple(mb)? {
                break;
            }
        }

        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct ScriptSource {
        triples: Vec<(u32, u32, u32)>,
        literals: Vec<u8>,
        next: usize,
        pos: usize,
    }

    impl ScriptSource {
        fn new(triples: &[(u32, u32, u32)], literals: &[u8]) -> Self {
            Self {
                triples: triples.to_vec(),
                literals: literals.to_vec(),
                next: 0,
                pos: 0,
            }
        }
    }

    impl LmdSource for ScriptSource {
        fn next_triple(&mut self, lmd: &mut Lmd) -> Result<bool> {
            let Some(&(l, m, d)) = self.triples.get(self.next) else {
                return Ok(false);
            };
            self.next += 1;
            lmd.l = l;
            lmd.m = m;
            lmd.set_distance(d);
            Ok(true)
        }

        fn next_literal_byte(&mut self) -> Result<u8> {
            let b = self.literals[self.pos];
            self.pos += 1;
            Ok(b)
        }
    }

    const TRIPLES: &[(u32, u32, u32)] = &[(3, 4, 3), (1, 0, 0), (2, 5, 0), (0, 6, 7)];
    const EXPECTED: &[u8] = b"abcabcaXyzXyzXyyzXyzX";

    #[test]
    fn test_read_bytes() {
        let mut mb = MatchBuffer::new(64).unwrap();
        let mut decoder = LmdBlockDecoder::new(ScriptSource::new(TRIPLES, b"abcXyz"));

        let mut out = Vec::new();
        while let Some(b) = decoder.read_byte(&mut mb).unwrap() {
            out.push(b);
        }
        assert_eq!(out, EXPECTED);
        // Exhausted blocks stay exhausted
        assert_eq!(decoder.read_byte(&mut mb).unwrap(), None);
    }

    #[test]
    fn test_read_chunks() {
        for chunk in [1, 2, 5, 64] {
            let mut mb = MatchBuffer::new(64).unwrap();
            let mut decoder = LmdBlockDecoder::new(ScriptSource::new(TRIPLES, b"abcXyz"));

            let mut out = Vec::new();
            let mut buf = vec![0u8; chunk];
            loop {
                let n = decoder.read(&mut mb, &mut buf).unwrap();
                if n == 0 {
                    break;
                }
                out.extend_from_slice(&buf[..n]);
            }
            assert_eq!(out, EXPECTED, "chunk size {}", chunk);
        }
    }

    #[test]
    fn test_zero_distance_keeps_previous() {
        let mut lmd = Lmd::new(0, 0, 9);
        lmd.set_distance(0);
        assert_eq!(lmd.d(), 9);
        lmd.set_distance(4);
        assert_eq!(lmd.d(), 4);
    }

    #[test]
    fn test_match_before_any_output() {
        let mut mb = MatchBuffer::new(64).unwrap();
        let mut decoder = LmdBlockDecoder::new(ScriptSource::new(&[(0, 3, 1)], b""));
        let mut buf = [0u8; 8];
        assert!(matches!(
            decoder.read(&mut mb, &mut buf),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_match_into_own_literals() {
        let mut mb = MatchBuffer::new(64).unwrap();
        let mut decoder = LmdBlockDecoder::new(ScriptSource::new(&[(2, 4, 2)], b"ab"));
        let mut buf = [0u8; 8];
        assert_eq!(decoder.read(&mut mb, &mut buf).unwrap(), 6);
        assert_eq!(&buf[..6], b"ababab");
    }

    #[test]
    fn test_match_without_distance() {
        let mut mb = MatchBuffer::new(64).unwrap();
        let mut decoder = LmdBlockDecoder::new(ScriptSource::new(&[(2, 3, 0)], b"ab"));
        assert!(matches!(decoder.read_byte(&mut mb), Err(Error::Format(_))));
    }

    #[test]
    fn test_distance_beyond_buffer() {
        let mut mb = MatchBuffer::new(4).unwrap();
        let mut decoder = LmdBlockDecoder::new(ScriptSource::new(&[(6, 2, 5)], b"abcdef"));
        let mut buf = [0u8; 16];
        assert!(matches!(
            decoder.read(&mut mb, &mut buf),
            Err(Error::Format(_))
        ));
    }
}
