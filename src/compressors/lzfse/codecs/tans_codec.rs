//! # tANS decoding tables
//!
//! A table of `N` states is built from a normalised frequency table whose weights sum
//! to at most `N`. Each symbol with weight `w` owns `w` consecutive states. Decoding a
//! symbol from a state is a lookup, followed by reading `n_bits` from the stream to
//! find the next state.

use super::bit_codec::BitReader;
use crate::error::{Error, Result};

/// The largest alphabet a table can be built for.
pub const MAX_SYMBOLS: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TansEntry {
    pub n_bits: u8,
    pub symbol: u8,
    pub n_base: u16,
}

impl TansEntry {
    const EMPTY: TansEntry = TansEntry {
        n_bits: 0,
        symbol: 0,
        n_base: 0,
    };
}

#[derive(Debug, Clone)]
pub struct TansTable<const N: usize> {
    entries: [TansEntry; N],
}

impl<const N: usize> TansTable<N> {
    pub fn new() -> Self {
        Self {
            entries: [TansEntry::EMPTY; N],
        }
    }

    /// Rebuild the table from a frequency table.
    pub fn init(&mut self, weights: &[u16]) -> Result<()> {
        if weights.len() > MAX_SYMBOLS {
            return Err(Error::Format("too many tANS symbols"));
        }
        let total: u32 = weights.iter().map(|&w| w as u32).sum();
        if total > N as u32 {
            return Err(Error::Format("tANS weights exceed the table size"));
        }

        self.entries.fill(TansEntry::EMPTY);

        let n_states = N as u32;
        let n_zero = n_states.leading_zeros();
        let mut slot = 0;
        for (symbol, &w) in weights.iter().enumerate() {
            if w == 0 {
                continue;
            }
            let w = w as u32;
            let k = w.leading_zeros() - n_zero;
            let x = ((2 * n_states) >> k) - w;

            for i in 0..w {
                // When k == 0 the symbol owns the whole table and x == w, so the
                // second branch is only taken with k >= 1.
                self.entries[slot] = if i < x {
                    TansEntry {
                        n_bits: k as u8,
                        symbol: symbol as u8,
                        n_base: (((w + i) << k) - n_states) as u16,
                    }
                } else {
                    TansEntry {
                        n_bits: (k - 1) as u8,
                        symbol: symbol as u8,
                        n_base: ((i - x) << (k - 1)) as u16,
                    }
                };
                slot += 1;
            }
        }

        Ok(())
    }

    pub fn entry(&self, state: u16) -> TansEntry {
        self.entries[state as usize]
    }

    /// Decode the entry for `state` and advance `state` to the next one.
    #[inline(always)]
    pub fn transition(&self, state: &mut u16, reader: &mut BitReader) -> Result<TansEntry> {
        let entry = self.entries[*state as usize];
        *state = entry.n_base + reader.read(entry.n_bits as u32)? as u16;
        Ok(entry)
    }
}

impl<const N: usize> Default for TansTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that a starting state from a block header fits a table of `N` states.
pub fn check_state<const N: usize>(state: u16) -> Result<u16> {
    if (state as usize) < N {
        Ok(state)
    } else {
        Err(Error::Format("tANS state out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_single_symbol_owns_table() {
        let mut table = TansTable::<64>::new();
        table.init(&[0, 64]).unwrap();
        for state in 0..64 {
            let entry = table.entry(state);
            assert_eq!(entry.symbol, 1);
            assert_eq!(entry.n_bits, 0);
            assert_eq!(entry.n_base, state);
        }
    }

    #[test]
    fn test_split_radix_layout() {
        let mut table = TansTable::<16>::new();
        table.init(&[3, 13]).unwrap();

        // w = 3: k = 3, x = 1
        let entry = |n_bits, symbol, n_base| TansEntry {
            n_bits,
            symbol,
            n_base,
        };
        assert_eq!(table.entry(0), entry(3, 0, 8));
        assert_eq!(table.entry(1), entry(2, 0, 0));
        assert_eq!(table.entry(2), entry(2, 0, 4));

        // w = 13: k = 1, x = 3
        assert_eq!(table.entry(3), entry(1, 1, 10));
        assert_eq!(table.entry(4), entry(1, 1, 12));
        assert_eq!(table.entry(5), entry(1, 1, 14));
        for i in 0..10u16 {
            assert_eq!(table.entry(6 + i), entry(0, 1, i));
        }
    }

    #[test]
    fn test_states_cover_table() {
        // Every next state must be reachable exactly once per bit pattern
        let weights = [5u16, 1, 7, 0, 3];
        let mut table = TansTable::<16>::new();
        table.init(&weights).unwrap();

        let mut seen = [0u32; 16];
        for state in 0..16u16 {
            let entry = table.entry(state);
            for bits in 0..(1u16 << entry.n_bits) {
                let next = entry.n_base + bits;
                assert!(next < 16);
                seen[next as usize] += 1;
            }
        }
        // Each symbol's slots partition the whole state range
        assert!(seen.iter().all(|&n| n == weights.iter().filter(|&&w| w > 0).count() as u32));
    }

    #[test]
    fn test_transition_reads_state_bits() {
        let mut table = TansTable::<4>::new();
        table.init(&[1, 1, 2]).unwrap();
        // Symbol 0: w = 1, k = 2, reads two bits from base 0
        let mut reader = BitReader::new();
        reader.load(Cursor::new([0b1100_0000u8]), 8, 1, 0).unwrap();
        let mut state = 0;
        let entry = table.transition(&mut state, &mut reader).unwrap();
        assert_eq!(entry.symbol, 0);
        assert_eq!(state, 0b11);
    }

    #[test]
    fn test_weight_sum_overflow() {
        let mut table = TansTable::<64>::new();
        assert!(matches!(table.init(&[32, 33]), Err(Error::Format(_))));
        assert!(matches!(table.init(&[u16::MAX, 2]), Err(Error::Format(_))));
    }

    #[test]
    fn test_too_many_symbols() {
        let mut table = TansTable::<1024>::new();
        let weights = [0u16; 257];
        assert!(matches!(table.init(&weights), Err(Error::Format(_))));
    }

    #[test]
    fn test_partial_weights() {
        let mut table = TansTable::<64>::new();
        table.init(&[1, 2, 3]).unwrap();
        assert_eq!(table.entry(5).symbol, 2);
        assert_eq!(table.entry(6), TansEntry::default());
    }

    #[test]
    fn test_check_state() {
        assert_eq!(check_state::<64>(63).unwrap(), 63);
        assert!(check_state::<64>(64).is_err());
    }
}
