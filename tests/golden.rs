//! A single stream mixing every block kind: raw, two LZVN blocks back to back, a V1
//! block, an empty V2 block, a V2 block and an empty raw block. The file starts with
//! the SHA-256 of the decoded output.

use std::io::Read;

use lzfse_reader::{decompress, Availability, Error, LzfseReader};
use sha2::{Digest, Sha256};

const GOLDEN: &[u8] = include_bytes!("data/golden.lzfse");
const PLAIN_LEN: usize = 89300;

fn split() -> (&'static [u8], &'static [u8]) {
    GOLDEN.split_at(32)
}

#[test]
fn test_golden_digest() {
    let (digest, stream) = split();
    let out = decompress(stream).unwrap();
    assert_eq!(out.len(), PLAIN_LEN);
    assert_eq!(Sha256::digest(&out).as_slice(), digest);
}

#[test]
fn test_golden_read_to_end() {
    let (digest, stream) = split();
    let mut reader = LzfseReader::new(stream);
    assert_eq!(reader.available(), Availability::Pending);

    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(Sha256::digest(&out).as_slice(), digest);
    assert_eq!(reader.available(), Availability::Exhausted);
    assert_eq!(reader.total_out(), PLAIN_LEN as u64);
}

#[test]
fn test_golden_read_at() {
    let (digest, stream) = split();
    let mut reader = LzfseReader::new(stream);
    let mut out = vec![0u8; PLAIN_LEN];
    let mut pos = 0;
    while let Some(n) = reader.read_at(&mut out, pos, (PLAIN_LEN - pos).min(1000)).unwrap() {
        pos += n;
        if pos == PLAIN_LEN {
            // Only the end of stream marker is left
            assert_eq!(reader.read_at(&mut out, 0, 1).unwrap(), None);
            break;
        }
    }
    assert_eq!(pos, PLAIN_LEN);
    assert_eq!(Sha256::digest(&out).as_slice(), digest);
}

#[test]
fn test_golden_truncated() {
    let (_, stream) = split();
    for len in [0, 3, 100, 330, 5000, stream.len() - 1] {
        let err = decompress(&stream[..len]).unwrap_err();
        assert!(
            matches!(err, Error::Truncated | Error::Format(_)),
            "cut at {}: {:?}",
            len,
            err
        );
    }
}

#[test]
fn test_golden_corrupted() {
    let (_, stream) = split();
    let mut corrupted = stream.to_vec();
    // Clobber the magic of the first LZVN block
    corrupted[308] = b'!';
    assert!(matches!(decompress(&corrupted), Err(Error::BadMagic(_))));
}
