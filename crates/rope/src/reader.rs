//! `std::io` adapter over a rope

use crate::error::Result;
use crate::iter::Chunks;
use crate::rope::Rope;
use std::io::{self, BufRead, Read};

/// Streams a rope's bytes from an offset without materializing them.
///
/// `fill_buf` exposes the current leaf fragment directly, so `BufRead`
/// consumers copy nothing until they ask for it.
pub struct ByteReader<'a> {
    chunks: Chunks<'a>,
    current: &'a [u8],
}

impl<'a> ByteReader<'a> {
    /// Bytes not yet handed out by the current fragment
    fn refill(&mut self) -> &'a [u8] {
        while self.current.is_empty() {
            match self.chunks.next() {
                Some(chunk) => self.current = chunk,
                None => break,
            }
        }
        self.current
    }
}

impl Read for ByteReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            let available = self.refill();
            if available.is_empty() {
                break;
            }
            let n = available.len().min(buf.len() - written);
            buf[written..written + n].copy_from_slice(&available[..n]);
            self.current = &available[n..];
            written += n;
        }
        Ok(written)
    }
}

impl BufRead for ByteReader<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(self.refill())
    }

    fn consume(&mut self, amt: usize) {
        self.current = &self.current[amt.min(self.current.len())..];
    }
}

impl Rope {
    /// Reader over `[offset, len)`
    pub fn reader(&self, offset: usize) -> Result<ByteReader<'_>> {
        Ok(ByteReader {
            chunks: self.chunks(offset)?,
            current: &[],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RopeConfig;
    use crate::env::Env;

    #[test]
    fn test_read_to_end_from_offset() {
        let env = Env::new(RopeConfig::with_max_leaf_bytes(8)).unwrap();
        let rope = env.from_bytes("foobarbazqux");
        let mut out = Vec::new();
        rope.reader(3).unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, b"barbazqux");
    }

    #[test]
    fn test_small_reads_cross_leaves() {
        let env = Env::new(RopeConfig::with_max_leaf_bytes(4)).unwrap();
        let rope = env.from_bytes("abcdefghij");
        let mut reader = rope.reader(0).unwrap();
        let mut buf = [0u8; 3];

        let mut out = Vec::new();
        loop {
            let n = reader.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, b"abcdefghij");
    }

    #[test]
    fn test_buf_read_lines() {
        let env = Env::new(RopeConfig::with_max_leaf_bytes(5)).unwrap();
        let rope = env.from_bytes("first\nsecond line\nthird");
        let lines: Vec<String> = rope.reader(0).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["first", "second line", "third"]);
    }

    #[test]
    fn test_reader_rejects_bad_offset() {
        let env = Env::new(RopeConfig::with_max_leaf_bytes(8)).unwrap();
        assert!(env.from_bytes("abc").reader(4).is_err());
    }
}
