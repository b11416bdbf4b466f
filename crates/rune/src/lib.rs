//! UTF-8 code point decoding over a rope
//!
//! Decoding pulls leaf fragments through [`strand_rope::Chunks`] into a
//! small window holding at least one full encoding, so a code point split
//! across leaves decodes the same as one stored in a single leaf. Invalid
//! sequences fail one read at a time and decoding carries on behind them.

use simdutf8::basic::from_utf8;
use strand_rope::{Chunks, Rope};
use thiserror::Error;

/// Longest UTF-8 encoding, in bytes
pub const MAX_RUNE_BYTES: usize = 4;

/// Decode failure, scoped to the single read that hit it
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuneError {
    /// `byte` at `offset` does not start a valid encoding
    #[error("malformed UTF-8 at byte {offset} (0x{byte:02x})")]
    Malformed { offset: usize, byte: u8 },
}

/// Encoded width announced by a lead byte, 0 if it cannot lead
#[inline]
fn width(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}

/// Code points with their encoded widths, from a byte offset onward
pub struct Runes<'a> {
    chunks: Chunks<'a>,
    window: Vec<u8>,
    /// Read position inside `window`
    pos: usize,
    /// Rope offset of `window[pos]`
    offset: usize,
}

impl<'a> Runes<'a> {
    fn new(chunks: Chunks<'a>, offset: usize) -> Self {
        Self {
            chunks,
            window: Vec::with_capacity(2 * MAX_RUNE_BYTES),
            pos: 0,
            offset,
        }
    }

    /// Rope offset of the next code point
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Top the window up until a full encoding fits or the rope runs out
    fn fill(&mut self) {
        while self.window.len() - self.pos < MAX_RUNE_BYTES {
            let Some(chunk) = self.chunks.next() else {
                break;
            };
            if self.pos > 0 {
                self.window.drain(..self.pos);
                self.pos = 0;
            }
            self.window.extend_from_slice(chunk);
        }
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
        self.offset += n;
    }
}

impl Iterator for Runes<'_> {
    type Item = Result<(char, usize), RuneError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.fill();
        let available = &self.window[self.pos..];
        let &lead = available.first()?;

        let n = width(lead);
        let decoded = match available.get(..n) {
            Some(encoded) if n > 0 => from_utf8(encoded).ok().and_then(|s| s.chars().next()),
            _ => None,
        };

        match decoded {
            Some(c) => {
                self.advance(n);
                Some(Ok((c, n)))
            }
            None => {
                let offset = self.offset;
                self.advance(1);
                Some(Err(RuneError::Malformed { offset, byte: lead }))
            }
        }
    }
}

/// Code point access for [`Rope`]
pub trait RuneExt {
    /// Decoder starting at byte `offset`
    fn runes(&self, offset: usize) -> strand_rope::Result<Runes<'_>>;

    /// Visit `(char, width)` pairs from `offset` until `visit` returns
    /// `false`. Malformed bytes arrive as U+FFFD with width 1.
    fn iter_rune<F>(&self, offset: usize, visit: F) -> strand_rope::Result<()>
    where
        F: FnMut(char, usize) -> bool;
}

impl RuneExt for Rope {
    fn runes(&self, offset: usize) -> strand_rope::Result<Runes<'_>> {
        Ok(Runes::new(self.chunks(offset)?, offset))
    }

    fn iter_rune<F>(&self, offset: usize, mut visit: F) -> strand_rope::Result<()>
    where
        F: FnMut(char, usize) -> bool,
    {
        for rune in self.runes(offset)? {
            let (c, n) = rune.unwrap_or((char::REPLACEMENT_CHARACTER, 1));
            if !visit(c, n) {
                break;
            }
        }
        Ok(())
    }
}
