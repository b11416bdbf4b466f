//! Leaf-fragment traversal, forward and backward
//!
//! Both directions keep an explicit stack of the subtrees still to visit,
//! so no traversal recurses. Fragments are handed out per leaf, never per
//! byte.

use crate::error::Result;
use crate::node::{Kind, Node};
use crate::rope::Rope;
use std::iter::FusedIterator;

/// Leaf slices from an offset to the end, left to right
pub struct Chunks<'a> {
    /// Right siblings still to visit, nearest on top
    stack: Vec<&'a Node>,
    /// Tail of the leaf the offset landed in
    head: &'a [u8],
}

impl<'a> Chunks<'a> {
    pub(crate) fn new(root: Option<&'a Node>, mut offset: usize) -> Self {
        let mut stack = Vec::new();
        let mut head: &'a [u8] = &[];
        let mut cursor = root;

        while let Some(node) = cursor {
            match node.kind() {
                Kind::Leaf(content) => {
                    head = content.get(offset..).unwrap_or(&[]);
                    cursor = None;
                }
                Kind::Branch { left, right } => {
                    if offset >= node.weight() {
                        offset -= node.weight();
                        cursor = Some(right.as_ref());
                    } else {
                        stack.push(right.as_ref());
                        cursor = Some(left.as_ref());
                    }
                }
            }
        }

        Self { stack, head }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if !self.head.is_empty() {
            return Some(std::mem::take(&mut self.head));
        }

        while let Some(mut node) = self.stack.pop() {
            loop {
                match node.kind() {
                    Kind::Leaf(content) if content.is_empty() => break,
                    Kind::Leaf(content) => return Some(&content[..]),
                    Kind::Branch { left, right } => {
                        self.stack.push(right.as_ref());
                        node = left.as_ref();
                    }
                }
            }
        }
        None
    }
}

impl FusedIterator for Chunks<'_> {}

/// Leaf slices covering `[0, end)`, right to left. Each slice keeps its
/// forward byte order.
pub struct ChunksRev<'a> {
    /// Left siblings still to visit, nearest on top
    stack: Vec<&'a Node>,
    /// Head of the leaf the end offset landed in
    head: &'a [u8],
}

impl<'a> ChunksRev<'a> {
    pub(crate) fn new(root: Option<&'a Node>, mut end: usize) -> Self {
        let mut stack = Vec::new();
        let mut head: &'a [u8] = &[];
        let mut cursor = root;

        while let Some(node) = cursor {
            match node.kind() {
                Kind::Leaf(content) => {
                    head = &content[..end.min(content.len())];
                    cursor = None;
                }
                Kind::Branch { left, right } => {
                    if end > node.weight() {
                        end -= node.weight();
                        stack.push(left.as_ref());
                        cursor = Some(right.as_ref());
                    } else {
                        cursor = Some(left.as_ref());
                    }
                }
            }
        }

        Self { stack, head }
    }
}

impl<'a> Iterator for ChunksRev<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if !self.head.is_empty() {
            return Some(std::mem::take(&mut self.head));
        }

        while let Some(mut node) = self.stack.pop() {
            loop {
                match node.kind() {
                    Kind::Leaf(content) if content.is_empty() => break,
                    Kind::Leaf(content) => return Some(&content[..]),
                    Kind::Branch { left, right } => {
                        self.stack.push(left.as_ref());
                        node = right.as_ref();
                    }
                }
            }
        }
        None
    }
}

impl FusedIterator for ChunksRev<'_> {}

impl Rope {
    /// Pull-based fragments of `[offset, len)`
    pub fn chunks(&self, offset: usize) -> Result<Chunks<'_>> {
        self.check_offset(offset)?;
        Ok(Chunks::new(self.root().map(|root| root.as_ref()), offset))
    }

    /// Pull-based fragments of `[0, end)`, last fragment first
    pub fn chunks_rev(&self, end: usize) -> Result<ChunksRev<'_>> {
        self.check_offset(end)?;
        Ok(ChunksRev::new(self.root().map(|root| root.as_ref()), end))
    }

    /// Visit each fragment from `offset` onward; `visit` returns `false` to stop
    pub fn iter<F>(&self, offset: usize, mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> bool,
    {
        for chunk in self.chunks(offset)? {
            if !visit(chunk) {
                break;
            }
        }
        Ok(())
    }

    /// Visit the fragments before `offset` from right to left. Each fragment
    /// arrives byte-reversed, so the visitor sees the sequence flowing
    /// backward one byte at a time.
    pub fn iter_backward<F>(&self, offset: usize, mut visit: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> bool,
    {
        let mut reversed = Vec::new();
        for chunk in self.chunks_rev(offset)? {
            reversed.clear();
            reversed.extend(chunk.iter().rev());
            if !visit(&reversed) {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RopeConfig;
    use crate::env::Env;

    fn env() -> Env {
        Env::new(RopeConfig::with_max_leaf_bytes(8)).unwrap()
    }

    #[test]
    fn test_chunks_are_leaf_sized() {
        let env = env();
        let rope = env.from_bytes("foobarbaz".repeat(3));
        let chunks: Vec<Vec<u8>> = rope.chunks(0).unwrap().map(<[u8]>::to_vec).collect();
        assert_eq!(
            chunks,
            vec![b"foobarba".to_vec(), b"zfoobarb".to_vec(), b"azfoobar".to_vec(), b"baz".to_vec()]
        );
    }

    #[test]
    fn test_chunks_from_mid_leaf() {
        let env = env();
        let rope = env.from_bytes("foobarbazqux");
        let chunks: Vec<Vec<u8>> = rope.chunks(5).unwrap().map(<[u8]>::to_vec).collect();
        assert_eq!(chunks, vec![b"rba".to_vec(), b"zqux".to_vec()]);
        assert_eq!(rope.chunks(12).unwrap().count(), 0);
        assert!(rope.chunks(13).is_err());
    }

    #[test]
    fn test_chunks_rev_from_mid_leaf() {
        let env = env();
        let rope = env.from_bytes("foobarbazqux");
        let chunks: Vec<Vec<u8>> = rope.chunks_rev(10).unwrap().map(<[u8]>::to_vec).collect();
        assert_eq!(chunks, vec![b"zq".to_vec(), b"foobarba".to_vec()]);
        assert_eq!(rope.chunks_rev(0).unwrap().count(), 0);
        assert!(rope.chunks_rev(13).is_err());
    }

    #[test]
    fn test_iter_short_circuits() {
        let env = env();
        let rope = env.from_bytes("foobarbaz".repeat(512));
        let mut n = 0;
        rope.iter(0, |_| {
            n += 1;
            n != 3
        })
        .unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn test_iter_backward_reverses_fragments() {
        let env = env();
        let rope = env.from_bytes("foobarbazqux");
        let mut seen = Vec::new();
        rope.iter_backward(10, |fragment| {
            seen.push(fragment.to_vec());
            true
        })
        .unwrap();
        assert_eq!(seen, vec![b"qz".to_vec(), b"abraboof".to_vec()]);
    }

    #[test]
    fn test_empty_rope() {
        let env = env();
        let rope = env.empty();
        assert_eq!(rope.chunks(0).unwrap().count(), 0);
        assert_eq!(rope.chunks_rev(0).unwrap().count(), 0);
        assert!(rope.iter(1, |_| true).is_err());
    }
}
