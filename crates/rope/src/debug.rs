//! Tree inspection helpers for tests and troubleshooting

use crate::node::Node;
use crate::rope::Rope;
use std::fmt::Write;

impl Rope {
    /// Indented rendering of the tree, one node per line: weight, then the
    /// leaf content between bars. Children are prefixed `<` and `>`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let Some(root) = self.root() else {
            return out;
        };

        let mut stack: Vec<(&Node, usize, &str)> = vec![(root.as_ref(), 0, "")];
        while let Some((node, level, prefix)) = stack.pop() {
            let content = node.content().unwrap_or_default();
            let _ = writeln!(
                out,
                "{}{}{} |{}|",
                "  ".repeat(level),
                prefix,
                node.weight(),
                content.escape_ascii()
            );
            if let Some((left, right)) = node.children() {
                stack.push((right.as_ref(), level + 1, ">"));
                stack.push((left.as_ref(), level + 1, "<"));
            }
        }
        out
    }

    /// Same shape, same weights, same leaf bytes. Stricter than `==`, which
    /// ignores how the bytes are cut into leaves.
    pub fn same_structure(&self, other: &Rope) -> bool {
        let (a, b) = match (self.root(), other.root()) {
            (None, None) => return true,
            (Some(a), Some(b)) => (a.as_ref(), b.as_ref()),
            _ => return false,
        };

        let mut stack = vec![(a, b)];
        while let Some((a, b)) = stack.pop() {
            if std::ptr::eq(a, b) {
                continue;
            }
            if a.weight() != b.weight() || a.content() != b.content() {
                return false;
            }
            match (a.children(), b.children()) {
                (None, None) => {}
                (Some((al, ar)), Some((bl, br))) => {
                    stack.push((ar.as_ref(), br.as_ref()));
                    stack.push((al.as_ref(), bl.as_ref()));
                }
                _ => return false,
            }
        }
        true
    }
}
