//! Candidate enumeration against a token string
//!
//! Depth-first over (cursor, depth, path) frames. At each frame the bytes
//! of the current set are tried against the cursor; children are pushed in
//! descending order so results come out in ascending byte order.

use super::cursor::Cursor;
use super::frozen::FrozenTrie;
use super::token::TokenString;

/// Iterator over the stored words matching a token string
pub struct Matches<'t, 'p> {
    pattern: &'p TokenString,
    stack: Vec<Frame<'t>>,
}

struct Frame<'t> {
    cursor: Cursor<'t>,
    depth: usize,
    path: Vec<u8>,
}

impl<'t, 'p> Matches<'t, 'p> {
    fn new(trie: &'t FrozenTrie, pattern: &'p TokenString) -> Self {
        let stack = if pattern.is_empty() {
            // Only the empty word would match, and it is never stored.
            Vec::new()
        } else {
            vec![Frame {
                cursor: trie.root(),
                depth: 0,
                path: Vec::with_capacity(pattern.len()),
            }]
        };
        Self { pattern, stack }
    }
}

impl Iterator for Matches<'_, '_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        while let Some(frame) = self.stack.pop() {
            let Some(set) = self.pattern.get(frame.depth) else {
                if frame.cursor.is_accept() {
                    return Some(frame.path);
                }
                continue;
            };
            for byte in set.iter().rev() {
                let mut cursor = frame.cursor;
                if cursor.step(byte).is_err() {
                    continue;
                }
                let mut path = frame.path.clone();
                path.push(byte);
                self.stack.push(Frame {
                    cursor,
                    depth: frame.depth + 1,
                    path,
                });
            }
        }
        None
    }
}

impl FrozenTrie {
    /// Lazily enumerate stored words matching `pattern`
    pub fn lookup<'t, 'p>(&'t self, pattern: &'p TokenString) -> Matches<'t, 'p> {
        Matches::new(self, pattern)
    }

    /// Collect every match of `pattern`
    pub fn lookup_all(&self, pattern: &TokenString) -> Vec<Vec<u8>> {
        self.lookup(pattern).collect()
    }

    /// Count matches without collecting them
    pub fn count_matches(&self, pattern: &TokenString) -> usize {
        self.lookup(pattern).count()
    }
}
