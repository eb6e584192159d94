use super::frozen::FrozenTrie;
use crate::{RuleInvError, RuleInvResult};

/// A position in a frozen trie
///
/// Copying a cursor is free, so lookups fork by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'t> {
    trie: &'t FrozenTrie,
    node: u32,
}

impl<'t> Cursor<'t> {
    pub(crate) fn new(trie: &'t FrozenTrie, node: u32) -> Self {
        Self { trie, node }
    }

    pub fn has_child(&self, byte: u8) -> bool {
        self.trie.child(self.node, byte).is_some()
    }

    /// Descend along `byte`
    ///
    /// Callers must check `has_child` first; stepping along a missing edge
    /// leaves the cursor where it was and reports the byte.
    pub fn step(&mut self, byte: u8) -> RuleInvResult<()> {
        match self.trie.child(self.node, byte) {
            Some(next) => {
                self.node = next;
                Ok(())
            }
            None => Err(RuleInvError::TrieLookupPrecondition { byte }),
        }
    }

    /// Whether the bytes consumed so far form a stored word
    pub fn is_accept(&self) -> bool {
        self.trie.is_accept_node(self.node)
    }

    pub fn node_id(&self) -> u32 {
        self.node
    }
}
