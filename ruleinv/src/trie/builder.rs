use super::frozen::{FrozenTrie, PackedNode};
use crate::{RuleInvError, RuleInvResult};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default, Clone)]
struct BuildNode {
    /// Child edges sorted by label
    children: Vec<(u8, u32)>,
    accept: bool,
}

impl BuildNode {
    fn child(&self, byte: u8) -> Result<u32, usize> {
        self.children
            .binary_search_by_key(&byte, |(label, _)| *label)
            .map(|i| self.children[i].1)
    }
}

/// Mutable trie used while loading a wordlist
///
/// Stores membership only. `freeze` turns it into the packed immutable form.
#[derive(Debug, Clone)]
pub struct TrieBuilder {
    nodes: Vec<BuildNode>,
    words: u64,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self {
            nodes: vec![BuildNode::default()],
            words: 0,
        }
    }
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word; returns whether it was new
    ///
    /// The empty word is ignored and duplicates are no-ops.
    pub fn insert(&mut self, word: &[u8]) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut node = 0usize;
        for &byte in word {
            node = match self.nodes[node].child(byte) {
                Ok(child) => child as usize,
                Err(slot) => {
                    let child = self.nodes.len();
                    self.nodes.push(BuildNode::default());
                    self.nodes[node].children.insert(slot, (byte, child as u32));
                    child
                }
            };
        }
        if self.nodes[node].accept {
            return false;
        }
        self.nodes[node].accept = true;
        self.words += 1;
        true
    }

    /// Number of distinct words
    pub fn len(&self) -> u64 {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, word: &[u8]) -> bool {
        let mut node = 0usize;
        for &byte in word {
            match self.nodes[node].child(byte) {
                Ok(child) => node = child as usize,
                Err(_) => return false,
            }
        }
        !word.is_empty() && self.nodes[node].accept
    }

    /// Insert every newline-separated word of a reader (CRLF tolerated)
    pub fn extend_from_reader<R: BufRead>(&mut self, mut reader: R) -> std::io::Result<u64> {
        let mut added = 0;
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if line.last() == Some(&b'\n') {
                line.pop();
            }
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if self.insert(&line) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Build a trie from a wordlist file
    pub fn from_wordlist(path: &Path) -> RuleInvResult<Self> {
        let file = File::open(path).map_err(|e| RuleInvError::io(path, e))?;
        let mut builder = Self::new();
        builder
            .extend_from_reader(BufReader::new(file))
            .map_err(|e| RuleInvError::io(path, e))?;
        debug!(
            words = builder.words,
            nodes = builder.nodes.len(),
            path = %path.display(),
            "wordlist loaded"
        );
        Ok(builder)
    }

    /// Freeze into the packed immutable form and its serialized bytes
    pub fn freeze(self) -> (FrozenTrie, Vec<u8>) {
        let trie = self.into_frozen();
        let bytes = trie.serialize();
        (trie, bytes)
    }

    /// Freeze without producing the byte stream
    ///
    /// Nodes are renumbered breadth-first, so every child id is greater than
    /// its parent's and each node's edges are contiguous.
    pub fn into_frozen(self) -> FrozenTrie {
        let mut packed = Vec::with_capacity(self.nodes.len());
        let mut labels = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        let mut targets = Vec::with_capacity(self.nodes.len().saturating_sub(1));

        // Children are enqueued in id order, so the dequeue order is the new
        // numbering.
        let mut queue = VecDeque::from([0u32]);
        let mut next_id = 1u32;

        while let Some(old) = queue.pop_front() {
            let node = &self.nodes[old as usize];
            let first_edge = labels.len() as u32;
            for &(label, child) in &node.children {
                labels.push(label);
                targets.push(next_id);
                next_id += 1;
                queue.push_back(child);
            }
            packed.push(PackedNode::new(
                first_edge,
                node.children.len() as u32,
                node.accept,
            ));
        }

        FrozenTrie::from_parts(packed, labels, targets, self.words)
    }
}

impl<'a> FromIterator<&'a [u8]> for TrieBuilder {
    fn from_iter<I: IntoIterator<Item = &'a [u8]>>(iter: I) -> Self {
        let mut builder = TrieBuilder::new();
        for word in iter {
            builder.insert(word);
        }
        builder
    }
}

impl<'a> FromIterator<&'a str> for TrieBuilder {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::as_bytes).collect()
    }
}
