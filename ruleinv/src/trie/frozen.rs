//! Packed immutable trie
//!
//! Nodes live in one table, numbered breadth-first from the root (id 0).
//! Each node owns a contiguous run of edges in the parallel `labels` and
//! `targets` arrays, sorted by label.
//!
//! Binary layout, all integers little-endian:
//! ```text
//! magic        b"RITR"
//! version      u32 (1)
//! word_count   u64
//! node_count   u32
//! edge_count   u32
//! nodes        node_count x (first_edge u32, meta u32)
//! labels       edge_count x u8
//! targets      edge_count x u32
//! ```
//! `meta` holds the edge count in its low 31 bits and the accept flag in
//! bit 31.

use super::cursor::Cursor;
use crate::{RuleInvError, RuleInvResult};
use std::fs;
use std::path::Path;

const MAGIC: &[u8; 4] = b"RITR";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 8 + 4 + 4;

const ACCEPT_FLAG: u32 = 1 << 31;
const EDGE_COUNT_MASK: u32 = ACCEPT_FLAG - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedNode {
    first_edge: u32,
    meta: u32,
}

impl PackedNode {
    pub(crate) fn new(first_edge: u32, edge_count: u32, accept: bool) -> Self {
        let meta = (edge_count & EDGE_COUNT_MASK) | if accept { ACCEPT_FLAG } else { 0 };
        Self { first_edge, meta }
    }

    #[inline]
    pub fn first_edge(self) -> u32 {
        self.first_edge
    }

    #[inline]
    pub fn edge_count(self) -> u32 {
        self.meta & EDGE_COUNT_MASK
    }

    #[inline]
    pub fn is_accept(self) -> bool {
        self.meta & ACCEPT_FLAG != 0
    }

    #[inline]
    fn edges(self) -> std::ops::Range<usize> {
        let start = self.first_edge as usize;
        start..start + self.edge_count() as usize
    }
}

/// Immutable trie over a wordlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenTrie {
    nodes: Vec<PackedNode>,
    labels: Vec<u8>,
    targets: Vec<u32>,
    word_count: u64,
}

impl FrozenTrie {
    pub(crate) fn from_parts(
        nodes: Vec<PackedNode>,
        labels: Vec<u8>,
        targets: Vec<u32>,
        word_count: u64,
    ) -> Self {
        Self {
            nodes,
            labels,
            targets,
            word_count,
        }
    }

    /// Number of distinct words stored
    pub fn word_count(&self) -> u64 {
        self.word_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// Cursor positioned at the root
    pub fn root(&self) -> Cursor<'_> {
        Cursor::new(self, 0)
    }

    /// Child of `node` along `byte`
    pub(crate) fn child(&self, node: u32, byte: u8) -> Option<u32> {
        let range = self.nodes[node as usize].edges();
        let labels = &self.labels[range.clone()];
        labels
            .binary_search(&byte)
            .ok()
            .map(|i| self.targets[range.start + i])
    }

    pub(crate) fn is_accept_node(&self, node: u32) -> bool {
        self.nodes[node as usize].is_accept()
    }

    /// Exact membership test
    pub fn accepts(&self, word: &[u8]) -> bool {
        if word.is_empty() {
            return false;
        }
        let mut node = 0u32;
        for &byte in word {
            match self.child(node, byte) {
                Some(next) => node = next,
                None => return false,
            }
        }
        self.is_accept_node(node)
    }

    /// Every stored word in lexicographic byte order
    pub fn words(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::with_capacity(self.word_count as usize);
        let mut stack = vec![(0u32, Vec::new())];
        while let Some((node, path)) = stack.pop() {
            if self.is_accept_node(node) {
                out.push(path.clone());
            }
            let range = self.nodes[node as usize].edges();
            for i in range.rev() {
                let mut next = path.clone();
                next.push(self.labels[i]);
                stack.push((self.targets[i], next));
            }
        }
        out
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            HEADER_LEN + self.nodes.len() * 8 + self.labels.len() + self.targets.len() * 4,
        );
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&self.word_count.to_le_bytes());
        out.extend_from_slice(&(self.nodes.len() as u32).to_le_bytes());
        out.extend_from_slice(&(self.labels.len() as u32).to_le_bytes());
        for node in &self.nodes {
            out.extend_from_slice(&node.first_edge.to_le_bytes());
            out.extend_from_slice(&node.meta.to_le_bytes());
        }
        out.extend_from_slice(&self.labels);
        for target in &self.targets {
            out.extend_from_slice(&target.to_le_bytes());
        }
        out
    }

    /// Decode and validate a serialized trie
    ///
    /// Rejects anything a lookup could trip over: out-of-range edges or
    /// targets, unsorted labels, back edges, shared children, and a word
    /// count that disagrees with the accepting nodes.
    pub fn deserialize(bytes: &[u8]) -> RuleInvResult<Self> {
        let mut reader = ByteReader::new(bytes);
        if reader.take(4)? != MAGIC {
            return Err(format_error("bad magic"));
        }
        let version = reader.u32()?;
        if version != VERSION {
            return Err(format_error(format!("unsupported version {}", version)));
        }
        let word_count = reader.u64()?;
        let node_count = reader.u32()? as usize;
        let edge_count = reader.u32()? as usize;

        if node_count == 0 {
            return Err(format_error("missing root node"));
        }
        if edge_count + 1 != node_count {
            return Err(format_error(format!(
                "{} nodes cannot be joined by {} edges",
                node_count, edge_count
            )));
        }
        let expected = node_count
            .checked_mul(8)
            .and_then(|n| n.checked_add(edge_count.checked_mul(5)?))
            .and_then(|n| n.checked_add(HEADER_LEN))
            .ok_or_else(|| format_error("size overflow"))?;
        if expected != bytes.len() {
            return Err(format_error(format!(
                "expected {} bytes, found {}",
                expected,
                bytes.len()
            )));
        }

        let mut nodes = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            let first_edge = reader.u32()?;
            let meta = reader.u32()?;
            nodes.push(PackedNode { first_edge, meta });
        }
        let labels = reader.take(edge_count)?.to_vec();
        let mut targets = Vec::with_capacity(edge_count);
        for _ in 0..edge_count {
            targets.push(reader.u32()?);
        }

        let mut has_parent = vec![false; node_count];
        let mut accepting = 0u64;
        for (id, node) in nodes.iter().enumerate() {
            let range = node.edges();
            if range.end > edge_count {
                return Err(format_error(format!("node {} edges out of range", id)));
            }
            let labels = &labels[range.clone()];
            if labels.windows(2).any(|w| w[0] >= w[1]) {
                return Err(format_error(format!("node {} labels not ascending", id)));
            }
            if let Some(bad) = targets[range]
                .iter()
                .find(|t| **t as usize <= id || **t as usize >= node_count)
            {
                return Err(format_error(format!("node {} has bad target {}", id, bad)));
            }
            for &target in &targets[node.edges()] {
                if std::mem::replace(&mut has_parent[target as usize], true) {
                    return Err(format_error(format!("node {} has two parents", target)));
                }
            }
            if node.is_accept() {
                if id == 0 {
                    return Err(format_error("root cannot accept the empty word"));
                }
                accepting += 1;
            }
        }
        if accepting != word_count {
            return Err(format_error(format!(
                "word count {} but {} accepting nodes",
                word_count, accepting
            )));
        }

        Ok(Self {
            nodes,
            labels,
            targets,
            word_count,
        })
    }

    pub fn save(&self, path: &Path) -> RuleInvResult<()> {
        fs::write(path, self.serialize()).map_err(|e| RuleInvError::io(path, e))
    }

    pub fn load(path: &Path) -> RuleInvResult<Self> {
        let bytes = fs::read(path).map_err(|e| RuleInvError::io(path, e))?;
        Self::deserialize(&bytes)
    }
}

fn format_error(message: impl Into<String>) -> RuleInvError {
    RuleInvError::TrieFormat(message.into())
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> RuleInvResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| format_error("unexpected end of data"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> RuleInvResult<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn u64(&mut self) -> RuleInvResult<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }
}
