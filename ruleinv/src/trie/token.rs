//! Byte sets and token strings
//!
//! A token string is an ordered sequence of byte sets; it describes the
//! family of words whose i-th byte lies in the i-th set.

use crate::{RuleInvError, RuleInvResult};
use std::fmt;

/// A set of bytes stored as a 256-bit bitmap
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteSet {
    bits: [u64; 4],
}

impl ByteSet {
    pub const fn empty() -> Self {
        Self { bits: [0; 4] }
    }

    pub const fn full() -> Self {
        Self {
            bits: [u64::MAX; 4],
        }
    }

    pub fn single(byte: u8) -> Self {
        let mut set = Self::empty();
        set.insert(byte);
        set
    }

    pub fn from_range(lo: u8, hi: u8) -> Self {
        let mut set = Self::empty();
        for b in lo..=hi {
            set.insert(b);
        }
        set
    }

    pub fn insert(&mut self, byte: u8) {
        self.bits[(byte >> 6) as usize] |= 1u64 << (byte & 63);
    }

    pub fn remove(&mut self, byte: u8) {
        self.bits[(byte >> 6) as usize] &= !(1u64 << (byte & 63));
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.bits[(byte >> 6) as usize] & (1u64 << (byte & 63)) != 0
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    pub fn union(&self, other: &ByteSet) -> ByteSet {
        let mut bits = self.bits;
        for (w, o) in bits.iter_mut().zip(other.bits.iter()) {
            *w |= o;
        }
        ByteSet { bits }
    }

    pub fn complement(&self) -> ByteSet {
        ByteSet {
            bits: self.bits.map(|w| !w),
        }
    }

    /// Members in ascending order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = u8> + '_ {
        (0..=255u8).filter(move |b| self.contains(*b))
    }
}

impl FromIterator<u8> for ByteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = ByteSet::empty();
        for b in iter {
            set.insert(b);
        }
        set
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|b| std::ascii::escape_default(b).to_string()))
            .finish()
    }
}

/// An ordered sequence of non-empty byte sets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TokenString {
    sets: Vec<ByteSet>,
}

impl TokenString {
    /// Build a token string, rejecting empty positions
    pub fn new(sets: Vec<ByteSet>) -> RuleInvResult<Self> {
        if let Some(position) = sets.iter().position(ByteSet::is_empty) {
            return Err(RuleInvError::EmptyTokenSet { position });
        }
        Ok(Self { sets })
    }

    /// Token string matching exactly one word
    pub fn literal(word: &[u8]) -> Self {
        Self {
            sets: word.iter().map(|b| ByteSet::single(*b)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn sets(&self) -> &[ByteSet] {
        &self.sets
    }

    pub fn get(&self, position: usize) -> Option<&ByteSet> {
        self.sets.get(position)
    }

    /// Whether a word has the right length and every byte in its set
    pub fn matches(&self, word: &[u8]) -> bool {
        word.len() == self.sets.len()
            && word
                .iter()
                .zip(self.sets.iter())
                .all(|(b, set)| set.contains(*b))
    }

    /// Parse a token pattern
    ///
    /// One token per position, in hashcat mask style:
    /// ```text
    /// abc         three literal bytes
    /// [bc]a[tr]   bracket sets; ranges like [a-z]; [^...] negates
    /// ?l?u?d?s    lower, upper, digit, symbol (also ?a ?h ?H ?b)
    /// ??  \?  \[  literal '?' and '['
    /// \x41        byte by hex value
    /// ```
    pub fn parse(pattern: &str) -> RuleInvResult<Self> {
        TokenPatternParser::new(pattern).parse()
    }
}

/// Hashcat mask charset for `?c`
fn mask_charset(code: u8) -> Option<ByteSet> {
    let lower = ByteSet::from_range(b'a', b'z');
    let upper = ByteSet::from_range(b'A', b'Z');
    let digits = ByteSet::from_range(b'0', b'9');
    let symbols: ByteSet = (0x20..=0x7eu8)
        .filter(|b| !b.is_ascii_alphanumeric())
        .collect();
    let set = match code {
        b'l' => lower,
        b'u' => upper,
        b'd' => digits,
        b'h' => digits.union(&ByteSet::from_range(b'a', b'f')),
        b'H' => digits.union(&ByteSet::from_range(b'A', b'F')),
        b's' => symbols,
        b'a' => lower.union(&upper).union(&digits).union(&symbols),
        b'b' => ByteSet::full(),
        _ => return None,
    };
    Some(set)
}

struct TokenPatternParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> TokenPatternParser<'a> {
    fn new(pattern: &'a str) -> Self {
        Self {
            bytes: pattern.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> RuleInvError {
        RuleInvError::TokenPattern {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn parse(mut self) -> RuleInvResult<TokenString> {
        let mut sets = Vec::new();
        while let Some(b) = self.bump() {
            let set = match b {
                b'[' => self.bracket()?,
                b'?' => self.mask()?,
                b'\\' => ByteSet::single(self.escape()?),
                other => ByteSet::single(other),
            };
            sets.push(set);
        }
        TokenString::new(sets)
    }

    fn mask(&mut self) -> RuleInvResult<ByteSet> {
        match self.bump() {
            Some(b'?') => Ok(ByteSet::single(b'?')),
            Some(code) => mask_charset(code)
                .ok_or_else(|| self.error(format!("unknown charset ?{}", code as char))),
            None => Err(self.error("pattern ends after '?'")),
        }
    }

    fn escape(&mut self) -> RuleInvResult<u8> {
        match self.bump() {
            Some(b'x') => {
                let hi = self.bump();
                let lo = self.bump();
                match (hi, lo) {
                    (Some(hi), Some(lo)) => std::str::from_utf8(&[hi, lo])
                        .ok()
                        .and_then(|s| u8::from_str_radix(s, 16).ok())
                        .ok_or_else(|| self.error("invalid \\x escape")),
                    _ => Err(self.error("\\x needs two hex digits")),
                }
            }
            Some(b) => Ok(b),
            None => Err(self.error("pattern ends after '\\'")),
        }
    }

    fn bracket(&mut self) -> RuleInvResult<ByteSet> {
        let mut set = ByteSet::empty();
        let negated = self.peek() == Some(b'^');
        if negated {
            self.pos += 1;
        }
        loop {
            let lo = match self.bump() {
                None => return Err(self.error("unterminated '['")),
                Some(b']') => break,
                Some(b'\\') => self.escape()?,
                Some(b) => b,
            };
            let is_range = self.peek() == Some(b'-')
                && self.bytes.get(self.pos + 1).is_some_and(|b| *b != b']');
            if is_range {
                self.pos += 1;
                let hi = match self.bump() {
                    Some(b'\\') => self.escape()?,
                    Some(b) => b,
                    None => return Err(self.error("unterminated range")),
                };
                if hi < lo {
                    return Err(self.error("range bounds are reversed"));
                }
                set = set.union(&ByteSet::from_range(lo, hi));
            } else {
                set.insert(lo);
            }
        }
        Ok(if negated { set.complement() } else { set })
    }
}
