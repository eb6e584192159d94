//! Wordlist trie and char-set candidate enumeration
//!
//! A wordlist is loaded into a [`TrieBuilder`], frozen into a packed
//! [`FrozenTrie`], and queried with a [`TokenString`]: the lookup returns
//! every stored word whose bytes fall in the corresponding sets.

mod builder;
mod cursor;
mod frozen;
mod lookup;
mod token;

pub use builder::TrieBuilder;
pub use cursor::Cursor;
pub use frozen::{FrozenTrie, PackedNode};
pub use lookup::Matches;
pub use token::{ByteSet, TokenString};
