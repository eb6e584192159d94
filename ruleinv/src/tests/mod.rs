

// Analysis tests
mod analysis;

mod trie;
