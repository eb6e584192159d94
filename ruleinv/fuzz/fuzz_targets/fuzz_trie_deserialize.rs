#![no_main]

use libfuzzer_sys::fuzz_target;
use ruleinv::{FrozenTrie, TokenString};

fuzz_target!(|data: &[u8]| {
    if let Ok(trie) = FrozenTrie::deserialize(data) {
        // A trie that passed validation must be safe to walk
        let _ = trie.words();
        if let Ok(pattern) = TokenString::parse("?b?b?b") {
            let _ = trie.count_matches(&pattern);
        }
        assert_eq!(FrozenTrie::deserialize(&trie.serialize()).ok(), Some(trie));
    }
});
