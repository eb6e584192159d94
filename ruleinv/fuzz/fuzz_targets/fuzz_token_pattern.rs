#![no_main]

use libfuzzer_sys::fuzz_target;
use ruleinv::{TokenString, TrieBuilder};

fuzz_target!(|data: &[u8]| {
    if let Ok(pattern) = std::str::from_utf8(data) {
        if let Ok(tokens) = TokenString::parse(pattern) {
            let trie = ["password", "letmein", "dragon"]
                .into_iter()
                .collect::<TrieBuilder>()
                .into_frozen();
            for word in trie.lookup(&tokens) {
                assert!(tokens.matches(&word));
            }
        }
    }
});
