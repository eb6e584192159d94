use proptest::prelude::*;
use ruleinv::classifier::{fold_invertibility, verdict};
use ruleinv::{
    classify, parse_rule, ByteSet, CharClass, FrozenTrie, ManglingRule, PrimitiveKind,
    TokenString, TrieBuilder,
};
use std::collections::BTreeSet;

const ALPHABET: &[u8] = b"abcd";

fn word() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(ALPHABET.to_vec()), 0..6)
}

fn wordlist() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(word(), 0..40)
}

fn token_string() -> impl Strategy<Value = TokenString> {
    prop::collection::vec(
        prop::collection::btree_set(prop::sample::select(ALPHABET.to_vec()), 1..4),
        0..6,
    )
    .prop_map(|sets| {
        let sets = sets
            .into_iter()
            .map(|s| s.into_iter().collect::<ByteSet>())
            .collect();
        TokenString::new(sets).unwrap()
    })
}

fn build(words: &[Vec<u8>]) -> FrozenTrie {
    words.iter().map(Vec::as_slice).collect::<TrieBuilder>().into_frozen()
}

fn primitive() -> impl Strategy<Value = PrimitiveKind> {
    let vowels = CharClass::from_code('v').unwrap();
    let digits = CharClass::from_code('D').unwrap();
    prop::sample::select(vec![
        PrimitiveKind::Noop,
        PrimitiveKind::Lowercase,
        PrimitiveKind::Capitalize,
        PrimitiveKind::Reverse,
        PrimitiveKind::Append(b'1'),
        PrimitiveKind::Prepend(b'\\'),
        PrimitiveKind::ToggleAt(12),
        PrimitiveKind::Extract(0, 3),
        PrimitiveKind::Extract(2, 3),
        PrimitiveKind::Truncate(6),
        PrimitiveKind::Replace(b'a', 0x80),
        PrimitiveKind::Purge(b'e'),
        PrimitiveKind::Memorize,
        PrimitiveKind::AppendMemory,
        PrimitiveKind::InsertMemory(0, 2, 1),
        PrimitiveKind::RejectLess(8),
        PrimitiveKind::RejectContains(b'z'),
        PrimitiveKind::RejectEqualsMemory,
        PrimitiveKind::ShiftCase,
        PrimitiveKind::PastTense,
        PrimitiveKind::ReplaceClass(vowels, b'*'),
        PrimitiveKind::PurgeClass(digits),
        PrimitiveKind::RejectUnlessAtClass(1, vowels),
    ])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_trie_round_trip(words in wordlist(), probes in prop::collection::vec(word(), 0..20)) {
        let (_, bytes) = words.iter().map(Vec::as_slice).collect::<TrieBuilder>().freeze();
        let loaded = FrozenTrie::deserialize(&bytes).unwrap();
        let stored: BTreeSet<&Vec<u8>> = words.iter().filter(|w| !w.is_empty()).collect();

        prop_assert_eq!(loaded.word_count() as usize, stored.len());
        for probe in words.iter().chain(probes.iter()) {
            prop_assert_eq!(loaded.accepts(probe), stored.contains(probe));
        }
    }

    #[test]
    fn prop_lookup_is_sound(words in wordlist(), pattern in token_string()) {
        let trie = build(&words);
        for found in trie.lookup(&pattern) {
            prop_assert!(trie.accepts(&found));
            prop_assert!(pattern.matches(&found));
        }
    }

    #[test]
    fn prop_lookup_is_complete(words in wordlist(), pattern in token_string()) {
        let trie = build(&words);
        let found = trie.lookup_all(&pattern);
        let expected: BTreeSet<Vec<u8>> = words
            .iter()
            .filter(|w| !w.is_empty() && pattern.matches(w))
            .cloned()
            .collect();

        // Each match exactly once, in ascending order
        prop_assert_eq!(found.len(), expected.len());
        prop_assert_eq!(found, expected.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn prop_fold_is_monotone(
        prefix in prop::collection::vec(primitive(), 0..6),
        next in primitive(),
        enable_regex in any::<bool>(),
    ) {
        let before = fold_invertibility(&prefix, enable_regex).unwrap();
        let step = verdict(&next, enable_regex).unwrap();
        let after = fold_invertibility(prefix.iter().chain(std::iter::once(&next)), enable_regex).unwrap();
        prop_assert_eq!(after, before.min(step));
        prop_assert!(after <= before);
    }

    #[test]
    fn prop_classifier_is_pure(
        kinds in prop::collection::vec(primitive(), 0..6),
        other in prop::collection::vec(primitive(), 0..6),
        enable_regex in any::<bool>(),
    ) {
        let rule = ManglingRule::from_kinds(0, kinds);
        let first = classify(&rule, enable_regex).unwrap();
        let _ = classify(&ManglingRule::from_kinds(1, other), !enable_regex).unwrap();
        prop_assert_eq!(first, classify(&rule, enable_regex).unwrap());
    }

    #[test]
    fn prop_normalized_form_reparses(kinds in prop::collection::vec(primitive(), 0..6)) {
        let rule = ManglingRule::from_kinds(3, kinds.clone());
        let reparsed = parse_rule(&rule.normalized(), 3).unwrap();
        let reparsed_kinds: Vec<PrimitiveKind> = reparsed.kinds().cloned().collect();
        prop_assert_eq!(reparsed_kinds, kinds);
    }
}
