use crate::trie::{ByteSet, FrozenTrie, TokenString, TrieBuilder};
use crate::RuleInvError;
use std::collections::BTreeSet;
use std::io::Cursor as IoCursor;

fn build(words: &[&str]) -> FrozenTrie {
    words.iter().copied().collect::<TrieBuilder>().into_frozen()
}

fn token(sets: &[&[u8]]) -> TokenString {
    TokenString::new(
        sets.iter()
            .map(|s| s.iter().copied().collect::<ByteSet>())
            .collect(),
    )
    .unwrap()
}

fn lookup_set(trie: &FrozenTrie, t: &TokenString) -> BTreeSet<Vec<u8>> {
    trie.lookup(t).collect()
}

#[test]
fn test_lookup_cat_car_bat() {
    let trie = build(&["cat", "car", "bat"]);

    let all = lookup_set(&trie, &token(&[b"bc", b"a", b"tr"]));
    let expected: BTreeSet<Vec<u8>> = [b"cat".to_vec(), b"car".to_vec(), b"bat".to_vec()]
        .into_iter()
        .collect();
    assert_eq!(all, expected);

    let one = lookup_set(&trie, &token(&[b"c", b"a", b"t"]));
    assert_eq!(one, [b"cat".to_vec()].into_iter().collect());

    assert!(trie.lookup(&token(&[b"z", b"a", b"t"])).next().is_none());
}

#[test]
fn test_lookup_length_discipline() {
    let trie = build(&["a", "ab"]);
    assert_eq!(trie.lookup_all(&token(&[b"a"])), vec![b"a".to_vec()]);
    assert_eq!(trie.lookup_all(&token(&[b"a", b"b"])), vec![b"ab".to_vec()]);
    assert!(trie.lookup_all(&token(&[b"a", b"b", b"c"])).is_empty());
}

#[test]
fn test_lookup_order_is_ascending() {
    let trie = build(&["bb", "ab", "ba", "aa", "b"]);
    let t = TokenString::parse("[ab][ab]").unwrap();
    assert_eq!(
        trie.lookup_all(&t),
        vec![b"aa".to_vec(), b"ab".to_vec(), b"ba".to_vec(), b"bb".to_vec()]
    );
    assert_eq!(trie.count_matches(&t), 4);
}

#[test]
fn test_empty_token_string_matches_nothing() {
    let trie = build(&["a"]);
    assert!(trie.lookup_all(&TokenString::default()).is_empty());
}

#[test]
fn test_builder_ignores_empty_and_duplicates() {
    let mut builder = TrieBuilder::new();
    assert!(!builder.insert(b""));
    assert!(builder.insert(b"pass"));
    assert!(!builder.insert(b"pass"));
    assert!(builder.insert(b"password"));
    assert_eq!(builder.len(), 2);
    assert!(builder.contains(b"pass"));
    assert!(!builder.contains(b"passw"));
    assert!(!builder.contains(b""));

    let trie = builder.into_frozen();
    assert_eq!(trie.word_count(), 2);
    assert!(trie.accepts(b"pass"));
    assert!(trie.accepts(b"password"));
    assert!(!trie.accepts(b"passwor"));
    assert!(!trie.accepts(b""));
}

#[test]
fn test_words_in_order() {
    let trie = build(&["b", "abc", "ab", "\u{e9}"]);
    assert_eq!(
        trie.words(),
        vec![
            b"ab".to_vec(),
            b"abc".to_vec(),
            b"b".to_vec(),
            "\u{e9}".as_bytes().to_vec(),
        ]
    );
}

#[test]
fn test_cursor_walk() {
    let trie = build(&["to", "tea"]);
    let mut cursor = trie.root();
    assert!(cursor.has_child(b't'));
    assert!(!cursor.has_child(b'x'));
    cursor.step(b't').unwrap();
    assert!(!cursor.is_accept());

    let mut branch = cursor;
    branch.step(b'o').unwrap();
    assert!(branch.is_accept());

    // The copy moved, the original did not
    assert!(cursor.has_child(b'e'));
    cursor.step(b'e').unwrap();
    cursor.step(b'a').unwrap();
    assert!(cursor.is_accept());
    assert_ne!(cursor.node_id(), branch.node_id());
}

#[test]
fn test_cursor_step_without_child() {
    let trie = build(&["ab"]);
    let mut cursor = trie.root();
    let before = cursor.node_id();
    let err = cursor.step(b'z').unwrap_err();
    assert!(matches!(err, RuleInvError::TrieLookupPrecondition { byte: b'z' }));
    assert_eq!(cursor.node_id(), before);
}

#[test]
fn test_freeze_round_trip() {
    let builder: TrieBuilder = ["cat", "car", "bat", "c", "zebra"].into_iter().collect();
    let (trie, bytes) = builder.freeze();
    let loaded = FrozenTrie::deserialize(&bytes).unwrap();
    assert_eq!(loaded, trie);
    for word in ["cat", "car", "bat", "c", "zebra"] {
        assert!(loaded.accepts(word.as_bytes()));
    }
    for word in ["ca", "cats", "b", "zebr", ""] {
        assert!(!loaded.accepts(word.as_bytes()));
    }
}

#[test]
fn test_empty_trie_round_trip() {
    let (trie, bytes) = TrieBuilder::new().freeze();
    assert!(trie.is_empty());
    let loaded = FrozenTrie::deserialize(&bytes).unwrap();
    assert_eq!(loaded.node_count(), 1);
    assert!(loaded.words().is_empty());
}

#[test]
fn test_bfs_numbering() {
    let trie = build(&["ab", "b"]);
    let mut cursor = trie.root();
    cursor.step(b'a').unwrap();
    assert_eq!(cursor.node_id(), 1);
    let mut other = trie.root();
    other.step(b'b').unwrap();
    assert_eq!(other.node_id(), 2);
    cursor.step(b'b').unwrap();
    assert_eq!(cursor.node_id(), 3);
}

#[test]
fn test_deserialize_rejects_corruption() {
    let (_, bytes) = ["cat", "car"]
        .into_iter()
        .collect::<TrieBuilder>()
        .freeze();

    let mut bad_magic = bytes.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        FrozenTrie::deserialize(&bad_magic),
        Err(RuleInvError::TrieFormat(_))
    ));

    let truncated = &bytes[..bytes.len() - 1];
    assert!(FrozenTrie::deserialize(truncated).is_err());

    let mut bad_version = bytes.clone();
    bad_version[4] = 9;
    assert!(FrozenTrie::deserialize(&bad_version).is_err());

    // Flip the accept bit of the root (node 0 meta, high byte)
    let mut bad_root = bytes.clone();
    bad_root[24 + 7] |= 0x80;
    assert!(FrozenTrie::deserialize(&bad_root).is_err());

    // Point the first edge back at the root
    let mut back_edge = bytes.clone();
    let target_start = bytes.len() - 4 * 4;
    back_edge[target_start..target_start + 4].copy_from_slice(&0u32.to_le_bytes());
    assert!(FrozenTrie::deserialize(&back_edge).is_err());

    assert!(FrozenTrie::deserialize(&[]).is_err());
}

#[test]
fn test_extend_from_reader_handles_crlf() {
    let mut builder = TrieBuilder::new();
    let added = builder
        .extend_from_reader(IoCursor::new(b"alpha\r\nbeta\n\ngamma".to_vec()))
        .unwrap();
    assert_eq!(added, 3);
    assert!(builder.contains(b"alpha"));
    assert!(builder.contains(b"gamma"));
    assert!(!builder.contains(b"alpha\r"));
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let wordlist = dir.path().join("words.txt");
    std::fs::write(&wordlist, "one\ntwo\nthree\n").unwrap();

    let trie = TrieBuilder::from_wordlist(&wordlist).unwrap().into_frozen();
    let path = dir.path().join("words.trie");
    trie.save(&path).unwrap();
    let loaded = FrozenTrie::load(&path).unwrap();
    assert_eq!(loaded.word_count(), 3);
    assert_eq!(
        loaded.lookup_all(&TokenString::parse("t?l?l").unwrap()),
        vec![b"two".to_vec()]
    );
    assert_eq!(
        loaded.lookup_all(&TokenString::parse("t?l?l?l?l").unwrap()),
        vec![b"three".to_vec()]
    );
}

#[test]
fn test_missing_wordlist_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TrieBuilder::from_wordlist(&dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, RuleInvError::Io { .. }));
}
