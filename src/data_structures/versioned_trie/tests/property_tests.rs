// Copyright (c) 2025 Catalog Trie Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Property-based tests checking the trie against a sorted-map model.

use proptest::prelude::*;
use std::collections::BTreeMap;

use crate::data_structures::versioned_trie::TrieMap;

#[derive(Debug, Clone)]
enum Op {
    Insert(Vec<u8>, u32),
    Erase(Vec<u8>),
}

// Small alphabet and short keys so that prefixes collide often
fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 0..5)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (key_strategy(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => key_strategy().prop_map(Op::Erase),
    ]
}

type Model = BTreeMap<Vec<u8>, Vec<u32>>;

/// Applies an unpinned erase to the model: the latest version goes, and a
/// key with no descendants loses its whole history.
fn model_erase(model: &mut Model, key: &[u8]) -> bool {
    let Some(history) = model.get_mut(key) else {
        return false;
    };
    history.pop();
    let has_descendants = model
        .keys()
        .any(|k| k.len() > key.len() && k.starts_with(key));
    let emptied = model.get(key).map_or(true, Vec::is_empty);
    if !has_descendants || emptied {
        model.remove(key);
    }
    true
}

fn apply(trie: &mut TrieMap<u8, u32>, model: &mut Model, op: &Op) {
    match op {
        Op::Insert(k, v) => {
            trie.insert(k, *v);
            model.entry(k.clone()).or_default().push(*v);
        }
        Op::Erase(k) => {
            let expected = model_erase(model, k);
            assert_eq!(trie.erase(k), expected);
        }
    }
}

proptest! {
    // Property: after any sequence of inserts and erases, lookups, histories
    // and iteration agree with the model
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut trie = TrieMap::new();
        let mut model = Model::new();
        for op in &ops {
            apply(&mut trie, &mut model, op);
        }

        let expected_len: usize = model.values().map(Vec::len).sum();
        prop_assert_eq!(trie.len(), expected_len);
        prop_assert_eq!(trie.key_count(), model.len());

        for (k, history) in &model {
            prop_assert_eq!(trie.get(k), history.last());
            let recorded: Vec<u32> = trie
                .history(k)
                .unwrap()
                .iter()
                .map(|e| *e.value())
                .collect();
            prop_assert_eq!(&recorded, history);
        }

        let iterated: Vec<(Vec<u8>, u32)> = trie.iter().map(|(k, v)| (k, *v)).collect();
        let modelled: Vec<(Vec<u8>, u32)> = model
            .iter()
            .filter_map(|(k, h)| h.last().map(|v| (k.clone(), *v)))
            .collect();
        prop_assert_eq!(iterated, modelled);
    }

    // Property: erase never leaves a childless, valueless, unpinned node behind
    #[test]
    fn prop_no_dangling_path_nodes(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut trie = TrieMap::new();
        let mut model = Model::new();
        for op in &ops {
            apply(&mut trie, &mut model, op);
        }
        prop_assert_eq!(trie.compact(), 0);
    }

    // Property: version ids strictly increase in every history
    #[test]
    fn prop_histories_are_ordered(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut trie = TrieMap::new();
        let mut model = Model::new();
        for op in &ops {
            apply(&mut trie, &mut model, op);
        }
        for k in model.keys() {
            let history = trie.history(k).unwrap();
            prop_assert!(history.windows(2).all(|w| w[0].version() < w[1].version()));
        }
    }

    // Property: the longest match is the longest stored prefix of the key
    #[test]
    fn prop_longest_match_is_longest_stored_prefix(
        keys in prop::collection::vec(key_strategy(), 0..20),
        probe in key_strategy(),
    ) {
        let trie: TrieMap<u8, usize> = keys.iter().enumerate().map(|(i, k)| (k.clone(), i)).collect();
        let expected = (0..=probe.len())
            .rev()
            .find(|n| keys.iter().any(|k| k.as_slice() == &probe[..*n]));

        let m = trie.longest_match(&probe);
        match expected {
            Some(n) => {
                prop_assert!(m.is_value_match());
                prop_assert_eq!(m.consumed(), n);
                prop_assert_eq!(m.key(), probe[..n].to_vec());
            }
            None => prop_assert!(!m.is_value_match()),
        }
    }

    // Property: walking with cursors visits the same elements as the iterator
    #[test]
    fn prop_cursor_walk_matches_iter(keys in prop::collection::vec(key_strategy(), 0..20)) {
        let trie: TrieMap<u8, usize> = keys.iter().enumerate().map(|(i, k)| (k.clone(), i)).collect();
        let mut walked = Vec::new();
        let mut cursor = trie.begin();
        while !cursor.is_end() {
            let (k, v) = trie.get_at(&cursor).unwrap();
            walked.push((k, *v));
            trie.advance(&mut cursor).unwrap();
        }
        let iterated: Vec<(Vec<u8>, usize)> = trie.iter().map(|(k, v)| (k, *v)).collect();
        prop_assert_eq!(walked, iterated);
    }
}
