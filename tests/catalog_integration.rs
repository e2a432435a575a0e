// Copyright (c) 2025 Catalog Trie Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Integration tests for the versioned trie and the catalog built on it.
//! Exercises the public API only: cursor pinning across erase, history
//! retention and concurrent catalog access.

use std::sync::{Arc, Barrier};
use std::thread;

use catalog_trie_lib::catalog::replay::{parse_script, replay};
use catalog_trie_lib::catalog::Catalog;
use catalog_trie_lib::config::{CatalogConfig, ConfigLoader};
use catalog_trie_lib::data_structures::versioned_trie::{TrieError, TrieMap};
use catalog_trie_lib::error::CatalogError;

fn key(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

#[test]
fn test_scan_while_erasing() {
    let mut trie: TrieMap<String, u32> = TrieMap::new();
    for (i, path) in ["a", "a.x", "a.y", "b", "b.z", "c"].iter().enumerate() {
        trie.insert(&key(path), i as u32);
    }

    // erase every other element during a cursor walk
    let mut cursor = trie.begin();
    let mut kept = Vec::new();
    let mut erase = false;
    while !cursor.is_end() {
        if erase {
            cursor = trie.erase_at(cursor).unwrap();
        } else {
            kept.push(trie.get_at(&cursor).unwrap().0.join("."));
            trie.advance(&mut cursor).unwrap();
        }
        erase = !erase;
    }

    assert_eq!(kept, vec!["a", "a.y", "b.z"]);
    let remaining: Vec<String> = trie.iter().map(|(k, _)| k.join(".")).collect();
    assert_eq!(remaining, kept);
    assert_eq!(trie.len(), 3);
}

#[test]
fn test_cursor_outlives_erase_of_its_key() {
    let mut trie: TrieMap<String, &str> = TrieMap::new();
    trie.insert(&key("sales.orders.amount"), "int");
    let cursor = trie.find(&key("sales.orders.amount")).unwrap();

    let next = trie.erase_at(cursor.clone()).unwrap();
    assert!(next.is_end());
    assert!(!trie.contains_key(&key("sales.orders.amount")));

    let (k, v) = trie.get_at(&cursor).unwrap();
    assert_eq!(k, key("sales.orders.amount"));
    assert_eq!(*v, "int");

    drop(cursor);
    assert_eq!(trie.compact(), 4);
    assert!(trie.is_empty());
}

#[test]
fn test_cursor_errors_convert_to_catalog_error() {
    let trie: TrieMap<String, u8> = TrieMap::new();
    let other: TrieMap<String, u8> = TrieMap::new();

    let result: Result<(), CatalogError> = (|| {
        other.get_at(&trie.end())?;
        Ok(())
    })();
    assert!(matches!(
        result,
        Err(CatalogError::Trie(TrieError::ForeignCursor { .. }))
    ));
}

#[test]
fn test_concurrent_readers_and_writers() {
    let catalog = Arc::new(Catalog::<u64>::new());
    let barrier = Arc::new(Barrier::new(6));

    let mut handles = Vec::new();
    for writer in 0..3u64 {
        let catalog = Arc::clone(&catalog);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..100 {
                catalog.insert(&format!("ns{writer}.col"), i).unwrap();
            }
        }));
    }
    for _ in 0..3 {
        let catalog = Arc::clone(&catalog);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..100 {
                for (_, history) in ["ns0.col", "ns1.col", "ns2.col"]
                    .iter()
                    .map(|p| (p, catalog.history(p).unwrap()))
                {
                    // each writer appends increasing values to its own column
                    assert!(history.windows(2).all(|w| w[0].value < w[1].value));
                }
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(catalog.len(), 300);
    assert_eq!(catalog.get("ns1.col").unwrap(), Some(99));
}

#[test]
fn test_replay_with_loaded_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("catalog.toml");
    std::fs::write(&config_path, "[catalog]\npath_separator = \"/\"\n").unwrap();

    let config: CatalogConfig = ConfigLoader::new(Some(&config_path), "IT_REPLAY")
        .load()
        .unwrap();
    let catalog = Catalog::with_settings(&config.catalog);

    let ops = parse_script(
        r#"[
            { "op": "insert", "path": "Users", "value": "array" },
            { "op": "insert", "path": "Users/0", "value": "object" },
            { "op": "insert", "path": "Users/0/Name", "value": "string" },
            { "op": "erase", "path": "users/0" }
        ]"#,
    )
    .unwrap();
    let report = replay(&catalog, &ops).unwrap();

    let paths: Vec<&str> = report.entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["users", "users/0/name"]);
    assert!(!catalog.is_path_valid("users/0/name").unwrap());
}
