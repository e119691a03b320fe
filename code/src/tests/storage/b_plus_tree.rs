use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::buffer::BufferPoolManager;
use crate::common::config::LRUK_REPLACER_K;
use crate::storage::disk::MemoryDiskManager;
use crate::storage::index::comparator::Int64Comparator;
use crate::storage::index::key::{Int64Key, Rid};
use crate::storage::index::BPlusTree;

type TestTree = BPlusTree<Int64Key, Rid, Int64Comparator>;

fn new_tree(pool_size: usize, leaf_max: usize, internal_max: usize) -> TestTree {
    let bpm = BufferPoolManager::new(pool_size, Arc::new(MemoryDiskManager::new()), LRUK_REPLACER_K);
    let header_page_id = bpm.new_page_guarded().expect("pool has room for header").page_id();
    BPlusTree::new(bpm, header_page_id, Int64Comparator, leaf_max, internal_max)
}

fn rid(k: i64) -> Rid {
    Rid::new(k, 0)
}

#[test]
fn empty_tree_has_no_root_and_no_values() {
    let tree = new_tree(16, 4, 4);
    assert!(tree.is_empty());
    assert_eq!(tree.get_value(&Int64Key(1)), None);
}

#[test]
fn insert_then_lookup_single_key() {
    let tree = new_tree(16, 4, 4);
    assert!(tree.insert(&Int64Key(42), &rid(42)));
    assert!(!tree.is_empty());
    assert_eq!(tree.get_value(&Int64Key(42)), Some(rid(42)));
    assert_eq!(tree.get_value(&Int64Key(7)), None);
}

#[test]
fn duplicate_insert_is_rejected() {
    let tree = new_tree(16, 4, 4);
    assert!(tree.insert(&Int64Key(1), &rid(1)));
    assert!(!tree.insert(&Int64Key(1), &rid(99)));
    assert_eq!(tree.get_value(&Int64Key(1)), Some(rid(1)));
}

#[test]
fn inserts_beyond_one_leaf_trigger_splits_and_stay_lookupable() {
    let tree = new_tree(64, 4, 4);
    for k in 0..50 {
        assert!(tree.insert(&Int64Key(k), &rid(k)));
    }
    assert_ne!(tree.get_root_page_id(), crate::common::config::INVALID_PAGE_ID);
    for k in 0..50 {
        assert_eq!(tree.get_value(&Int64Key(k)), Some(rid(k)), "key {k} missing after splits");
    }
}

#[test]
fn iterator_walks_keys_in_sorted_order() {
    let tree = new_tree(64, 4, 4);
    let mut keys: Vec<i64> = (0..40).collect();
    keys.shuffle(&mut rand::thread_rng());
    for &k in &keys {
        tree.insert(&Int64Key(k), &rid(k));
    }
    let collected: Vec<i64> = tree.begin().map(|(k, _)| k.0).collect();
    let expected: Vec<i64> = (0..40).collect();
    assert_eq!(collected, expected);
}

#[test]
fn begin_at_skips_to_first_key_not_less_than_target() {
    let tree = new_tree(64, 4, 4);
    for k in (0..50).step_by(2) {
        tree.insert(&Int64Key(k), &rid(k));
    }
    let collected: Vec<i64> = tree.begin_at(&Int64Key(25)).map(|(k, _)| k.0).collect();
    assert_eq!(collected.first(), Some(&26));
}

#[test]
fn delete_removes_key_and_is_idempotent_false_on_retry() {
    let tree = new_tree(16, 4, 4);
    tree.insert(&Int64Key(5), &rid(5));
    assert!(tree.remove(&Int64Key(5)));
    assert_eq!(tree.get_value(&Int64Key(5)), None);
    assert!(!tree.remove(&Int64Key(5)));
    assert!(tree.is_empty());
}

#[test]
fn delete_with_merges_keeps_remaining_keys_intact() {
    let tree = new_tree(64, 4, 4);
    for k in 0..60 {
        tree.insert(&Int64Key(k), &rid(k));
    }
    for k in (0..60).step_by(2) {
        assert!(tree.remove(&Int64Key(k)));
    }
    for k in 0..60 {
        let expect_present = k % 2 == 1;
        assert_eq!(tree.get_value(&Int64Key(k)).is_some(), expect_present, "key {k}");
    }
    let collected: Vec<i64> = tree.begin().map(|(k, _)| k.0).collect();
    let expected: Vec<i64> = (0..60).filter(|k| k % 2 == 1).collect();
    assert_eq!(collected, expected);
}

#[test]
fn stress_random_inserts_and_deletes_match_a_reference_map() {
    let tree = new_tree(64, 4, 4);
    let mut reference: BTreeMap<i64, Rid> = BTreeMap::new();
    let mut rng = rand::thread_rng();

    for _ in 0..500 {
        let key = rng.gen_range(0..200);
        if rng.gen_bool(0.6) {
            let inserted = tree.insert(&Int64Key(key), &rid(key));
            assert_eq!(inserted, !reference.contains_key(&key));
            reference.entry(key).or_insert_with(|| rid(key));
        } else {
            let removed = tree.remove(&Int64Key(key));
            assert_eq!(removed, reference.remove(&key).is_some());
        }
    }

    for key in 0..200 {
        assert_eq!(tree.get_value(&Int64Key(key)), reference.get(&key).copied(), "key {key}");
    }
    let collected: Vec<i64> = tree.begin().map(|(k, _)| k.0).collect();
    let expected: Vec<i64> = reference.keys().copied().collect();
    assert_eq!(collected, expected);
}
