use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::common::config::{PageId, INVALID_PAGE_ID};
use crate::storage::index::comparator::KeyComparator;
use crate::storage::index::key::{IndexKey, IndexValue};

use super::b_plus_tree_page::{BPlusTreePageHeader, BPlusTreePageKind, PAGE_HEADER_SIZE};

/// Bytes after the common header: the `next_leaf` pointer used to chain
/// leaves left-to-right for range scans.
const NEXT_LEAF_LEN: usize = 8;
const LEAF_HEADER_SIZE: usize = PAGE_HEADER_SIZE + NEXT_LEAF_LEN;

/// View over a leaf node's bytes: `size` `(key, value)` pairs in sorted order,
/// plus the id of the next leaf in key order (or `INVALID_PAGE_ID` for the
/// rightmost leaf).
pub struct BPlusTreeLeafPage<K, V> {
    _marker: PhantomData<(K, V)>,
}

impl<K: IndexKey, V: IndexValue> BPlusTreeLeafPage<K, V> {
    /// Largest `max_size` that still fits every slot in one
    /// `BUSTUB_PAGE_SIZE` frame, used to pick a default when a caller doesn't
    /// supply one.
    pub fn max_capacity(page_size: usize) -> usize {
        (page_size - LEAF_HEADER_SIZE) / Self::slot_len()
    }

    fn slot_len() -> usize {
        K::ENCODED_LEN + V::ENCODED_LEN
    }

    fn slot_offset(i: usize) -> usize {
        LEAF_HEADER_SIZE + i * Self::slot_len()
    }

    pub fn init(data: &mut [u8], max_size: usize) {
        BPlusTreePageHeader {
            kind: BPlusTreePageKind::Leaf,
            size: 0,
            max_size,
        }
        .write(data);
        Self::set_next_page_id(data, INVALID_PAGE_ID);
    }

    pub fn size(data: &[u8]) -> usize {
        BPlusTreePageHeader::read(data).size
    }

    pub fn max_size(data: &[u8]) -> usize {
        BPlusTreePageHeader::read(data).max_size
    }

    pub fn min_size(data: &[u8]) -> usize {
        Self::max_size(data) / 2
    }

    pub fn is_full(data: &[u8]) -> bool {
        Self::size(data) >= Self::max_size(data)
    }

    fn set_size(data: &mut [u8], size: usize) {
        let mut header = BPlusTreePageHeader::read(data);
        header.size = size;
        header.write(data);
    }

    /// Drop every slot from `new_size` onward without touching their bytes.
    pub fn truncate(data: &mut [u8], new_size: usize) {
        Self::set_size(data, new_size);
    }

    pub fn next_page_id(data: &[u8]) -> PageId {
        PageId::from_le_bytes(data[PAGE_HEADER_SIZE..LEAF_HEADER_SIZE].try_into().unwrap())
    }

    pub fn set_next_page_id(data: &mut [u8], id: PageId) {
        data[PAGE_HEADER_SIZE..LEAF_HEADER_SIZE].copy_from_slice(&id.to_le_bytes());
    }

    pub fn key_at(data: &[u8], i: usize) -> K {
        let off = Self::slot_offset(i);
        K::decode(&data[off..off + K::ENCODED_LEN])
    }

    fn set_key_at(data: &mut [u8], i: usize, key: &K) {
        let off = Self::slot_offset(i);
        key.encode(&mut data[off..off + K::ENCODED_LEN]);
    }

    pub fn value_at(data: &[u8], i: usize) -> V {
        let off = Self::slot_offset(i) + K::ENCODED_LEN;
        V::decode(&data[off..off + V::ENCODED_LEN])
    }

    fn set_value_at(data: &mut [u8], i: usize, value: &V) {
        let off = Self::slot_offset(i) + K::ENCODED_LEN;
        value.encode(&mut data[off..off + V::ENCODED_LEN]);
    }

    /// Greatest `i` with `key_at(i) <= key`, or `None` if `key` is smaller
    /// than every key present.
    pub fn find(data: &[u8], key: &K, cmp: &impl KeyComparator<K>) -> Option<usize> {
        let size = Self::size(data);
        if size == 0 {
            return None;
        }
        let mut lo = 0usize;
        let mut hi = size;
        let mut result = None;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let mid_key = Self::key_at(data, mid);
            if cmp.compare(&mid_key, key) != Ordering::Greater {
                result = Some(mid);
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        result
    }

    /// Insert `(key, value)` in sorted position. Returns `false` without
    /// mutating anything if `key` is already present.
    pub fn insert(data: &mut [u8], key: &K, value: &V, cmp: &impl KeyComparator<K>) -> bool {
        let size = Self::size(data);
        let mut i = 0usize;
        while i < size {
            match cmp.compare(&Self::key_at(data, i), key) {
                Ordering::Less => i += 1,
                Ordering::Equal => return false,
                Ordering::Greater => break,
            }
        }
        for j in (i..size).rev() {
            let k = Self::key_at(data, j);
            let v = Self::value_at(data, j);
            Self::set_key_at(data, j + 1, &k);
            Self::set_value_at(data, j + 1, &v);
        }
        Self::set_key_at(data, i, key);
        Self::set_value_at(data, i, value);
        Self::set_size(data, size + 1);
        true
    }

    /// Remove `key` if present. Returns whether anything was removed.
    pub fn remove(data: &mut [u8], key: &K, cmp: &impl KeyComparator<K>) -> bool {
        let size = Self::size(data);
        let i = match (0..size).find(|&i| cmp.compare(&Self::key_at(data, i), key) == Ordering::Equal) {
            Some(i) => i,
            None => return false,
        };
        for j in i..size - 1 {
            let k = Self::key_at(data, j + 1);
            let v = Self::value_at(data, j + 1);
            Self::set_key_at(data, j, &k);
            Self::set_value_at(data, j, &v);
        }
        Self::set_size(data, size - 1);
        true
    }
}
