use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::common::config::PageId;
use crate::storage::index::comparator::KeyComparator;
use crate::storage::index::key::IndexKey;

use super::b_plus_tree_page::{BPlusTreePageHeader, BPlusTreePageKind, PAGE_HEADER_SIZE};

/// View over an internal node's bytes: `size` pairs of `(key, child page id)`,
/// where slot 0's key is a sentinel (never compared, never read) and
/// `value_at(0)` is the leftmost child. This mirrors the course's
/// `B_PLUS_TREE_INTERNAL_PAGE` layout so `BinaryFind` translates directly.
pub struct BPlusTreeInternalPage<K> {
    _marker: PhantomData<K>,
}

impl<K: IndexKey> BPlusTreeInternalPage<K> {
    const CHILD_LEN: usize = 8;

    /// Largest `max_size` that still fits every slot in one
    /// `BUSTUB_PAGE_SIZE` frame, used to pick a default when a caller doesn't
    /// supply one.
    pub fn max_capacity(page_size: usize) -> usize {
        (page_size - PAGE_HEADER_SIZE) / Self::slot_len()
    }

    fn slot_len() -> usize {
        K::ENCODED_LEN + Self::CHILD_LEN
    }

    fn slot_offset(i: usize) -> usize {
        PAGE_HEADER_SIZE + i * Self::slot_len()
    }

    pub fn init(data: &mut [u8], max_size: usize) {
        BPlusTreePageHeader {
            kind: BPlusTreePageKind::Internal,
            size: 1,
            max_size,
        }
        .write(data);
        Self::set_value_at(data, 0, crate::common::config::INVALID_PAGE_ID);
    }

    pub fn size(data: &[u8]) -> usize {
        BPlusTreePageHeader::read(data).size
    }

    pub fn max_size(data: &[u8]) -> usize {
        BPlusTreePageHeader::read(data).max_size
    }

    pub fn min_size(data: &[u8]) -> usize {
        Self::max_size(data).div_ceil(2)
    }

    pub fn is_full(data: &[u8]) -> bool {
        Self::size(data) > Self::max_size(data)
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

    pub fn key_at(data: &[u8], i: usize) -> K {
        let off = Self::slot_offset(i);
        K::decode(&data[off..off + K::ENCODED_LEN])
    }

    pub fn set_key_at(data: &mut [u8], i: usize, key: &K) {
        let off = Self::slot_offset(i);
        key.encode(&mut data[off..off + K::ENCODED_LEN]);
    }

    pub fn value_at(data: &[u8], i: usize) -> PageId {
        let off = Self::slot_offset(i) + K::ENCODED_LEN;
        PageId::from_le_bytes(data[off..off + Self::CHILD_LEN].try_into().unwrap())
    }

    pub fn set_value_at(data: &mut [u8], i: usize, value: PageId) {
        let off = Self::slot_offset(i) + K::ENCODED_LEN;
        data[off..off + Self::CHILD_LEN].copy_from_slice(&value.to_le_bytes());
    }

    /// Greatest `i >= 1` with `key_at(i) <= key`, or `0` if none (go left).
    pub fn lookup(data: &[u8], key: &K, cmp: &impl KeyComparator<K>) -> PageId {
        let size = Self::size(data);
        let mut lo = 1usize;
        let mut hi = size;
        let mut result = 0usize;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let mid_key = Self::key_at(data, mid);
            if cmp.compare(&mid_key, key) != Ordering::Greater {
                result = mid;
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Self::value_at(data, result)
    }

    /// Insert `(key, value)` so it lands at slot `i`, shifting the tail right.
    pub fn insert_at(data: &mut [u8], i: usize, key: &K, value: PageId) {
        let size = Self::size(data);
        for j in (i..size).rev() {
            let k = Self::key_at(data, j);
            let v = Self::value_at(data, j);
            Self::set_key_at(data, j + 1, &k);
            Self::set_value_at(data, j + 1, v);
        }
        Self::set_key_at(data, i, key);
        Self::set_value_at(data, i, value);
        Self::set_size(data, size + 1);
    }

    /// Remove the slot at `i`, shifting the tail left.
    pub fn remove_at(data: &mut [u8], i: usize) {
        let size = Self::size(data);
        for j in i..size - 1 {
            let k = Self::key_at(data, j + 1);
            let v = Self::value_at(data, j + 1);
            Self::set_key_at(data, j, &k);
            Self::set_value_at(data, j, v);
        }
        Self::set_size(data, size - 1);
    }

    /// Find the slot index holding `child`, used by the caller to know which
    /// key separates `child` from its sibling during merge/borrow.
    pub fn index_of(data: &[u8], child: PageId) -> Option<usize> {
        (0..Self::size(data)).find(|&i| Self::value_at(data, i) == child)
    }
}
