use std::sync::Arc;

use crate::buffer::BufferPoolManager;
use crate::common::config::{PageId, INVALID_PAGE_ID};
use crate::storage::page::BPlusTreeLeafPage;

use super::key::{IndexKey, IndexValue};

/// Forward-only cursor over a leaf chain, reading one leaf at a time through
/// a shared latch and following `next_page_id` at the end of each leaf.
pub struct IndexIterator<K, V> {
    bpm: Option<Arc<BufferPoolManager>>,
    current_page_id: PageId,
    slot: usize,
    _marker: std::marker::PhantomData<(K, V)>,
}

impl<K: IndexKey, V: IndexValue> IndexIterator<K, V> {
    pub(crate) fn new(bpm: Arc<BufferPoolManager>, page_id: PageId, slot: usize) -> Self {
        if page_id == INVALID_PAGE_ID {
            return Self::empty();
        }
        Self {
            bpm: Some(bpm),
            current_page_id: page_id,
            slot,
            _marker: std::marker::PhantomData,
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            bpm: None,
            current_page_id: INVALID_PAGE_ID,
            slot: 0,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn is_end(&self) -> bool {
        self.bpm.is_none()
    }
}

impl<K: IndexKey, V: IndexValue> Iterator for IndexIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let bpm = self.bpm.as_ref()?;
        let guard = bpm
            .fetch_page_read(self.current_page_id)
            .expect("leaf page must exist while an iterator points at it");
        let size = BPlusTreeLeafPage::<K, V>::size(guard.data());
        let key = BPlusTreeLeafPage::<K, V>::key_at(guard.data(), self.slot);
        let value = BPlusTreeLeafPage::<K, V>::value_at(guard.data(), self.slot);

        if self.slot + 1 < size {
            self.slot += 1;
        } else {
            let next_page_id = BPlusTreeLeafPage::<K, V>::next_page_id(guard.data());
            drop(guard);
            if next_page_id == INVALID_PAGE_ID {
                self.bpm = None;
                self.current_page_id = INVALID_PAGE_ID;
            } else {
                self.current_page_id = next_page_id;
                self.slot = 0;
            }
        }

        Some((key, value))
    }
}
