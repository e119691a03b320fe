use std::marker::PhantomData;
use std::sync::Arc;

use tracing::instrument;

use crate::buffer::BufferPoolManager;
use crate::common::config::{PageId, BUSTUB_PAGE_SIZE, INVALID_PAGE_ID};
use crate::storage::page::{
    BPlusTreeHeaderPage, BPlusTreeInternalPage, BPlusTreeLeafPage, BPlusTreePageHeader, BPlusTreePageKind,
    WritePageGuard,
};

use super::comparator::KeyComparator;
use super::index_iterator::IndexIterator;
use super::key::{IndexKey, IndexValue};

/// A disk-resident B+Tree keyed by `K`, mapping to `V`, ordered by `C`.
///
/// The tree never holds its root page id directly; it's read from (and
/// written through) a header page supplied at construction, the same way a
/// catalog entry points at an index's root without the index itself needing
/// to be re-created when the root changes.
pub struct BPlusTree<K, V, C> {
    bpm: Arc<BufferPoolManager>,
    header_page_id: PageId,
    comparator: C,
    leaf_max_size: usize,
    internal_max_size: usize,
    _marker: PhantomData<(K, V)>,
}

impl<K, V, C> BPlusTree<K, V, C>
where
    K: IndexKey,
    V: IndexValue,
    C: KeyComparator<K>,
{
    pub fn new(
        bpm: Arc<BufferPoolManager>,
        header_page_id: PageId,
        comparator: C,
        leaf_max_size: usize,
        internal_max_size: usize,
    ) -> Self {
        {
            let mut guard = bpm
                .fetch_page_write(header_page_id)
                .expect("header page must already be allocated by the caller");
            BPlusTreeHeaderPage::init(guard.data_mut());
        }
        Self {
            bpm,
            header_page_id,
            comparator,
            leaf_max_size,
            internal_max_size,
            _marker: PhantomData,
        }
    }

    /// Same as [`Self::new`], but picks the largest leaf/internal `max_size`
    /// that still fits `K`/`V` in one `BUSTUB_PAGE_SIZE` frame instead of
    /// requiring the caller to work the slot arithmetic out by hand.
    pub fn new_with_default_sizes(bpm: Arc<BufferPoolManager>, header_page_id: PageId, comparator: C) -> Self {
        let leaf_max_size = BPlusTreeLeafPage::<K, V>::max_capacity(BUSTUB_PAGE_SIZE);
        let internal_max_size = BPlusTreeInternalPage::<K>::max_capacity(BUSTUB_PAGE_SIZE);
        Self::new(bpm, header_page_id, comparator, leaf_max_size, internal_max_size)
    }

    fn root_page_id(&self) -> PageId {
        let guard = self
            .bpm
            .fetch_page_read(self.header_page_id)
            .expect("header page must exist");
        BPlusTreeHeaderPage::root_page_id(guard.data())
    }

    pub fn is_empty(&self) -> bool {
        self.root_page_id() == INVALID_PAGE_ID
    }

    pub fn get_root_page_id(&self) -> PageId {
        self.root_page_id()
    }

    /// Shared-latch descent: latch the child before releasing the parent, so
    /// a concurrent writer can never observe a node with no latch held on it.
    #[instrument(skip(self))]
    pub fn get_value(&self, key: &K) -> Option<V> {
        let root_id = self.root_page_id();
        if root_id == INVALID_PAGE_ID {
            return None;
        }
        let mut guard = self.bpm.fetch_page_read(root_id)?;
        loop {
            let header = BPlusTreePageHeader::read(guard.data());
            match header.kind {
                BPlusTreePageKind::Leaf => {
                    let idx = BPlusTreeLeafPage::<K, V>::find(guard.data(), key, &self.comparator)?;
                    let found = BPlusTreeLeafPage::<K, V>::key_at(guard.data(), idx);
                    if self.comparator.compare(&found, key) == std::cmp::Ordering::Equal {
                        return Some(BPlusTreeLeafPage::<K, V>::value_at(guard.data(), idx));
                    }
                    return None;
                }
                BPlusTreePageKind::Internal => {
                    let child_id = BPlusTreeInternalPage::<K>::lookup(guard.data(), key, &self.comparator);
                    guard = self.bpm.fetch_page_read(child_id)?;
                }
                BPlusTreePageKind::Invalid => return None,
            }
        }
    }

    /// Pessimistic write-latch crabbing: every ancestor on the path is kept
    /// latched until the node it holds is proven "safe" (won't itself need to
    /// split in response to whatever its child does), at which point the
    /// whole held-ancestor stack is released in one go.
    #[instrument(skip(self, value))]
    pub fn insert(&self, key: &K, value: &V) -> bool {
        let mut header_guard = self
            .bpm
            .fetch_page_write(self.header_page_id)
            .expect("header page must exist");
        let root_id = BPlusTreeHeaderPage::root_page_id(header_guard.data());

        if root_id == INVALID_PAGE_ID {
            let mut leaf_guard = self
                .bpm
                .new_page_guarded()
                .expect("buffer pool exhausted while creating the first leaf")
                .upgrade_write();
            BPlusTreeLeafPage::<K, V>::init(leaf_guard.data_mut(), self.leaf_max_size);
            BPlusTreeLeafPage::<K, V>::insert(leaf_guard.data_mut(), key, value, &self.comparator);
            BPlusTreeHeaderPage::set_root_page_id(header_guard.data_mut(), leaf_guard.page_id());
            return true;
        }

        let mut ancestors: Vec<WritePageGuard> = Vec::new();
        let mut header_held = Some(header_guard);
        let mut current_id = root_id;

        loop {
            let mut guard = self
                .bpm
                .fetch_page_write(current_id)
                .expect("child page must exist");
            let kind = BPlusTreePageHeader::read(guard.data()).kind;
            let safe = match kind {
                BPlusTreePageKind::Leaf => {
                    BPlusTreeLeafPage::<K, V>::size(guard.data()) + 1 < BPlusTreeLeafPage::<K, V>::max_size(guard.data())
                }
                BPlusTreePageKind::Internal => {
                    BPlusTreeInternalPage::<K>::size(guard.data()) < BPlusTreeInternalPage::<K>::max_size(guard.data())
                }
                BPlusTreePageKind::Invalid => unreachable!("descended into an uninitialized page"),
            };
            if safe {
                ancestors.clear();
                header_held = None;
            }

            match kind {
                BPlusTreePageKind::Leaf => {
                    if !BPlusTreeLeafPage::<K, V>::insert(guard.data_mut(), key, value, &self.comparator) {
                        return false;
                    }
                    if BPlusTreeLeafPage::<K, V>::is_full(guard.data()) {
                        self.split_leaf(guard, ancestors, header_held);
                    }
                    return true;
                }
                BPlusTreePageKind::Internal => {
                    current_id = BPlusTreeInternalPage::<K>::lookup(guard.data(), key, &self.comparator);
                    ancestors.push(guard);
                }
                BPlusTreePageKind::Invalid => unreachable!(),
            }
        }
    }

    fn split_leaf(
        &self,
        mut leaf_guard: WritePageGuard,
        ancestors: Vec<WritePageGuard>,
        header_held: Option<WritePageGuard>,
    ) {
        let mut new_leaf_guard = self
            .bpm
            .new_page_guarded()
            .expect("buffer pool exhausted during leaf split")
            .upgrade_write();
        let new_leaf_id = new_leaf_guard.page_id();
        BPlusTreeLeafPage::<K, V>::init(new_leaf_guard.data_mut(), self.leaf_max_size);

        let size = BPlusTreeLeafPage::<K, V>::size(leaf_guard.data());
        let split_at = size / 2;
        for i in split_at..size {
            let k = BPlusTreeLeafPage::<K, V>::key_at(leaf_guard.data(), i);
            let v = BPlusTreeLeafPage::<K, V>::value_at(leaf_guard.data(), i);
            BPlusTreeLeafPage::<K, V>::insert(new_leaf_guard.data_mut(), &k, &v, &self.comparator);
        }
        BPlusTreeLeafPage::<K, V>::truncate(leaf_guard.data_mut(), split_at);
        BPlusTreeLeafPage::<K, V>::set_next_page_id(
            new_leaf_guard.data_mut(),
            BPlusTreeLeafPage::<K, V>::next_page_id(leaf_guard.data()),
        );
        BPlusTreeLeafPage::<K, V>::set_next_page_id(leaf_guard.data_mut(), new_leaf_id);

        let separator = BPlusTreeLeafPage::<K, V>::key_at(new_leaf_guard.data(), 0);
        self.insert_into_parent(leaf_guard.page_id(), separator, new_leaf_id, ancestors, header_held);
    }

    fn split_internal(
        &self,
        mut node_guard: WritePageGuard,
        ancestors: Vec<WritePageGuard>,
        header_held: Option<WritePageGuard>,
    ) {
        let size = BPlusTreeInternalPage::<K>::size(node_guard.data());
        let mid = size / 2;
        let up_key = BPlusTreeInternalPage::<K>::key_at(node_guard.data(), mid);

        let mut new_node_guard = self
            .bpm
            .new_page_guarded()
            .expect("buffer pool exhausted during internal split")
            .upgrade_write();
        let new_node_id = new_node_guard.page_id();
        BPlusTreeInternalPage::<K>::init(new_node_guard.data_mut(), self.internal_max_size);
        BPlusTreeInternalPage::<K>::set_value_at(
            new_node_guard.data_mut(),
            0,
            BPlusTreeInternalPage::<K>::value_at(node_guard.data(), mid),
        );
        for i in (mid + 1)..size {
            let k = BPlusTreeInternalPage::<K>::key_at(node_guard.data(), i);
            let v = BPlusTreeInternalPage::<K>::value_at(node_guard.data(), i);
            let at = BPlusTreeInternalPage::<K>::size(new_node_guard.data());
            BPlusTreeInternalPage::<K>::insert_at(new_node_guard.data_mut(), at, &k, v);
        }
        BPlusTreeInternalPage::<K>::truncate(node_guard.data_mut(), mid);

        self.insert_into_parent(node_guard.page_id(), up_key, new_node_id, ancestors, header_held);
    }

    fn insert_into_parent(
        &self,
        left_id: PageId,
        key: K,
        right_id: PageId,
        mut ancestors: Vec<WritePageGuard>,
        header_held: Option<WritePageGuard>,
    ) {
        match ancestors.pop() {
            Some(mut parent_guard) => {
                let idx = BPlusTreeInternalPage::<K>::index_of(parent_guard.data(), left_id)
                    .expect("left child must be present in its parent")
                    + 1;
                BPlusTreeInternalPage::<K>::insert_at(parent_guard.data_mut(), idx, &key, right_id);
                if BPlusTreeInternalPage::<K>::is_full(parent_guard.data()) {
                    self.split_internal(parent_guard, ancestors, header_held);
                }
            }
            None => {
                let mut header_guard = header_held.expect("a root split must retain the header latch");
                let mut new_root_guard = self
                    .bpm
                    .new_page_guarded()
                    .expect("buffer pool exhausted while growing a new root")
                    .upgrade_write();
                BPlusTreeInternalPage::<K>::init(new_root_guard.data_mut(), self.internal_max_size);
                BPlusTreeInternalPage::<K>::set_value_at(new_root_guard.data_mut(), 0, left_id);
                BPlusTreeInternalPage::<K>::insert_at(new_root_guard.data_mut(), 1, &key, right_id);
                BPlusTreeHeaderPage::set_root_page_id(header_guard.data_mut(), new_root_guard.page_id());
            }
        }
    }

    #[instrument(skip(self))]
    pub fn remove(&self, key: &K) -> bool {
        let header_guard = self
            .bpm
            .fetch_page_write(self.header_page_id)
            .expect("header page must exist");
        let root_id = BPlusTreeHeaderPage::root_page_id(header_guard.data());
        if root_id == INVALID_PAGE_ID {
            return false;
        }

        let mut ancestors: Vec<WritePageGuard> = Vec::new();
        let mut header_held = Some(header_guard);
        let mut current_id = root_id;

        loop {
            let mut guard = self
                .bpm
                .fetch_page_write(current_id)
                .expect("child page must exist");
            let kind = BPlusTreePageHeader::read(guard.data()).kind;
            let is_root = ancestors.is_empty() && header_held.is_some();
            let safe = match kind {
                BPlusTreePageKind::Leaf => {
                    is_root || BPlusTreeLeafPage::<K, V>::size(guard.data()) > BPlusTreeLeafPage::<K, V>::min_size(guard.data())
                }
                BPlusTreePageKind::Internal => {
                    if is_root {
                        BPlusTreeInternalPage::<K>::size(guard.data()) > 2
                    } else {
                        BPlusTreeInternalPage::<K>::size(guard.data()) > BPlusTreeInternalPage::<K>::min_size(guard.data())
                    }
                }
                BPlusTreePageKind::Invalid => unreachable!("descended into an uninitialized page"),
            };
            if safe {
                ancestors.clear();
                header_held = None;
            }

            match kind {
                BPlusTreePageKind::Leaf => {
                    if !BPlusTreeLeafPage::<K, V>::remove(guard.data_mut(), key, &self.comparator) {
                        return false;
                    }
                    self.handle_underflow_leaf(guard, ancestors, header_held);
                    return true;
                }
                BPlusTreePageKind::Internal => {
                    current_id = BPlusTreeInternalPage::<K>::lookup(guard.data(), key, &self.comparator);
                    ancestors.push(guard);
                }
                BPlusTreePageKind::Invalid => unreachable!(),
            }
        }
    }

    fn handle_underflow_leaf(
        &self,
        mut leaf_guard: WritePageGuard,
        mut ancestors: Vec<WritePageGuard>,
        header_held: Option<WritePageGuard>,
    ) {
        let is_root = ancestors.is_empty() && header_held.is_some();
        if is_root {
            if BPlusTreeLeafPage::<K, V>::size(leaf_guard.data()) == 0 {
                if let Some(mut header_guard) = header_held {
                    BPlusTreeHeaderPage::set_root_page_id(header_guard.data_mut(), INVALID_PAGE_ID);
                }
                let leaf_id = leaf_guard.page_id();
                drop(leaf_guard);
                self.bpm.delete_page(leaf_id);
            }
            return;
        }
        if BPlusTreeLeafPage::<K, V>::size(leaf_guard.data()) >= BPlusTreeLeafPage::<K, V>::min_size(leaf_guard.data()) {
            return;
        }

        let mut parent_guard = ancestors.pop().expect("non-root leaf must have a parent");
        let leaf_id = leaf_guard.page_id();
        let idx = BPlusTreeInternalPage::<K>::index_of(parent_guard.data(), leaf_id)
            .expect("leaf must be present in its parent");

        if idx > 0 {
            let left_sibling_id = BPlusTreeInternalPage::<K>::value_at(parent_guard.data(), idx - 1);
            let mut left_guard = self
                .bpm
                .fetch_page_write(left_sibling_id)
                .expect("sibling page must exist");
            if BPlusTreeLeafPage::<K, V>::size(left_guard.data()) > BPlusTreeLeafPage::<K, V>::min_size(left_guard.data()) {
                let last = BPlusTreeLeafPage::<K, V>::size(left_guard.data()) - 1;
                let k = BPlusTreeLeafPage::<K, V>::key_at(left_guard.data(), last);
                let v = BPlusTreeLeafPage::<K, V>::value_at(left_guard.data(), last);
                BPlusTreeLeafPage::<K, V>::truncate(left_guard.data_mut(), last);
                BPlusTreeLeafPage::<K, V>::insert(leaf_guard.data_mut(), &k, &v, &self.comparator);
                BPlusTreeInternalPage::<K>::set_key_at(parent_guard.data_mut(), idx, &k);
                return;
            }
        }

        let parent_size = BPlusTreeInternalPage::<K>::size(parent_guard.data());
        if idx + 1 < parent_size {
            let right_sibling_id = BPlusTreeInternalPage::<K>::value_at(parent_guard.data(), idx + 1);
            let mut right_guard = self
                .bpm
                .fetch_page_write(right_sibling_id)
                .expect("sibling page must exist");
            if BPlusTreeLeafPage::<K, V>::size(right_guard.data()) > BPlusTreeLeafPage::<K, V>::min_size(right_guard.data()) {
                let k = BPlusTreeLeafPage::<K, V>::key_at(right_guard.data(), 0);
                let v = BPlusTreeLeafPage::<K, V>::value_at(right_guard.data(), 0);
                BPlusTreeLeafPage::<K, V>::remove(right_guard.data_mut(), &k, &self.comparator);
                BPlusTreeLeafPage::<K, V>::insert(leaf_guard.data_mut(), &k, &v, &self.comparator);
                let new_first = BPlusTreeLeafPage::<K, V>::key_at(right_guard.data(), 0);
                BPlusTreeInternalPage::<K>::set_key_at(parent_guard.data_mut(), idx + 1, &new_first);
                return;
            }

            let rsize = BPlusTreeLeafPage::<K, V>::size(right_guard.data());
            for i in 0..rsize {
                let k = BPlusTreeLeafPage::<K, V>::key_at(right_guard.data(), i);
                let v = BPlusTreeLeafPage::<K, V>::value_at(right_guard.data(), i);
                BPlusTreeLeafPage::<K, V>::insert(leaf_guard.data_mut(), &k, &v, &self.comparator);
            }
            BPlusTreeLeafPage::<K, V>::set_next_page_id(
                leaf_guard.data_mut(),
                BPlusTreeLeafPage::<K, V>::next_page_id(right_guard.data()),
            );
            BPlusTreeInternalPage::<K>::remove_at(parent_guard.data_mut(), idx + 1);
            drop(right_guard);
            self.bpm.delete_page(right_sibling_id);
            self.handle_underflow_internal(parent_guard, ancestors, header_held);
            return;
        }

        let left_sibling_id = BPlusTreeInternalPage::<K>::value_at(parent_guard.data(), idx - 1);
        let mut left_guard = self
            .bpm
            .fetch_page_write(left_sibling_id)
            .expect("sibling page must exist");
        let lsize = BPlusTreeLeafPage::<K, V>::size(leaf_guard.data());
        for i in 0..lsize {
            let k = BPlusTreeLeafPage::<K, V>::key_at(leaf_guard.data(), i);
            let v = BPlusTreeLeafPage::<K, V>::value_at(leaf_guard.data(), i);
            BPlusTreeLeafPage::<K, V>::insert(left_guard.data_mut(), &k, &v, &self.comparator);
        }
        BPlusTreeLeafPage::<K, V>::set_next_page_id(
            left_guard.data_mut(),
            BPlusTreeLeafPage::<K, V>::next_page_id(leaf_guard.data()),
        );
        BPlusTreeInternalPage::<K>::remove_at(parent_guard.data_mut(), idx);
        drop(leaf_guard);
        self.bpm.delete_page(leaf_id);
        self.handle_underflow_internal(parent_guard, ancestors, header_held);
    }

    fn handle_underflow_internal(
        &self,
        mut node_guard: WritePageGuard,
        mut ancestors: Vec<WritePageGuard>,
        header_held: Option<WritePageGuard>,
    ) {
        let is_root = ancestors.is_empty() && header_held.is_some();
        if is_root {
            if BPlusTreeInternalPage::<K>::size(node_guard.data()) == 1 {
                let only_child = BPlusTreeInternalPage::<K>::value_at(node_guard.data(), 0);
                if let Some(mut header_guard) = header_held {
                    BPlusTreeHeaderPage::set_root_page_id(header_guard.data_mut(), only_child);
                }
                let node_id = node_guard.page_id();
                drop(node_guard);
                self.bpm.delete_page(node_id);
            }
            return;
        }
        if BPlusTreeInternalPage::<K>::size(node_guard.data()) >= BPlusTreeInternalPage::<K>::min_size(node_guard.data()) {
            return;
        }

        let mut parent_guard = ancestors.pop().expect("non-root internal node must have a parent");
        let node_id = node_guard.page_id();
        let idx = BPlusTreeInternalPage::<K>::index_of(parent_guard.data(), node_id)
            .expect("node must be present in its parent");

        if idx > 0 {
            let left_sibling_id = BPlusTreeInternalPage::<K>::value_at(parent_guard.data(), idx - 1);
            let mut left_guard = self
                .bpm
                .fetch_page_write(left_sibling_id)
                .expect("sibling page must exist");
            if BPlusTreeInternalPage::<K>::size(left_guard.data()) > BPlusTreeInternalPage::<K>::min_size(left_guard.data()) {
                let last = BPlusTreeInternalPage::<K>::size(left_guard.data()) - 1;
                let moved_child = BPlusTreeInternalPage::<K>::value_at(left_guard.data(), last);
                let moved_key = BPlusTreeInternalPage::<K>::key_at(left_guard.data(), last);
                let old_separator = BPlusTreeInternalPage::<K>::key_at(parent_guard.data(), idx);
                BPlusTreeInternalPage::<K>::truncate(left_guard.data_mut(), last);
                BPlusTreeInternalPage::<K>::insert_at(node_guard.data_mut(), 0, &old_separator, moved_child);
                BPlusTreeInternalPage::<K>::set_key_at(node_guard.data_mut(), 1, &old_separator);
                BPlusTreeInternalPage::<K>::set_key_at(parent_guard.data_mut(), idx, &moved_key);
                return;
            }
        }

        let parent_size = BPlusTreeInternalPage::<K>::size(parent_guard.data());
        if idx + 1 < parent_size {
            let right_sibling_id = BPlusTreeInternalPage::<K>::value_at(parent_guard.data(), idx + 1);
            let mut right_guard = self
                .bpm
                .fetch_page_write(right_sibling_id)
                .expect("sibling page must exist");
            if BPlusTreeInternalPage::<K>::size(right_guard.data()) > BPlusTreeInternalPage::<K>::min_size(right_guard.data()) {
                let moved_child = BPlusTreeInternalPage::<K>::value_at(right_guard.data(), 0);
                let old_separator = BPlusTreeInternalPage::<K>::key_at(parent_guard.data(), idx + 1);
                let node_size = BPlusTreeInternalPage::<K>::size(node_guard.data());
                BPlusTreeInternalPage::<K>::insert_at(node_guard.data_mut(), node_size, &old_separator, moved_child);
                let new_first_key = BPlusTreeInternalPage::<K>::key_at(right_guard.data(), 1);
                BPlusTreeInternalPage::<K>::remove_at(right_guard.data_mut(), 0);
                BPlusTreeInternalPage::<K>::set_key_at(parent_guard.data_mut(), idx + 1, &new_first_key);
                return;
            }

            let separator = BPlusTreeInternalPage::<K>::key_at(parent_guard.data(), idx + 1);
            Self::merge_internal(&mut node_guard, &right_guard, separator);
            BPlusTreeInternalPage::<K>::remove_at(parent_guard.data_mut(), idx + 1);
            drop(right_guard);
            self.bpm.delete_page(right_sibling_id);
            self.handle_underflow_internal(parent_guard, ancestors, header_held);
            return;
        }

        let left_sibling_id = BPlusTreeInternalPage::<K>::value_at(parent_guard.data(), idx - 1);
        let mut left_guard = self
            .bpm
            .fetch_page_write(left_sibling_id)
            .expect("sibling page must exist");
        let separator = BPlusTreeInternalPage::<K>::key_at(parent_guard.data(), idx);
        Self::merge_internal(&mut left_guard, &node_guard, separator);
        BPlusTreeInternalPage::<K>::remove_at(parent_guard.data_mut(), idx);
        drop(node_guard);
        self.bpm.delete_page(node_id);
        self.handle_underflow_internal(parent_guard, ancestors, header_held);
    }

    /// Fold `right`'s children into `left`, pulling `separator` down to key
    /// `right`'s former leftmost (sentinel-keyed) child.
    fn merge_internal(left_guard: &mut WritePageGuard, right_guard: &WritePageGuard, separator: K) {
        let right_first_child = BPlusTreeInternalPage::<K>::value_at(right_guard.data(), 0);
        let left_size = BPlusTreeInternalPage::<K>::size(left_guard.data());
        BPlusTreeInternalPage::<K>::insert_at(left_guard.data_mut(), left_size, &separator, right_first_child);
        let right_size = BPlusTreeInternalPage::<K>::size(right_guard.data());
        for i in 1..right_size {
            let k = BPlusTreeInternalPage::<K>::key_at(right_guard.data(), i);
            let v = BPlusTreeInternalPage::<K>::value_at(right_guard.data(), i);
            let at = BPlusTreeInternalPage::<K>::size(left_guard.data());
            BPlusTreeInternalPage::<K>::insert_at(left_guard.data_mut(), at, &k, v);
        }
    }

    /// Iterator over the whole tree in key order.
    pub fn begin(&self) -> IndexIterator<K, V> {
        let root_id = self.root_page_id();
        if root_id == INVALID_PAGE_ID {
            return IndexIterator::empty();
        }
        let leaf_id = self.leftmost_leaf(root_id);
        IndexIterator::new(Arc::clone(&self.bpm), leaf_id, 0)
    }

    /// Iterator starting at the first entry with key `>= key`.
    pub fn begin_at(&self, key: &K) -> IndexIterator<K, V> {
        let root_id = self.root_page_id();
        if root_id == INVALID_PAGE_ID {
            return IndexIterator::empty();
        }
        let mut current_id = root_id;
        loop {
            let guard = self
                .bpm
                .fetch_page_read(current_id)
                .expect("child page must exist");
            let header = BPlusTreePageHeader::read(guard.data());
            match header.kind {
                BPlusTreePageKind::Leaf => {
                    let size = BPlusTreeLeafPage::<K, V>::size(guard.data());
                    let mut idx = size;
                    for i in 0..size {
                        if self.comparator.compare(&BPlusTreeLeafPage::<K, V>::key_at(guard.data(), i), key)
                            != std::cmp::Ordering::Less
                        {
                            idx = i;
                            break;
                        }
                    }
                    if idx == size {
                        let next = BPlusTreeLeafPage::<K, V>::next_page_id(guard.data());
                        return IndexIterator::new(Arc::clone(&self.bpm), next, 0);
                    }
                    return IndexIterator::new(Arc::clone(&self.bpm), current_id, idx);
                }
                BPlusTreePageKind::Internal => {
                    current_id = BPlusTreeInternalPage::<K>::lookup(guard.data(), key, &self.comparator);
                }
                BPlusTreePageKind::Invalid => return IndexIterator::empty(),
            }
        }
    }

    fn leftmost_leaf(&self, mut current_id: PageId) -> PageId {
        loop {
            let guard = self
                .bpm
                .fetch_page_read(current_id)
                .expect("child page must exist");
            match BPlusTreePageHeader::read(guard.data()).kind {
                BPlusTreePageKind::Leaf => return current_id,
                BPlusTreePageKind::Internal => current_id = BPlusTreeInternalPage::<K>::value_at(guard.data(), 0),
                BPlusTreePageKind::Invalid => unreachable!("descended into an uninitialized page"),
            }
        }
    }

    /// Render the tree structure for debugging; never used on the hot path.
    pub fn pretty_print(&self) -> String {
        let root_id = self.root_page_id();
        if root_id == INVALID_PAGE_ID {
            return "<empty tree>".to_string();
        }
        let mut out = String::new();
        self.pretty_print_node(root_id, 0, &mut out);
        out
    }

    fn pretty_print_node(&self, page_id: PageId, depth: usize, out: &mut String) {
        let guard = self.bpm.fetch_page_read(page_id).expect("child page must exist");
        let header = BPlusTreePageHeader::read(guard.data());
        let indent = "  ".repeat(depth);
        match header.kind {
            BPlusTreePageKind::Leaf => {
                let size = BPlusTreeLeafPage::<K, V>::size(guard.data());
                let keys: Vec<K> = (0..size).map(|i| BPlusTreeLeafPage::<K, V>::key_at(guard.data(), i)).collect();
                out.push_str(&format!("{indent}leaf(page={page_id}) {keys:?}\n"));
            }
            BPlusTreePageKind::Internal => {
                let size = BPlusTreeInternalPage::<K>::size(guard.data());
                let keys: Vec<K> = (1..size).map(|i| BPlusTreeInternalPage::<K>::key_at(guard.data(), i)).collect();
                out.push_str(&format!("{indent}internal(page={page_id}) {keys:?}\n"));
                let children: Vec<PageId> = (0..size).map(|i| BPlusTreeInternalPage::<K>::value_at(guard.data(), i)).collect();
                drop(guard);
                for child in children {
                    self.pretty_print_node(child, depth + 1, out);
                }
                return;
            }
            BPlusTreePageKind::Invalid => out.push_str(&format!("{indent}<invalid page={page_id}>\n")),
        }
    }
}
