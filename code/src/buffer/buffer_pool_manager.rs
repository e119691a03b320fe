use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::{ArcRwLockReadGuard, ArcRwLockWriteGuard, Mutex, RawRwLock, RwLock};
use tracing::{trace, warn};

use crate::common::config::{FrameId, PageId, BUSTUB_PAGE_SIZE};
use crate::storage::disk::DiskManager;
use crate::storage::page::{BasicPageGuard, ReadPageGuard, WritePageGuard};

use super::lru_k_replacer::LRUKReplacer;

/// The raw bytes backing one frame, shared so guards can hold an owned latch
/// independent of the `BufferPoolManager`'s own lifetime.
pub(crate) type FrameData = Arc<RwLock<[u8; BUSTUB_PAGE_SIZE]>>;
pub(crate) type FrameReadGuard = ArcRwLockReadGuard<RawRwLock, [u8; BUSTUB_PAGE_SIZE]>;
pub(crate) type FrameWriteGuard = ArcRwLockWriteGuard<RawRwLock, [u8; BUSTUB_PAGE_SIZE]>;

#[derive(Clone, Copy)]
struct FrameMeta {
    page_id: PageId,
    pin_count: usize,
    is_dirty: bool,
}

impl Default for FrameMeta {
    fn default() -> Self {
        Self {
            page_id: crate::common::config::INVALID_PAGE_ID,
            pin_count: 0,
            is_dirty: false,
        }
    }
}

struct PoolInner {
    frame_meta: Vec<FrameMeta>,
    page_table: HashMap<PageId, FrameId>,
    free_list: VecDeque<FrameId>,
    next_page_id: PageId,
    replacer: LRUKReplacer,
}

/// Fixed-capacity cache of pages, backed by `disk_manager` and governed by an
/// LRU-K replacer. One mutex (`inner`) serializes every bookkeeping operation;
/// frame bytes live behind their own per-frame latch, acquired only by guard
/// constructors after `inner` has been released (see `storage::page::page_guard`).
pub struct BufferPoolManager {
    pool_size: usize,
    disk_manager: Arc<dyn DiskManager>,
    frames: Vec<FrameData>,
    inner: Mutex<PoolInner>,
}

impl BufferPoolManager {
    pub fn new(pool_size: usize, disk_manager: Arc<dyn DiskManager>, replacer_k: usize) -> Arc<Self> {
        assert!(pool_size > 0, "pool_size must be >= 1");
        let free_list = (0..pool_size).collect();
        Arc::new(Self {
            pool_size,
            disk_manager,
            frames: (0..pool_size)
                .map(|_| Arc::new(RwLock::new([0u8; BUSTUB_PAGE_SIZE])))
                .collect(),
            inner: Mutex::new(PoolInner {
                frame_meta: vec![FrameMeta::default(); pool_size],
                page_table: HashMap::new(),
                free_list,
                next_page_id: 0,
                replacer: LRUKReplacer::new(pool_size, replacer_k),
            }),
        })
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    fn allocate_page(inner: &mut PoolInner) -> PageId {
        let id = inner.next_page_id;
        inner.next_page_id += 1;
        id
    }

    /// Pick a frame to reuse: free list first, then the replacer's victim.
    /// Writes back the victim's dirty contents (if any) before it is reset.
    fn acquire_frame(&self, inner: &mut PoolInner) -> Option<FrameId> {
        if let Some(frame_id) = inner.free_list.pop_front() {
            return Some(frame_id);
        }
        let frame_id = inner.replacer.evict()?;
        let victim = inner.frame_meta[frame_id];
        inner.page_table.remove(&victim.page_id);
        if victim.is_dirty {
            let data = self.frames[frame_id].read();
            self.disk_manager
                .write_page(victim.page_id, &data[..])
                .expect("disk write failed during eviction");
            trace!(page_id = victim.page_id, frame_id, "wrote back dirty victim before eviction");
        }
        inner.frame_meta[frame_id] = FrameMeta::default();
        Some(frame_id)
    }

    /// Allocate a fresh page, pin it, and return its id and frame.
    pub(crate) fn new_page_raw(&self) -> Option<(PageId, FrameId)> {
        let mut inner = self.inner.lock();
        let frame_id = match self.acquire_frame(&mut inner) {
            Some(f) => f,
            None => {
                warn!("buffer pool exhausted: new_page found no evictable frame");
                return None;
            }
        };
        let page_id = Self::allocate_page(&mut inner);
        self.frames[frame_id].write().fill(0);
        inner.frame_meta[frame_id] = FrameMeta {
            page_id,
            pin_count: 1,
            is_dirty: false,
        };
        inner.page_table.insert(page_id, frame_id);
        inner
            .replacer
            .record_access(frame_id)
            .expect("replacer bookkeeping exceeds capacity");
        inner
            .replacer
            .set_evictable(frame_id, false)
            .expect("frame must be tracked immediately after record_access");
        Some((page_id, frame_id))
    }

    /// Resolve `page_id` to a pinned frame, reading it from disk if necessary.
    pub(crate) fn fetch_page_raw(&self, page_id: PageId) -> Option<FrameId> {
        let mut inner = self.inner.lock();
        if let Some(&frame_id) = inner.page_table.get(&page_id) {
            inner.frame_meta[frame_id].pin_count += 1;
            inner
                .replacer
                .record_access(frame_id)
                .expect("replacer bookkeeping exceeds capacity");
            inner
                .replacer
                .set_evictable(frame_id, false)
                .expect("frame must be tracked");
            return Some(frame_id);
        }

        let frame_id = match self.acquire_frame(&mut inner) {
            Some(f) => f,
            None => {
                warn!(page_id, "buffer pool exhausted: fetch_page found no evictable frame");
                return None;
            }
        };
        {
            let mut data = self.frames[frame_id].write();
            self.disk_manager
                .read_page(page_id, &mut data[..])
                .expect("disk read failed");
        }
        inner.frame_meta[frame_id] = FrameMeta {
            page_id,
            pin_count: 1,
            is_dirty: false,
        };
        inner.page_table.insert(page_id, frame_id);
        inner
            .replacer
            .record_access(frame_id)
            .expect("replacer bookkeeping exceeds capacity");
        inner
            .replacer
            .set_evictable(frame_id, false)
            .expect("frame must be tracked");
        Some(frame_id)
    }

    /// Decrement `page_id`'s pin count; mark it evictable once it reaches zero.
    /// Returns `false` if the page isn't resident or is already unpinned.
    pub fn unpin_page(&self, page_id: PageId, mark_dirty: bool) -> bool {
        let mut inner = self.inner.lock();
        let frame_id = match inner.page_table.get(&page_id) {
            Some(&f) => f,
            None => return false,
        };
        if inner.frame_meta[frame_id].pin_count == 0 {
            return false;
        }
        inner.frame_meta[frame_id].pin_count -= 1;
        if mark_dirty {
            inner.frame_meta[frame_id].is_dirty = true;
        }
        if inner.frame_meta[frame_id].pin_count == 0 {
            inner
                .replacer
                .set_evictable(frame_id, true)
                .expect("frame must be tracked");
        }
        true
    }

    /// Write `page_id`'s frame to disk regardless of its dirty bit, then clear it.
    pub fn flush_page(&self, page_id: PageId) -> bool {
        let frame_id = {
            let inner = self.inner.lock();
            match inner.page_table.get(&page_id) {
                Some(&f) => f,
                None => return false,
            }
        };
        {
            let data = self.frames[frame_id].read();
            self.disk_manager
                .write_page(page_id, &data[..])
                .expect("disk write failed");
        }
        let mut inner = self.inner.lock();
        if inner.page_table.get(&page_id) == Some(&frame_id) {
            inner.frame_meta[frame_id].is_dirty = false;
        }
        true
    }

    /// Flush every resident page.
    pub fn flush_all_pages(&self) {
        let page_ids: Vec<PageId> = {
            let inner = self.inner.lock();
            inner.page_table.keys().copied().collect()
        };
        for page_id in page_ids {
            self.flush_page(page_id);
        }
    }

    /// Remove `page_id` from the pool. Succeeds (no-op) if it isn't resident;
    /// fails if it is still pinned.
    pub fn delete_page(&self, page_id: PageId) -> bool {
        let mut inner = self.inner.lock();
        let frame_id = match inner.page_table.get(&page_id) {
            Some(&f) => f,
            None => return true,
        };
        if inner.frame_meta[frame_id].pin_count != 0 {
            return false;
        }
        if inner.frame_meta[frame_id].is_dirty {
            let data = self.frames[frame_id].read();
            self.disk_manager
                .write_page(page_id, &data[..])
                .expect("disk write failed");
        }
        inner.page_table.remove(&page_id);
        inner
            .replacer
            .remove(frame_id)
            .expect("frame must be evictable to delete");
        inner.free_list.push_back(frame_id);
        inner.frame_meta[frame_id] = FrameMeta::default();
        true
    }

    pub(crate) fn frame_data(&self, frame_id: FrameId) -> FrameData {
        Arc::clone(&self.frames[frame_id])
    }
}

/// Guard-returning wrappers. Split out so the raw `new_page_raw`/`fetch_page_raw`
/// stay usable without forcing every caller through `Arc<Self>`.
impl BufferPoolManager {
    pub fn new_page_guarded(self: &Arc<Self>) -> Option<BasicPageGuard> {
        let (page_id, frame_id) = self.new_page_raw()?;
        Some(BasicPageGuard::new(
            Arc::clone(self),
            page_id,
            frame_id,
            self.frame_data(frame_id),
        ))
    }

    pub fn fetch_page_basic(self: &Arc<Self>, page_id: PageId) -> Option<BasicPageGuard> {
        let frame_id = self.fetch_page_raw(page_id)?;
        Some(BasicPageGuard::new(
            Arc::clone(self),
            page_id,
            frame_id,
            self.frame_data(frame_id),
        ))
    }

    pub fn fetch_page_read(self: &Arc<Self>, page_id: PageId) -> Option<ReadPageGuard> {
        self.fetch_page_basic(page_id).map(BasicPageGuard::upgrade_read)
    }

    pub fn fetch_page_write(self: &Arc<Self>, page_id: PageId) -> Option<WritePageGuard> {
        self.fetch_page_basic(page_id).map(BasicPageGuard::upgrade_write)
    }
}
