use std::collections::HashMap;
use std::sync::Mutex;

use crate::common::config::{PageId, BUSTUB_PAGE_SIZE};
use crate::error::CustomResult;

use super::disk_manager::DiskManager;

/// In-memory stand-in for a disk, used by tests. Unlimited capacity, never
/// persists across process restarts. Mirrors `DiskManagerUnlimitedMemory` from
/// the course's C++ test harness.
#[derive(Default)]
pub struct MemoryDiskManager {
    pages: Mutex<HashMap<PageId, Box<[u8; BUSTUB_PAGE_SIZE]>>>,
}

impl MemoryDiskManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiskManager for MemoryDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> CustomResult<()> {
        debug_assert_eq!(buf.len(), BUSTUB_PAGE_SIZE);
        let pages = self.pages.lock().expect("disk manager mutex poisoned");
        match pages.get(&page_id) {
            Some(block) => buf.copy_from_slice(block.as_slice()),
            None => buf.fill(0),
        }
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> CustomResult<()> {
        debug_assert_eq!(buf.len(), BUSTUB_PAGE_SIZE);
        let mut block = Box::new([0u8; BUSTUB_PAGE_SIZE]);
        block.copy_from_slice(buf);
        self.pages
            .lock()
            .expect("disk manager mutex poisoned")
            .insert(page_id, block);
        Ok(())
    }
}
