use crate::common::config::{PageId, INVALID_PAGE_ID};

/// The tree's single, never-reallocated entry point: just a pointer to the
/// current root page, so that concurrent descents only need to latch this
/// page (not the tree struct itself) to read or swap the root.
pub struct BPlusTreeHeaderPage;

impl BPlusTreeHeaderPage {
    pub fn init(data: &mut [u8]) {
        Self::set_root_page_id(data, INVALID_PAGE_ID);
    }

    pub fn root_page_id(data: &[u8]) -> PageId {
        PageId::from_le_bytes(data[0..8].try_into().unwrap())
    }

    pub fn set_root_page_id(data: &mut [u8], id: PageId) {
        data[0..8].copy_from_slice(&id.to_le_bytes());
    }
}
