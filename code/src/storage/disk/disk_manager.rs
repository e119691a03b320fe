use crate::common::config::PageId;
use crate::error::CustomResult;

/// Boundary interface to block-structured storage.
///
/// Both operations are synchronous and operate on a fixed block size
/// (`BUSTUB_PAGE_SIZE`); `buf` is always exactly that long. Allocation of
/// page identifiers is the buffer pool's job, not the disk manager's.
pub trait DiskManager: Send + Sync {
    /// Read the block for `page_id` into `buf`.
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> CustomResult<()>;

    /// Write `buf` as the block for `page_id`.
    fn write_page(&self, page_id: PageId, buf: &[u8]) -> CustomResult<()>;
}
