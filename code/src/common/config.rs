//! Shared constants and type aliases used across the buffer pool and storage layers.

/// Identifies a page on disk. Allocated monotonically by the buffer pool; never reused.
pub type PageId = i64;

/// Identifies a frame slot inside the buffer pool's frame array.
pub type FrameId = usize;

/// Sentinel meaning "no page".
pub const INVALID_PAGE_ID: PageId = -1;

/// The id of the page every `BPlusTree` treats as its header page.
///
/// Not reserved by the pool itself: it is simply the first page id a freshly
/// constructed pool hands out, since `next_page_id` starts at zero.
pub const HEADER_PAGE_ID: PageId = 0;

/// Size, in bytes, of every page/frame.
pub const BUSTUB_PAGE_SIZE: usize = 4096;

/// Default `k` for the LRU-K replacer when a caller doesn't specify one.
pub const LRUK_REPLACER_K: usize = 2;
