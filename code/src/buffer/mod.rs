mod buffer_pool_manager;
mod lru_k_replacer;

pub use buffer_pool_manager::BufferPoolManager;
pub(crate) use buffer_pool_manager::{FrameData, FrameReadGuard, FrameWriteGuard};
pub use lru_k_replacer::LRUKReplacer;
