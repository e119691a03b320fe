mod b_plus_tree_header_page;
mod b_plus_tree_internal_page;
mod b_plus_tree_leaf_page;
mod b_plus_tree_page;
mod page_guard;

pub use b_plus_tree_header_page::BPlusTreeHeaderPage;
pub use b_plus_tree_internal_page::BPlusTreeInternalPage;
pub use b_plus_tree_leaf_page::BPlusTreeLeafPage;
pub use b_plus_tree_page::{BPlusTreePageKind, BPlusTreePageHeader};
pub use page_guard::{BasicPageGuard, ReadPageGuard, WritePageGuard};
