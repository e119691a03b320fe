pub mod comparator;
mod b_plus_tree;
mod index_iterator;
pub mod key;

pub use b_plus_tree::BPlusTree;
pub use index_iterator::IndexIterator;
