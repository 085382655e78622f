//! 跳表：多层有序链表，查找、插入、删除的期望复杂度为 O(log n)。

mod arena;
pub mod config;
mod iter;
mod node;
#[allow(clippy::module_inception)]
mod skiplist;

pub use config::{SkiplistConfig, DEFAULT_PROBABILITY};
pub use iter::{Iter, UniqueIter};
pub use skiplist::Skiplist;
