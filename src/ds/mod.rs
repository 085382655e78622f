pub mod error;
/// 跳表。
pub mod skiplist;
/// 基于跳表的多重集合
pub mod multiset;
/// 动态类型的值
pub mod value;
