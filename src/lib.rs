//! 跳表以及构建在其上的多重集合。
//! 只支持单线程顺序调用。

pub mod ds;

pub use ds::error::{SLError, SLResult};
pub use ds::multiset::MultiSet;
pub use ds::skiplist::{Skiplist, SkiplistConfig, DEFAULT_PROBABILITY};
pub use ds::value::Value;
