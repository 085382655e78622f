//! 基于跳表的多重集合。
//! 计数语义：并集按次数相加，交集取较小次数，差集取差值（不低于 0）。

use std::{
    fmt,
    ops::{Add, BitAnd, BitAndAssign, Sub, SubAssign},
    rc::Rc,
};

use super::{
    error::SLResult,
    skiplist::{Iter, Skiplist, SkiplistConfig, UniqueIter},
    value::Value,
};

pub struct MultiSet<T> {
    skiplist: Skiplist<T>,
}

impl<T> MultiSet<T> {
    pub fn new() -> Self {
        Self { skiplist: Skiplist::new() }
    }

    pub fn with_config(config: SkiplistConfig) -> SLResult<Self> {
        Ok(Self { skiplist: Skiplist::with_config(config)? })
    }

    pub fn from_skiplist(skiplist: Skiplist<T>) -> Self {
        Self { skiplist }
    }

    pub fn len(&self) -> usize {
        self.skiplist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skiplist.is_empty()
    }

    /// 换成一张全新的默认跳表
    pub fn clear(&mut self) {
        self.skiplist = Skiplist::new();
    }

    /// 按非降序返回每一次出现
    pub fn iter(&self) -> Iter<'_, T> {
        self.skiplist.iter()
    }

    pub fn as_skiplist(&self) -> &Skiplist<T> {
        &self.skiplist
    }
}

impl<T: PartialOrd> MultiSet<T> {
    pub fn try_from_iter<I: IntoIterator<Item = T>>(values: I) -> SLResult<Self> {
        Ok(Self { skiplist: Skiplist::try_from_iter(values)? })
    }

    /// 至少出现一次。类型不可比较时视为不存在
    pub fn contains(&self, value: &T) -> bool {
        match self.skiplist.search(value) {
            Ok(found) => found.is_some(),
            Err(err) => {
                log::debug!("contains treats value as absent: {}", err);
                false
            }
        }
    }

    /// 出现次数，不可比较时为 0
    pub fn count(&self, value: &T) -> usize {
        self.skiplist.count(value)
    }

    /// 插入。与已有值不可比较时返回 `IncomparableType`
    pub fn insert(&mut self, value: T) -> SLResult<()> {
        self.skiplist.insert(value)
    }

    /// 删除一次出现，返回是否删除成功
    pub fn remove(&mut self, value: &T) -> bool {
        self.skiplist.remove(value)
    }

    pub fn unique_iter(&self) -> UniqueIter<'_, T> {
        self.skiplist.unique_iter()
    }

    /// A + B：每个值的次数相加。新集合的概率是两者的平均
    pub fn union(&self, other: &Self) -> SLResult<Self> {
        Ok(Self { skiplist: self.skiplist.concat(&other.skiplist)? })
    }

    /// A += B。遇到不可比较的值时停止，之前插入的保留
    pub fn union_update(&mut self, other: &Self) -> SLResult<()> {
        self.skiplist.extend_from(&other.skiplist)
    }

    /// A - B：每个值保留 max(0, count_A - count_B) 次
    pub fn difference(&self, other: &Self) -> Self {
        let mut result = Self::new();
        let mut values = self.unique_iter();
        while let Some(value) = values.next_shared() {
            let keep = self.count(value).saturating_sub(other.count(value));
            result.push_back_n(value, keep);
        }
        result
    }

    /// A -= B：对 B 中每个不同的值，从 A 中最多删除 count_B 次
    pub fn difference_update(&mut self, other: &Self) {
        for value in other.unique_iter() {
            let limit = other.count(value);
            let mut removed = 0;
            while removed < limit && self.skiplist.remove(value) {
                removed += 1;
            }
        }
    }

    /// A & B：每个值保留 min(count_A, count_B) 次。
    /// 只遍历较短的一方，结果不会比它更长
    pub fn intersection(&self, other: &Self) -> Self {
        let (smaller, larger) = if self.len() < other.len() { (self, other) } else { (other, self) };
        let mut result = Self::new();
        let mut values = smaller.unique_iter();
        while let Some(value) = values.next_shared() {
            let keep = smaller.count(value).min(larger.count(value));
            result.push_back_n(value, keep);
        }
        result
    }

    /// A &= B：删除多余的出现，使每个值的次数变为 min(count_A, count_B)。
    /// 只在 B 中出现的值在 A 中次数为 0，无需处理
    pub fn intersection_update(&mut self, other: &Self) {
        let distinct: Vec<Rc<T>> = {
            let mut values = self.unique_iter();
            std::iter::from_fn(|| values.next_shared().cloned()).collect()
        };
        for value in distinct {
            let current = self.count(&value);
            let target = current.min(other.count(&value));
            for _ in target..current {
                self.skiplist.remove(&value);
            }
        }
    }

    /// A <= B：A 中每个值的次数都不超过它在 B 中的次数
    pub fn is_subset(&self, other: &Self) -> bool {
        self.unique_iter().all(|value| self.count(value) <= other.count(value))
    }

    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// 交集为空
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.intersection(other).is_empty()
    }

    /// 按非降序在末尾追加 n 次，值与 self 共享
    fn push_back_n(&mut self, value: &Rc<T>, n: usize) {
        for _ in 0..n {
            self.skiplist.push_back_shared(Rc::clone(value));
        }
    }
}

impl MultiSet<Value> {
    /// 由原始参数构造，每个参数按 `Value::from_token` 解析。
    /// 遇到不可比较的参数时返回错误，已经插入的部分随之丢弃
    pub fn try_from_tokens<'t, I>(tokens: I) -> SLResult<Self>
    where
        I: IntoIterator<Item = &'t [u8]>,
    {
        Self::try_from_iter(tokens.into_iter().map(Value::from_token))
    }
}

impl<T> Default for MultiSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for MultiSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.skiplist == other.skiplist
    }
}

impl<'a, T> IntoIterator for &'a MultiSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialOrd> Add for &MultiSet<T> {
    type Output = SLResult<MultiSet<T>>;

    fn add(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl<T: PartialOrd> Sub for &MultiSet<T> {
    type Output = MultiSet<T>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.difference(rhs)
    }
}

impl<T: PartialOrd> SubAssign<&MultiSet<T>> for MultiSet<T> {
    fn sub_assign(&mut self, rhs: &MultiSet<T>) {
        self.difference_update(rhs)
    }
}

impl<T: PartialOrd> BitAnd for &MultiSet<T> {
    type Output = MultiSet<T>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl<T: PartialOrd> BitAndAssign<&MultiSet<T>> for MultiSet<T> {
    fn bitand_assign(&mut self, rhs: &MultiSet<T>) {
        self.intersection_update(rhs)
    }
}

/// `MultiSet([x1, x2, ..., xn])`，每次出现都单独列出
impl<T: fmt::Debug> fmt::Debug for MultiSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MultiSet(")?;
        f.debug_list().entries(self.iter()).finish()?;
        f.write_str(")")
    }
}

impl<T: fmt::Display> fmt::Display for MultiSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MultiSet([")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("])")
    }
}
