use std::{fmt, rc::Rc};

use rand::{rngs::StdRng, Rng};

use super::{
    arena::NodeArena,
    config::SkiplistConfig,
    iter::{Iter, UniqueIter},
    node::{Node, NodeId},
};
use crate::ds::error::{SLError, SLResult, ERROR_TYPE_INSERT};

/// 多层有序链表，允许重复值。
///
/// 每层是 `head -> ... -> tail`，上层的值是下层的子集，最底层保存全部值。
/// 值只需要实现 `PartialOrd`：`partial_cmp` 返回 `None` 即视为类型不可比较。
/// 互相可比较的值之间必须是全序。
pub struct Skiplist<T> {
    arena: NodeArena<T>,
    /// 最高层的 head
    top: NodeId,
    /// 最底层的 head，最底层永不丢弃
    bottom: NodeId,
    /// 层数，至少为 1
    height: usize,
    /// 最底层的元素个数
    length: usize,
    config: SkiplistConfig,
    rng: StdRng,
}

impl<T> Skiplist<T> {
    /// 使用默认概率创建
    pub fn new() -> Self {
        Self::build(SkiplistConfig::default())
    }

    pub fn with_probability(probability: f64) -> SLResult<Self> {
        Self::with_config(SkiplistConfig::new(probability))
    }

    pub fn with_config(config: SkiplistConfig) -> SLResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SkiplistConfig) -> Self {
        let mut arena = NodeArena::new();
        let tail = arena.alloc(Node::tail());
        let head = arena.alloc(Node::head(tail, None));
        Self {
            arena,
            top: head,
            bottom: head,
            height: 1,
            length: 0,
            rng: config.rng(),
            config,
        }
    }

    /// O(1)
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn probability(&self) -> f64 {
        self.config.probability
    }

    pub fn config(&self) -> &SkiplistConfig {
        &self.config
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.arena, self.bottom)
    }

    /// 各层的元素个数，最底层在前
    pub fn level_lengths(&self) -> Vec<usize> {
        let mut lengths: Vec<usize> = self
            .heads()
            .into_iter()
            .map(|head| {
                let mut cnt = 0;
                let mut cursor = self.arena.get(head).forward;
                while let Some(id) = cursor {
                    let node = self.arena.get(id);
                    if node.is_tail() {
                        break;
                    }
                    cnt += 1;
                    cursor = node.forward;
                }
                cnt
            })
            .collect();
        lengths.reverse();
        lengths
    }

    /// 各层的 head，最高层在前
    fn heads(&self) -> Vec<NodeId> {
        let mut heads = Vec::with_capacity(self.height);
        let mut cursor = Some(self.top);
        while let Some(head) = cursor {
            heads.push(head);
            cursor = self.arena.get(head).below;
        }
        heads
    }

    fn coin_flip(&mut self) -> bool {
        self.rng.gen::<f64>() < self.config.probability
    }

    /// 每层最后一个非 tail 节点，最高层在前
    fn last_path(&self) -> Vec<NodeId> {
        let mut path = Vec::with_capacity(self.height);
        let mut cursor = Some(self.top);
        while let Some(mut id) = cursor {
            while let Some(next) = self.arena.get(id).forward {
                if self.arena.get(next).is_tail() {
                    break;
                }
                id = next;
            }
            path.push(id);
            cursor = self.arena.get(id).below;
        }
        path
    }

    /// 在 `before` 之后链入一个新节点，返回新节点
    fn link_after(&mut self, before: NodeId, value: Rc<T>, below: Option<NodeId>) -> NodeId {
        let Some(forward) = self.arena.get(before).forward else {
            unreachable!("tail has no successor to link after");
        };
        let node = self.arena.alloc(Node::element(value, forward, below));
        self.arena.get_mut(before).forward = Some(node);
        node
    }

    /// 按 `path`（每层的前驱，最高层在前）自底向上链入新值。
    /// 最底层一定插入；往上每层需要下一层已插入且抛硬币成功，
    /// 已有层全部插入后继续抛硬币新增层。
    fn link_tower(&mut self, path: &[NodeId], value: Rc<T>) {
        let mut below = None;
        for (depth, &before) in path.iter().rev().enumerate() {
            if depth > 0 && !self.coin_flip() {
                self.length += 1;
                return;
            }
            below = Some(self.link_after(before, Rc::clone(&value), below));
        }
        while self.coin_flip() {
            let tail = self.arena.alloc(Node::tail());
            let elem = self.arena.alloc(Node::element(Rc::clone(&value), tail, below));
            let head = self.arena.alloc(Node::head(elem, Some(self.top)));
            self.top = head;
            self.height += 1;
            below = Some(elem);
            log::trace!("skiplist grows to {} levels", self.height);
        }
        self.length += 1;
    }

    /// 追加到末尾，不做任何比较。
    /// 调用方保证 `value` 不小于表中已有的任何值
    pub(crate) fn push_back_shared(&mut self, value: Rc<T>) {
        let path = self.last_path();
        self.link_tower(&path, value);
    }

    /// 丢弃顶部的空层，最底层保留
    fn discard_empty_levels(&mut self) {
        while self.height > 1 {
            let head = self.arena.get(self.top);
            let (Some(first), Some(below)) = (head.forward, head.below) else {
                break;
            };
            if !self.arena.get(first).is_tail() {
                break;
            }
            self.arena.free(first);
            self.arena.free(self.top);
            self.top = below;
            self.height -= 1;
            log::trace!("skiplist shrinks to {} levels", self.height);
        }
    }
}

impl<T: PartialOrd> Skiplist<T> {
    /// 从 `start` 开始，找到本层最后一个严格小于 `query` 的节点。
    /// tail 视为 +∞，所以循环必然终止
    fn search_before_level(&self, query: &T, start: NodeId) -> SLResult<NodeId> {
        let mut cursor = start;
        while let Some(next) = self.arena.get(cursor).forward {
            if !self.arena.get(next).is_before(query)? {
                break;
            }
            cursor = next;
        }
        Ok(cursor)
    }

    /// 自顶向下逐层查找前驱节点，最高层在前
    fn before_path(&self, query: &T) -> SLResult<Vec<NodeId>> {
        let mut path = Vec::with_capacity(self.height);
        let mut cursor = Some(self.top);
        while let Some(start) = cursor {
            let before = self.search_before_level(query, start)?;
            path.push(before);
            cursor = self.arena.get(before).below;
        }
        Ok(path)
    }

    /// 查找等于 `query` 的值。类型不可比较时返回错误
    pub fn search(&self, query: &T) -> SLResult<Option<&T>> {
        let mut cursor = Some(self.top);
        while let Some(start) = cursor {
            let before = self.search_before_level(query, start)?;
            let node = self.arena.get(before);
            if let Some(next) = node.forward {
                let next = self.arena.get(next);
                if next.matches(query)? {
                    return Ok(next.value().map(|v| v.as_ref()));
                }
            }
            cursor = node.below;
        }
        Ok(None)
    }

    /// 插入一个值。类型不可比较时返回错误，且表结构不变
    pub fn insert(&mut self, value: T) -> SLResult<()> {
        self.insert_shared(Rc::new(value))
    }

    pub(crate) fn insert_shared(&mut self, value: Rc<T>) -> SLResult<()> {
        // 所有比较都在链入之前完成，失败时不会留下任何节点
        let path = self
            .before_path(value.as_ref())
            .map_err(|_| SLError::IncomparableType(ERROR_TYPE_INSERT))?;
        self.link_tower(&path, value);
        Ok(())
    }

    /// 依次插入，遇到第一个不可比较的值即停止（之前的插入保留）
    pub fn insert_all<I: IntoIterator<Item = T>>(&mut self, values: I) -> SLResult<()> {
        for value in values {
            self.insert(value)?;
        }
        Ok(())
    }

    pub fn try_from_iter<I: IntoIterator<Item = T>>(values: I) -> SLResult<Self> {
        let mut list = Self::new();
        list.insert_all(values)?;
        Ok(list)
    }

    /// 删除一个等于 `query` 的值（有重复时只删一个）。
    /// 找不到或类型不可比较都返回 false，且表结构不变
    pub fn remove(&mut self, query: &T) -> bool {
        let path = match self.before_path(query) {
            Ok(path) => path,
            Err(err) => {
                log::debug!("remove treats query as absent: {}", err);
                return false;
            }
        };
        let mut removed = false;
        for &before in path.iter().rev() {
            let Some(target) = self.arena.get(before).forward else {
                break;
            };
            let node = self.arena.get(target);
            if !node.matches(query).unwrap_or(false) {
                break;
            }
            let after = node.forward;
            self.arena.get_mut(before).forward = after;
            self.arena.free(target);
            removed = true;
        }
        if !removed {
            return false;
        }
        self.length -= 1;
        self.discard_empty_levels();
        true
    }

    /// `query` 出现的次数。类型不可比较时为 0
    pub fn count(&self, query: &T) -> usize {
        let path = match self.before_path(query) {
            Ok(path) => path,
            Err(err) => {
                log::debug!("count treats query as absent: {}", err);
                return 0;
            }
        };
        let Some(&before) = path.last() else {
            return 0;
        };
        // 重复值在最底层相邻
        let mut cnt = 0;
        let mut cursor = self.arena.get(before).forward;
        while let Some(id) = cursor {
            let node = self.arena.get(id);
            if !node.matches(query).unwrap_or(false) {
                break;
            }
            cnt += 1;
            cursor = node.forward;
        }
        cnt
    }

    pub fn unique_iter(&self) -> UniqueIter<'_, T> {
        UniqueIter::new(self.iter())
    }

    /// 合并成新表：概率取两者平均，先插入 self 的全部值，再插入 other 的
    pub fn concat(&self, other: &Self) -> SLResult<Self> {
        let mut sum = Self::with_config(self.config.averaged(&other.config))?;
        sum.extend_from(self)?;
        sum.extend_from(other)?;
        Ok(sum)
    }

    /// 把 other 的全部值插入 self
    pub fn extend_from(&mut self, other: &Self) -> SLResult<()> {
        let mut values = other.iter();
        while let Some(value) = values.next_shared() {
            self.insert_shared(Rc::clone(value))?;
        }
        Ok(())
    }
}

impl<T> Default for Skiplist<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for Skiplist<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<'a, T> IntoIterator for &'a Skiplist<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// 逐层输出，最高层在前，例如 `head -> 1 -> 2 -> tail`
impl<T: fmt::Display> fmt::Display for Skiplist<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, head) in self.heads().into_iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            let mut cursor = Some(head);
            while let Some(id) = cursor {
                let node = self.arena.get(id);
                if !node.is_head() {
                    f.write_str(" -> ")?;
                }
                write!(f, "{}", node)?;
                cursor = node.forward;
            }
        }
        Ok(())
    }
}

impl<T: fmt::Debug> fmt::Debug for Skiplist<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skiplist")
            .field("length", &self.length)
            .field("height", &self.height)
            .field("probability", &self.config.probability)
            .field("nodes", &self.arena.live())
            .field("values", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
impl<T: PartialOrd + fmt::Debug> Skiplist<T> {
    /// 检查所有层的结构不变式
    pub(crate) fn assert_invariants(&self) {
        let heads = self.heads();
        assert_eq!(heads.len(), self.height);
        assert_eq!(*heads.last().unwrap(), self.bottom);
        let mut elements = 0;
        for (i, &head) in heads.iter().enumerate() {
            let is_bottom = i + 1 == heads.len();
            assert!(self.arena.get(head).is_head());
            let mut prev: Option<&Rc<T>> = None;
            let mut level_len = 0;
            let mut cursor = self.arena.get(head).forward;
            while let Some(id) = cursor {
                let node = self.arena.get(id);
                if node.is_tail() {
                    break;
                }
                let value = node.value().expect("only elements between head and tail");
                if let Some(prev) = prev {
                    assert!(prev.as_ref() <= value.as_ref(), "{:?} > {:?}", prev, value);
                }
                match node.below {
                    Some(below) => {
                        assert!(!is_bottom);
                        let below = self.arena.get(below).value().expect("below is an element");
                        assert!(Rc::ptr_eq(below, value));
                    }
                    None => assert!(is_bottom),
                }
                prev = Some(value);
                level_len += 1;
                cursor = node.forward;
            }
            assert!(cursor.is_some(), "every level ends in a tail");
            assert!(is_bottom || level_len > 0, "empty upper level retained");
            elements += level_len;
        }
        assert_eq!(self.level_lengths()[0], self.length);
        assert_eq!(self.iter().count(), self.length);
        assert_eq!(self.arena.live(), elements + 2 * self.height);
    }
}

#[cfg(test)]
mod test {
    use super::Skiplist;
    use crate::ds::{
        error::SLError,
        skiplist::config::{SkiplistConfig, DEFAULT_PROBABILITY},
        value::Value,
    };

    fn seeded(seed: u64) -> Skiplist<i32> {
        Skiplist::with_config(SkiplistConfig::default().with_seed(seed)).unwrap()
    }

    #[test]
    fn basis() {
        let mut list = seeded(1);
        assert_eq!(list.len(), 0);
        assert_eq!(list.height(), 1);
        assert_eq!(list.probability(), DEFAULT_PROBABILITY);
        list.insert(3).unwrap();
        list.insert(1).unwrap();
        list.insert(2).unwrap();
        list.assert_invariants();
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(list.search(&2).unwrap(), Some(&2));
        assert_eq!(list.search(&4).unwrap(), None);
        assert!(list.remove(&2));
        assert!(!list.remove(&2));
        list.assert_invariants();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn invalid_probability() {
        assert!(matches!(Skiplist::<i32>::with_probability(0.0), Err(SLError::ProbabilityTooLow(_))));
        assert!(matches!(Skiplist::<i32>::with_probability(1.0), Err(SLError::ProbabilityTooHigh(_))));
    }

    #[test]
    fn duplicates() {
        let mut list = seeded(2);
        for v in [5, 1, 5, 9, 5] {
            list.insert(v).unwrap();
        }
        assert_eq!(list.count(&5), 3);
        assert_eq!(list.count(&1), 1);
        assert_eq!(list.count(&7), 0);
        assert_eq!(list.unique_iter().copied().collect::<Vec<_>>(), vec![1, 5, 9]);
        assert!(list.remove(&5));
        assert_eq!(list.count(&5), 2);
        assert_eq!(list.len(), 4);
        list.assert_invariants();
    }

    #[test]
    fn grows_and_shrinks() {
        let mut list = seeded(3);
        for v in 0..1000 {
            list.insert(v % 97).unwrap();
        }
        list.assert_invariants();
        assert_eq!(list.len(), 1000);
        assert!(list.height() > 1);
        let lengths = list.level_lengths();
        assert_eq!(lengths[0], 1000);
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
        for v in 0..1000 {
            assert!(list.remove(&(v % 97)));
        }
        list.assert_invariants();
        assert!(list.is_empty());
        assert_eq!(list.height(), 1);
        assert_eq!(list.to_string(), "head -> tail");
    }

    #[test]
    fn removal_order_with_duplicates() {
        // 各种删除顺序下结构都保持一致
        for seed in 0..20 {
            let mut list = seeded(seed);
            for v in [4, 4, 4, 2, 4, 6, 4] {
                list.insert(v).unwrap();
            }
            while list.remove(&4) {
                list.assert_invariants();
            }
            assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![2, 6]);
        }
    }

    #[test]
    fn incomparable_insert_is_atomic() {
        let config = SkiplistConfig::default().with_seed(7);
        let mut list: Skiplist<Value> = Skiplist::with_config(config).unwrap();
        for i in 0..64 {
            list.insert(Value::from(format!("k{:02}", i))).unwrap();
        }
        // 比较在最高层就失败，此时还没有任何一层被修改
        assert!(list.height() > 1);
        let height = list.height();
        let levels = list.level_lengths();

        let err = list.insert(Value::from(5)).unwrap_err();
        assert!(err.is_incomparable());
        assert_eq!(list.len(), 64);
        assert_eq!(list.height(), height);
        assert_eq!(list.level_lengths(), levels);
        list.assert_invariants();

        assert!(list.search(&Value::from(5)).is_err());
        assert_eq!(list.count(&Value::from(5)), 0);
        assert!(!list.remove(&Value::from(5)));
        assert_eq!(list.len(), 64);
        assert_eq!(list.level_lengths(), levels);
    }

    #[test]
    fn empty_list_accepts_any_type() {
        let mut list: Skiplist<Value> = Skiplist::new();
        assert_eq!(list.search(&Value::from(1)).unwrap(), None);
        list.insert(Value::from(1.5)).unwrap();
        list.insert(Value::from(1)).unwrap();
        assert_eq!(list.iter().cloned().collect::<Vec<_>>(), vec![Value::from(1), Value::from(1.5)]);
    }

    #[test]
    fn concat() {
        let mut left = Skiplist::with_probability(0.25).unwrap();
        let mut right = Skiplist::with_probability(0.75).unwrap();
        left.insert_all([3, 1, 2]).unwrap();
        right.insert_all([2, 4]).unwrap();
        let sum = left.concat(&right).unwrap();
        sum.assert_invariants();
        assert_eq!(sum.len(), left.len() + right.len());
        assert!((sum.probability() - 0.5).abs() < 1e-12);
        assert_eq!(sum.iter().copied().collect::<Vec<_>>(), vec![1, 2, 2, 3, 4]);

        left.extend_from(&right).unwrap();
        assert_eq!(left, sum);
        assert_eq!(right.len(), 2);
    }

    #[test]
    fn concat_incomparable() {
        let mut left: Skiplist<Value> = Skiplist::new();
        let mut right: Skiplist<Value> = Skiplist::new();
        left.insert(Value::from(1)).unwrap();
        right.insert(Value::from("a")).unwrap();
        assert!(left.concat(&right).unwrap_err().is_incomparable());
        assert!(left.extend_from(&right).is_err());
        assert_eq!(left.len(), 1);
    }

    #[test]
    fn equality() {
        let a = Skiplist::try_from_iter([1, 2, 2]).unwrap();
        let b = Skiplist::try_from_iter([2, 1, 2]).unwrap();
        let c = Skiplist::try_from_iter([1, 2]).unwrap();
        let d = Skiplist::try_from_iter([1, 1, 2]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(Skiplist::<i32>::new(), Skiplist::new());
    }

    #[test]
    fn push_back() {
        let mut list = seeded(4);
        for v in [1, 1, 2, 5, 5, 8] {
            list.push_back_shared(std::rc::Rc::new(v));
        }
        list.assert_invariants();
        assert_eq!(list.count(&5), 2);
        list.insert(3).unwrap();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 1, 2, 3, 5, 5, 8]);
    }

    #[test]
    fn render() {
        let mut list = Skiplist::with_config(SkiplistConfig::new(0.01).with_seed(0)).unwrap();
        list.insert_all([2, 1]).unwrap();
        let rendered = list.to_string();
        assert!(rendered.ends_with("head -> 1 -> 2 -> tail"));
        assert_eq!(rendered.lines().count(), list.height());
        let debug = format!("{:?}", list);
        assert!(debug.contains("values: [1, 2]"));
    }
}
