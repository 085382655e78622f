//! 最底层链表上的惰性遍历。
//! 迭代器借用整个跳表，遍历期间的 insert/remove 由借用检查器拒绝。

use std::rc::Rc;

use super::{arena::NodeArena, node::NodeId};

/// 依次返回最底层的每个值（包括重复值）
pub struct Iter<'a, T> {
    arena: &'a NodeArena<T>,
    /// 上一个返回的节点，初始为最底层的 head
    cursor: NodeId,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(arena: &'a NodeArena<T>, bottom_head: NodeId) -> Self {
        Self { arena, cursor: bottom_head }
    }

    /// 返回共享的值句柄，供集合运算把值搬到新表中
    pub(crate) fn next_shared(&mut self) -> Option<&'a Rc<T>> {
        let arena = self.arena;
        let next = arena.get(self.cursor).forward?;
        let value = arena.get(next).value()?;
        self.cursor = next;
        Some(value)
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_shared().map(|v| v.as_ref())
    }
}

/// 跳过相邻的重复值，每个不同的值只返回一次
pub struct UniqueIter<'a, T> {
    inner: Iter<'a, T>,
    last: Option<&'a Rc<T>>,
}

impl<'a, T: PartialEq> UniqueIter<'a, T> {
    pub(crate) fn new(inner: Iter<'a, T>) -> Self {
        Self { inner, last: None }
    }

    pub(crate) fn next_shared(&mut self) -> Option<&'a Rc<T>> {
        loop {
            let value = self.inner.next_shared()?;
            match self.last {
                Some(last) if last == value => continue,
                _ => {
                    self.last = Some(value);
                    return Some(value);
                }
            }
        }
    }
}

impl<'a, T: PartialEq> Iterator for UniqueIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_shared().map(|v| v.as_ref())
    }
}
