//! 跳表节点。
//! 每一层都是 `Head -> Element... -> Tail` 的单向链表，层与层之间通过 below 指针相连。
//! 节点统一放在 [`NodeArena`](super::arena::NodeArena) 中，用下标互相引用，避免 relink 时的别名问题。

use std::{cmp::Ordering, fmt, rc::Rc};

use crate::ds::error::{SLError, SLResult, ERROR_TYPE_SEARCH};

/// 节点在 arena 中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

pub(crate) enum NodeKind<T> {
    /// 每层的左哨兵，不存值
    Head,
    /// 每层的右哨兵，查找时视为 +∞
    Tail,
    /// 存放一个值。同一个值在各层的节点共享同一个 `Rc`
    Element(Rc<T>),
    /// 已回收的槽位
    Free,
}

pub(crate) struct Node<T> {
    pub(crate) kind: NodeKind<T>,
    /// 同层下一个节点，Tail 没有
    pub(crate) forward: Option<NodeId>,
    /// 下一层的对应节点，最底层为空
    pub(crate) below: Option<NodeId>,
}

impl<T> Node<T> {
    pub(crate) fn head(forward: NodeId, below: Option<NodeId>) -> Self {
        Self { kind: NodeKind::Head, forward: Some(forward), below }
    }

    pub(crate) fn tail() -> Self {
        Self { kind: NodeKind::Tail, forward: None, below: None }
    }

    pub(crate) fn element(value: Rc<T>, forward: NodeId, below: Option<NodeId>) -> Self {
        Self { kind: NodeKind::Element(value), forward: Some(forward), below }
    }

    pub(crate) fn free() -> Self {
        Self { kind: NodeKind::Free, forward: None, below: None }
    }

    pub(crate) fn value(&self) -> Option<&Rc<T>> {
        match &self.kind {
            NodeKind::Element(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn is_head(&self) -> bool {
        matches!(self.kind, NodeKind::Head)
    }

    pub(crate) fn is_tail(&self) -> bool {
        matches!(self.kind, NodeKind::Tail)
    }
}

impl<T: PartialOrd> Node<T> {
    /// 与查询值做三路比较。哨兵节点不参与比较，返回 `None`。
    fn compare(&self, query: &T) -> SLResult<Option<Ordering>> {
        match &self.kind {
            NodeKind::Element(v) => match v.as_ref().partial_cmp(query) {
                Some(ord) => Ok(Some(ord)),
                None => Err(SLError::IncomparableType(ERROR_TYPE_SEARCH)),
            },
            _ => Ok(None),
        }
    }

    /// 节点值严格小于查询值。哨兵恒为 false，所以 Tail 起到 +∞ 的作用
    pub(crate) fn is_before(&self, query: &T) -> SLResult<bool> {
        Ok(self.compare(query)? == Some(Ordering::Less))
    }

    /// 节点值等于查询值。哨兵恒为 false
    pub(crate) fn matches(&self, query: &T) -> SLResult<bool> {
        Ok(self.compare(query)? == Some(Ordering::Equal))
    }
}

impl<T: fmt::Display> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Head => write!(f, "head"),
            NodeKind::Tail => write!(f, "tail"),
            NodeKind::Element(v) => write!(f, "{}", v),
            NodeKind::Free => write!(f, "<free>"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        match &self.kind {
            NodeKind::Head => s.field("kind", &"head"),
            NodeKind::Tail => s.field("kind", &"tail"),
            NodeKind::Element(v) => s.field("value", v),
            NodeKind::Free => s.field("kind", &"free"),
        };
        s.field("forward", &self.forward).field("below", &self.below).finish()
    }
}
