//! 节点的连续存储，回收的槽位通过 free list 复用

use super::node::{Node, NodeId};

pub(crate) struct NodeArena<T> {
    nodes: Vec<Node<T>>,
    free_list: Vec<NodeId>,
}

impl<T> NodeArena<T> {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new(), free_list: Vec::new() }
    }

    pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeId {
        if let Some(id) = self.free_list.pop() {
            self.nodes[id.0] = node;
            id
        } else {
            let id = NodeId(self.nodes.len());
            self.nodes.push(node);
            id
        }
    }

    /// 回收节点，返回原节点（其中的值随之释放或交还给调用方）
    pub(crate) fn free(&mut self, id: NodeId) -> Node<T> {
        let old = std::mem::replace(&mut self.nodes[id.0], Node::free());
        self.free_list.push(id);
        old
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.0]
    }

    /// 正在使用中的节点数
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }
}
