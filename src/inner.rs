//! The node arena backing an [`AddressAllocator`](crate::AddressAllocator).

use std::collections::TryReserveError;
use std::ops::{Index, IndexMut};

/// Index of the absolute root of the trie (the node covering the entire address space).
pub(crate) const ROOT: usize = 0;

/// A single binary decision point in the address space. A node without children is a leaf and
/// stands for exactly one allocated address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
    pub(crate) full: bool,
}

impl Node {
    fn new(full: bool) -> Self {
        Self {
            left: None,
            right: None,
            full,
        }
    }

    #[inline(always)]
    pub(crate) fn is_childless(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Derive the fullness of an inner node from the fullness of its two children (`None` for an
/// absent child). An inner node is full iff both children are present and full. Leaves do not
/// go through this function; they are full from the moment they are created.
#[inline(always)]
pub(crate) fn derive_full(left: Option<bool>, right: Option<bool>) -> bool {
    matches!((left, right), (Some(true), Some(true)))
}

/// Arena of trie nodes, addressed by index. Slots of removed nodes are recycled through a free
/// list, so the arena never shrinks while the allocator is alive.
#[derive(Clone)]
pub(crate) struct Table {
    nodes: Vec<Node>,
    free: Vec<usize>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            nodes: vec![Node::new(false)],
            free: Vec::new(),
        }
    }
}

impl Index<usize> for Table {
    type Output = Node;

    fn index(&self, index: usize) -> &Self::Output {
        &self.nodes[index]
    }
}

impl IndexMut<usize> for Table {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.nodes[index]
    }
}

impl Table {
    /// Make sure that `additional` nodes can be created without reallocating. After this
    /// succeeds, `new_node` is infallible for the next `additional` calls.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let missing = additional.saturating_sub(self.free.len());
        self.nodes.try_reserve(missing)?;
        self.free.try_reserve(additional)
    }

    /// insert a new node into the table and return its index.
    #[inline(always)]
    pub(crate) fn new_node(&mut self, full: bool) -> usize {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Node::new(full);
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(Node::new(full));
            idx
        }
    }

    /// Return a detached node to the free list.
    #[inline(always)]
    pub(crate) fn free_node(&mut self, idx: usize) {
        debug_assert_ne!(idx, ROOT);
        self.nodes[idx] = Node::new(false);
        self.free.push(idx);
    }

    /// Get the child of a node, either to the left or the right
    #[inline(always)]
    pub(crate) fn get_child(&self, idx: usize, right: bool) -> Option<usize> {
        if right {
            self.nodes[idx].right
        } else {
            self.nodes[idx].left
        }
    }

    /// set the child of a node (either to the left or the right), and return the index of the old child.
    #[inline(always)]
    pub(crate) fn set_child(&mut self, idx: usize, child: usize, right: bool) -> Option<usize> {
        if right {
            self.nodes[idx].right.replace(child)
        } else {
            self.nodes[idx].left.replace(child)
        }
    }

    /// remove a child from a node (just the reference).
    #[inline(always)]
    pub(crate) fn clear_child(&mut self, idx: usize, right: bool) -> Option<usize> {
        if right {
            self.nodes[idx].right.take()
        } else {
            self.nodes[idx].left.take()
        }
    }

    /// Recompute `full` of an inner node from its children.
    #[inline(always)]
    pub(crate) fn update_fullness(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        let left = node.left.map(|c| self.nodes[c].full);
        let right = node.right.map(|c| self.nodes[c].full);
        self.nodes[idx].full = derive_full(left, right);
    }

    /// Detach the whole subtree below `idx` and put all of its nodes on the free list. `idx`
    /// itself stays in place, without children and not full.
    pub(crate) fn remove_children(&mut self, idx: usize) {
        let node = &mut self.nodes[idx];
        let mut to_free: Vec<usize> = [node.left.take(), node.right.take()]
            .into_iter()
            .flatten()
            .collect();
        node.full = false;
        while let Some(idx) = to_free.pop() {
            let node = &mut self.nodes[idx];
            if let Some(left) = node.left.take() {
                to_free.push(left)
            }
            if let Some(right) = node.right.take() {
                to_free.push(right)
            }
            self.free_node(idx);
        }
    }

    /// Number of nodes currently linked into the trie (including the root).
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }
}
