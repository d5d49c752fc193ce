//! Formatting implementation for the AddressAllocator

use std::fmt::{Debug, Formatter, Result};

use super::*;

impl<S: Subnet + Debug> Debug for AddressAllocator<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("AddressAllocator")
            .field("subnet", &self.subnet)
            .field(
                "trie",
                &DebugNode {
                    allocator: self,
                    idx: self.subnet_root,
                    addr: self.subnet.network().into(),
                    len: self.subnet.prefix_len(),
                },
            )
            .finish()
    }
}

/// Label of a node: the first address it covers, its depth, and whether it is full.
struct Label(u64, u8, bool);

impl Debug for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{:#x}/{}", self.0, self.1)?;
        if self.2 {
            f.write_str(" (full)")?;
        }
        Ok(())
    }
}

struct DebugNode<'a, S: Subnet> {
    allocator: &'a AddressAllocator<S>,
    idx: usize,
    addr: u64,
    len: u8,
}

impl<S: Subnet> DebugNode<'_, S> {
    fn child(&self, idx: usize, right: bool) -> Self {
        let shift = S::width() - self.len - 1;
        Self {
            allocator: self.allocator,
            idx,
            addr: if right {
                self.addr | (1 << shift)
            } else {
                self.addr
            },
            len: self.len + 1,
        }
    }
}

impl<S: Subnet> Debug for DebugNode<'_, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let node = &self.allocator.table[self.idx];
        let label = Label(self.addr, self.len, node.full);
        match (node.left, node.right) {
            (None, None) => label.fmt(f),
            (Some(left), None) => f
                .debug_map()
                .entry(&label, &self.child(left, false))
                .finish(),
            (None, Some(right)) => f
                .debug_map()
                .entry(&label, &self.child(right, true))
                .finish(),
            (Some(left), Some(right)) => f
                .debug_map()
                .entry(
                    &label,
                    &(self.child(left, false), self.child(right, true)),
                )
                .finish(),
        }
    }
}
