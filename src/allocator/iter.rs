//! Module that contains the implementation for the iterators

use super::*;
use crate::subnet::block;

/// An iterator over all allocated addresses of an [`AddressAllocator`] in ascending order.
#[derive(Clone)]
pub struct Iter<'a, S: Subnet> {
    pub(crate) allocator: &'a AddressAllocator<S>,
    /// Nodes left to visit, with the address of the first host they cover and the number of host
    /// bits below them.
    pub(crate) nodes: Vec<(usize, S::R, u8)>,
}

impl<'a, S: Subnet> Iterator for Iter<'a, S> {
    type Item = S::R;

    fn next(&mut self) -> Option<S::R> {
        while let Some((cur, addr, bits)) = self.nodes.pop() {
            let node = &self.allocator.table[cur];
            if bits == 0 {
                if node.full {
                    return Some(addr);
                }
                continue;
            }
            if let Some(right) = node.right {
                self.nodes
                    .push((right, addr | block::<S::R>(bits - 1), bits - 1));
            }
            if let Some(left) = node.left {
                self.nodes.push((left, addr, bits - 1));
            }
        }
        None
    }
}

impl<'a, S: Subnet> IntoIterator for &'a AddressAllocator<S> {
    type Item = S::R;
    type IntoIter = Iter<'a, S>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            allocator: self,
            nodes: vec![(self.subnet_root, self.subnet.network(), self.subnet.host_bits())],
        }
    }
}
