//! Code to release addresses and prune the trie.

use log::debug;

use super::*;

impl<S> AddressAllocator<S>
where
    S: Subnet,
{
    /// Release a previously allocated address, making it available again. Nodes that are left
    /// without children are removed, so a fully released range collapses back into a missing
    /// node.
    ///
    /// Releasing an address outside of the subnet, or one that is not allocated, is an error
    /// and leaves the allocator unchanged.
    ///
    /// ```
    /// # use subnet_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pool = AddressAllocator::new("10.0.0.0/24".parse::<Ipv4Net>()?)?;
    /// let addr = pool.allocate(0)?;
    /// pool.release(addr)?;
    /// assert_eq!(pool.release(addr), Err(Error::NotAllocated { addr: 0x0a000001 }));
    /// assert_eq!(pool.release(0x0b000001), Err(Error::OutOfSubnet { addr: 0x0b000001 }));
    /// assert_eq!(pool.allocate(0)?, addr);
    /// # Ok(())
    /// # }
    /// ```
    pub fn release(&mut self, addr: S::R) -> Result<(), Error> {
        if !self.subnet.contains_addr(addr) {
            debug!(
                "refusing to release {:#x}: outside of subnet",
                Into::<u64>::into(addr)
            );
            return Err(Error::OutOfSubnet { addr: addr.into() });
        }

        // first, search for the leaf, remembering the way down.
        let host_bits = self.subnet.host_bits();
        let mut path = Vec::with_capacity(host_bits as usize);
        let mut idx = self.subnet_root;
        for bit in (0..host_bits).rev() {
            let right = bit_at(addr, bit);
            match self.table.get_child(idx, right) {
                Some(child) => {
                    path.push((idx, right));
                    idx = child;
                }
                None => return Err(self.not_allocated(addr)),
            }
        }
        if !self.table[idx].full {
            return Err(self.not_allocated(addr));
        }

        if path.is_empty() {
            // the subnet holds a single address, and its root is an anchor.
            self.table[idx].full = false;
        } else {
            self.prune(idx, path);
        }
        self.len -= 1;
        debug!("released {:#x}", Into::<u64>::into(addr));
        Ok(())
    }

    /// Remove `leaf`, then walk `path` upwards. Every ancestor that is left without children is
    /// removed as well; the others get their fullness recomputed. The subnet root (the first
    /// element of `path`) is never removed.
    fn prune(&mut self, leaf: usize, path: Vec<(usize, bool)>) {
        let mut to_remove = Some(leaf);
        for (parent, right) in path.into_iter().rev() {
            if let Some(child) = to_remove.take() {
                self.table.clear_child(parent, right);
                self.table.free_node(child);
            }
            if parent != self.subnet_root && self.table[parent].is_childless() {
                to_remove = Some(parent);
            } else {
                self.table.update_fullness(parent);
            }
        }
    }

    fn not_allocated(&self, addr: S::R) -> Error {
        debug!(
            "refusing to release {:#x}: not allocated",
            Into::<u64>::into(addr)
        );
        Error::NotAllocated { addr: addr.into() }
    }
}
