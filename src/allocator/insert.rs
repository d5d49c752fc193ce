//! Code to write a newly allocated address into the trie.

use super::*;

impl<S> AddressAllocator<S>
where
    S: Subnet,
{
    /// Materialize the path from the subnet root to `addr`, make the last node a full leaf, and
    /// recompute the fullness of every node on the way back up.
    ///
    /// `addr` must be free, and the table must have room for `host_bits` new nodes (see
    /// [`Table::reserve`]), so this function cannot fail halfway.
    pub(super) fn insert(&mut self, addr: S::R) {
        let host_bits = self.subnet.host_bits();
        let mut path = Vec::with_capacity(host_bits as usize);
        let mut idx = self.subnet_root;
        for bit in (0..host_bits).rev() {
            path.push(idx);
            let right = bit_at(addr, bit);
            idx = match self.table.get_child(idx, right) {
                Some(child) => child,
                None => {
                    let child = self.table.new_node(bit == 0);
                    self.table.set_child(idx, child, right);
                    child
                }
            };
        }
        debug_assert!(self.table[idx].is_childless());
        self.table[idx].full = true;

        for idx in path.into_iter().rev() {
            self.table.update_fullness(idx);
        }
    }
}
