//! Implementation of the address allocator.

use log::debug;

use crate::inner::{Table, ROOT};
use crate::subnet::bit_at;
use crate::{Error, Reservations, Subnet};

mod insert;
mod iter;
mod remove;
mod search;

pub use iter::Iter;
pub(crate) use search::Probe;

/// Allocator of unique addresses from a single subnet, implemented as a binary trie.
///
/// Each node of the trie covers a contiguous range of addresses and carries a `full` flag that
/// tells whether every address in that range is allocated. A missing node means that its whole
/// range is free. Searching for a free address therefore skips entire exhausted ranges at once,
/// and the memory footprint is bounded by the number of allocated addresses times the number of
/// host bits.
///
/// The allocator does no internal synchronization. To share it between threads, put it behind a
/// single `Mutex` (or let a single task own it) and serialize all calls.
#[derive(Clone)]
pub struct AddressAllocator<S: Subnet> {
    pub(crate) subnet: S,
    pub(crate) table: Table,
    /// Node whose subtree covers exactly the subnet.
    pub(crate) subnet_root: usize,
    len: usize,
    reservations: Reservations,
}

impl<S> AddressAllocator<S>
where
    S: Subnet,
{
    /// Create an allocator for `subnet`, with the [default reservations](Reservations::default)
    /// (network address, host `254`, and broadcast address) already allocated.
    ///
    /// ```
    /// # use subnet_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = AddressAllocator::new("10.0.0.0/24".parse::<Ipv4Net>()?)?;
    /// assert_eq!(pool.count_free(), 253);
    /// assert!(pool.is_allocated(0x0a0000fe));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(subnet: S) -> Result<Self, Error> {
        Self::with_reservations(subnet, Reservations::default())
    }

    /// Create an allocator for `subnet` and allocate the addresses selected by `reservations`.
    ///
    /// ```
    /// # use subnet_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = AddressAllocator::with_reservations((0xc0a80100u32, 24), Reservations::none())?;
    /// assert_eq!(pool.count_free(), 256);
    /// assert!(AddressAllocator::new((0u32, 33)).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_reservations(subnet: S, reservations: Reservations) -> Result<Self, Error> {
        let width = S::width();
        let prefix_len = subnet.prefix_len();
        if prefix_len > width {
            return Err(Error::InvalidPrefixLen {
                len: prefix_len,
                width,
            });
        }

        let mut table = Table::default();
        table
            .reserve(prefix_len as usize)
            .map_err(Error::Construction)?;

        // anchor the subnet: one node per fixed bit, never pruned.
        let network = subnet.network();
        let mut idx = ROOT;
        for bit in (subnet.host_bits()..width).rev() {
            let right = bit_at(network, bit);
            let child = table.new_node(false);
            table.set_child(idx, child, right);
            idx = child;
        }

        let mut allocator = Self {
            subnet,
            table,
            subnet_root: idx,
            len: 0,
            reservations,
        };
        allocator.apply_reservations()?;

        debug!(
            "created allocator for {:#x}/{} with {} free addresses",
            Into::<u64>::into(network),
            prefix_len,
            allocator.count_free()
        );
        Ok(allocator)
    }

    /// The subnet managed by this allocator.
    pub fn subnet(&self) -> &S {
        &self.subnet
    }

    /// The reservations that were applied when this allocator was created.
    pub fn reservations(&self) -> &Reservations {
        &self.reservations
    }

    /// Total number of addresses in the subnet, reserved ones included.
    pub fn capacity(&self) -> u128 {
        1u128 << self.subnet.host_bits()
    }

    /// Number of addresses that are currently allocated, reserved ones included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if not a single address is allocated.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocate the smallest free address that is greater or equal to `requested`. A request of
    /// `0` (or any other address below the subnet) starts the search at the network address.
    /// A request above the subnet, or a full subnet, results in [`Error::Exhausted`].
    ///
    /// ```
    /// # use subnet_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pool = AddressAllocator::new("10.0.0.0/24".parse::<Ipv4Net>()?)?;
    /// assert_eq!(pool.allocate(0)?, 0x0a000001);
    /// assert_eq!(pool.allocate(0)?, 0x0a000002);
    /// assert_eq!(pool.allocate(0x0a000002)?, 0x0a000003);
    /// assert_eq!(pool.allocate(0x0a000080)?, 0x0a000080);
    /// assert_eq!(pool.allocate(0x0a0000fe), Err(Error::Exhausted));
    /// # Ok(())
    /// # }
    /// ```
    pub fn allocate(&mut self, requested: S::R) -> Result<S::R, Error> {
        let addr = match self.start_of_search(requested) {
            Some(start) => self.next_free(start),
            None => Err(Error::Exhausted),
        }
        .map_err(|e| {
            debug!(
                "cannot allocate at or above {:#x}: {}",
                Into::<u64>::into(requested),
                e
            );
            e
        })?;
        self.table
            .reserve(self.subnet.host_bits() as usize)
            .map_err(Error::AllocationFailure)?;
        self.insert(addr);
        self.len += 1;
        debug!("allocated {:#x}", Into::<u64>::into(addr));
        Ok(addr)
    }

    /// Allocate exactly `addr`.
    ///
    /// ```
    /// # use subnet_trie::*;
    /// # use ipnet::Ipv4Net;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pool = AddressAllocator::new("10.0.0.0/24".parse::<Ipv4Net>()?)?;
    /// pool.reserve(0x0a000001)?;
    /// assert_eq!(pool.reserve(0x0a000001), Err(Error::AlreadyAllocated { addr: 0x0a000001 }));
    /// assert_eq!(pool.reserve(0x0a000101), Err(Error::OutOfSubnet { addr: 0x0a000101 }));
    /// assert_eq!(pool.allocate(0)?, 0x0a000002);
    /// # Ok(())
    /// # }
    /// ```
    pub fn reserve(&mut self, addr: S::R) -> Result<(), Error> {
        if !self.subnet.contains_addr(addr) {
            return Err(Error::OutOfSubnet { addr: addr.into() });
        }
        if !matches!(self.probe(addr), Probe::Free) {
            return Err(Error::AlreadyAllocated { addr: addr.into() });
        }
        self.table
            .reserve(self.subnet.host_bits() as usize)
            .map_err(Error::AllocationFailure)?;
        self.insert(addr);
        self.len += 1;
        debug!("reserved {:#x}", Into::<u64>::into(addr));
        Ok(())
    }

    /// Check if `addr` is currently allocated. Addresses outside of the subnet are never
    /// allocated.
    pub fn is_allocated(&self, addr: S::R) -> bool {
        self.subnet.contains_addr(addr) && !matches!(self.probe(addr), Probe::Free)
    }

    /// Count the addresses that can still be allocated. Reserved addresses count as allocated.
    /// This operation walks all nodes that are not full, and is `O(n)` in the number of
    /// allocated addresses.
    ///
    /// ```
    /// # use subnet_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pool = AddressAllocator::new((0x0a000000u32, 24))?;
    /// assert_eq!(pool.count_free(), 253);
    /// let addr = pool.allocate(0)?;
    /// assert_eq!(pool.count_free(), 252);
    /// pool.release(addr)?;
    /// assert_eq!(pool.count_free(), 253);
    /// # Ok(())
    /// # }
    /// ```
    pub fn count_free(&self) -> u128 {
        self.capacity() - self.count_full()
    }

    /// Release every address and apply the reservations again, bringing the allocator back into
    /// the state right after construction. The memory of the arena is kept.
    pub fn clear(&mut self) -> Result<(), Error> {
        self.table.remove_children(self.subnet_root);
        self.len = 0;
        self.apply_reservations()
    }

    /// Iterate over all allocated addresses in ascending order.
    ///
    /// ```
    /// # use subnet_trie::*;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pool = AddressAllocator::new((0xc0a80000u32, 24))?;
    /// pool.allocate(0)?;
    /// assert_eq!(
    ///     pool.iter().collect::<Vec<_>>(),
    ///     vec![0xc0a80000, 0xc0a80001, 0xc0a800fe, 0xc0a800ff]
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn iter(&self) -> Iter<'_, S> {
        self.into_iter()
    }
}

/// Private function implementations
impl<S> AddressAllocator<S>
where
    S: Subnet,
{
    /// Where the search for `requested` begins, or `None` if it lies above the subnet.
    fn start_of_search(&self, requested: S::R) -> Option<S::R> {
        if requested < self.subnet.network() {
            Some(self.subnet.network())
        } else if requested <= self.subnet.broadcast() {
            Some(requested)
        } else {
            None
        }
    }

    fn apply_reservations(&mut self) -> Result<(), Error> {
        for addr in self.reservations.addresses(&self.subnet) {
            self.reserve(addr).map_err(|e| match e {
                Error::AllocationFailure(e) => Error::Construction(e),
                e => e,
            })?;
        }
        Ok(())
    }

    /// Sum the sizes of all maximal full subtrees below the subnet root.
    fn count_full(&self) -> u128 {
        let mut full = 0;
        let mut to_visit = vec![(self.subnet_root, self.subnet.host_bits())];
        while let Some((idx, bits)) = to_visit.pop() {
            let node = &self.table[idx];
            if node.full {
                full += 1u128 << bits;
            } else {
                to_visit.extend(
                    [node.left, node.right]
                        .into_iter()
                        .flatten()
                        .map(|child| (child, bits - 1)),
                );
            }
        }
        full
    }

    /// Walk the whole trie and panic if any structural invariant is violated.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let width = S::width();
        let prefix_len = self.subnet.prefix_len();

        // the anchor chain
        let mut idx = ROOT;
        for bit in (self.subnet.host_bits()..width).rev() {
            let right = bit_at(self.subnet.network(), bit);
            let node = &self.table[idx];
            assert_eq!(node.left.is_some() as u8 + node.right.is_some() as u8, 1);
            assert!(!node.full, "anchor above the subnet root is full");
            idx = self.table.get_child(idx, right).expect("broken anchor chain");
        }
        assert_eq!(idx, self.subnet_root);

        // the host part
        let mut reachable = prefix_len as usize + 1;
        let mut leaves = 0;
        let mut to_visit = vec![(self.subnet_root, prefix_len)];
        while let Some((idx, depth)) = to_visit.pop() {
            let node = &self.table[idx];
            if depth == width {
                assert!(node.is_childless(), "node below full depth");
                if idx != self.subnet_root || node.full {
                    assert!(node.full, "leaf at depth {depth} is not full");
                    leaves += 1;
                }
                continue;
            }
            if idx != self.subnet_root {
                assert!(!node.is_childless(), "pruned node left behind at depth {depth}");
            }
            let left = node.left.map(|c| self.table[c].full);
            let right = node.right.map(|c| self.table[c].full);
            assert_eq!(
                node.full,
                crate::inner::derive_full(left, right),
                "wrong fullness at depth {depth}"
            );
            for child in [node.left, node.right].into_iter().flatten() {
                reachable += 1;
                to_visit.push((child, depth + 1));
            }
        }
        assert_eq!(reachable, self.table.live(), "leaked nodes");
        assert_eq!(leaves, self.len, "wrong number of leaves");
        assert_eq!(self.count_free(), self.capacity() - self.len as u128);
    }
}

#[cfg(feature = "ipnet")]
impl AddressAllocator<ipnet::Ipv4Net> {
    /// Allocate an IPv4 address, preferably `requested`, or the next larger free one. Without a
    /// preference, the smallest free address is returned.
    ///
    /// ```
    /// # use subnet_trie::*;
    /// # use std::net::Ipv4Addr;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut pool = AddressAllocator::new("192.168.1.0/24".parse::<ipnet::Ipv4Net>()?)?;
    /// assert_eq!(pool.allocate_ip(None)?, Ipv4Addr::new(192, 168, 1, 1));
    /// assert_eq!(pool.allocate_ip(Some("192.168.1.100".parse()?))?, Ipv4Addr::new(192, 168, 1, 100));
    /// pool.release_ip(Ipv4Addr::new(192, 168, 1, 1))?;
    /// assert_eq!(pool.allocate_ip(None)?, Ipv4Addr::new(192, 168, 1, 1));
    /// # Ok(())
    /// # }
    /// ```
    pub fn allocate_ip(
        &mut self,
        requested: Option<std::net::Ipv4Addr>,
    ) -> Result<std::net::Ipv4Addr, Error> {
        self.allocate(requested.map(u32::from).unwrap_or(0))
            .map(Into::into)
    }

    /// Release a previously allocated IPv4 address.
    pub fn release_ip(&mut self, addr: std::net::Ipv4Addr) -> Result<(), Error> {
        self.release(addr.into())
    }
}
