//! Search for the smallest free address at or above a candidate.

use log::trace;
use num_traits::{CheckedAdd, One};

use super::*;
use crate::subnet::block;

/// Outcome of walking the trie along the host bits of a candidate address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    /// The candidate is free.
    Free,
    /// The candidate lies within a full subtree that spans the lowest `bit` host bits.
    Blocked { bit: u8 },
    /// The whole subnet is allocated.
    Exhausted,
}

impl<S> AddressAllocator<S>
where
    S: Subnet,
{
    /// Walk from the subnet root towards `addr` until reaching either a missing node (the
    /// address is free) or a full node (the address is allocated).
    pub(crate) fn probe(&self, addr: S::R) -> Probe {
        let mut idx = self.subnet_root;
        if self.table[idx].full {
            return Probe::Exhausted;
        }
        for bit in (0..self.subnet.host_bits()).rev() {
            match self.table.get_child(idx, bit_at(addr, bit)) {
                None => return Probe::Free,
                Some(child) if self.table[child].full => return Probe::Blocked { bit },
                Some(child) => idx = child,
            }
        }
        // only a subnet with a single address can get here: its root is the leaf itself.
        debug_assert_eq!(self.subnet.host_bits(), 0);
        Probe::Free
    }

    /// Find the smallest free address that is greater or equal to `start`. `start` must lie
    /// within the subnet. Every blocked probe moves the candidate past the full subtree that
    /// blocked it.
    pub(crate) fn next_free(&self, start: S::R) -> Result<S::R, Error> {
        let mut candidate = start;
        loop {
            match self.probe(candidate) {
                Probe::Free => return Ok(candidate),
                Probe::Exhausted => return Err(Error::Exhausted),
                Probe::Blocked { bit } => {
                    let last = candidate | (block::<S::R>(bit) - <S::R as One>::one());
                    match last.checked_add(&<S::R as One>::one()) {
                        Some(next) if self.subnet.contains_addr(next) => {
                            trace!(
                                "{:#x} blocked by a full /{} subtree, skipping to {:#x}",
                                Into::<u64>::into(candidate),
                                S::width() - bit,
                                Into::<u64>::into(next)
                            );
                            candidate = next;
                        }
                        _ => return Err(Error::Exhausted),
                    }
                }
            }
        }
    }
}
