//! Error type of the address allocator.

use std::collections::TryReserveError;
use std::net::AddrParseError;

use thiserror::Error;

/// Everything that can go wrong while creating an allocator, or while allocating and releasing
/// addresses. Addresses are reported in their raw representation, widened to `u64`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The prefix length is larger than the number of bits in an address.
    #[error("prefix length {len} exceeds the address width of {width} bits")]
    InvalidPrefixLen {
        /// The requested prefix length.
        len: u8,
        /// Number of bits in an address.
        width: u8,
    },

    /// The nodes anchoring the subnet, or the reserved addresses, could not be allocated. The
    /// partially built allocator has been dropped.
    #[error("cannot allocate the nodes anchoring the subnet: {0}")]
    Construction(#[source] TryReserveError),

    /// No free address at or above the requested one is left in the subnet.
    #[error("subnet exhausted: no free address left at or above the requested one")]
    Exhausted,

    /// The trie nodes for a new address could not be allocated. The allocator is unchanged.
    #[error("cannot allocate trie nodes for a new address: {0}")]
    AllocationFailure(#[source] TryReserveError),

    /// The address does not belong to the managed subnet.
    #[error("address {addr:#x} is outside of the managed subnet")]
    OutOfSubnet {
        /// The offending address.
        addr: u64,
    },

    /// The address is not currently allocated.
    #[error("address {addr:#x} is not allocated")]
    NotAllocated {
        /// The offending address.
        addr: u64,
    },

    /// The address is already allocated.
    #[error("address {addr:#x} is already allocated")]
    AlreadyAllocated {
        /// The offending address.
        addr: u64,
    },

    /// A textual address could not be parsed.
    #[error("invalid address: {0}")]
    Parse(#[from] AddrParseError),
}
