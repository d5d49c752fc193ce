//! This crate provides an allocator for unique addresses out of a single subnet, for instance
//! the address pool of a DHCP server. Addresses are handed out smallest-first (or smallest at or
//! above a requested address), and released addresses become available again immediately. The
//! allocator supports IPv4 subnets (from either [ipnet](https://docs.rs/ipnet/2.10.0) or
//! [ipnetwork](https://crates.io/crates/ipnetwork)), and any tuple `(R, u8)`, where `R` is one of
//! `u8`, `u16`, `u32`, or `u64`.
//!
//! ```
//! # use subnet_trie::*;
//! # use ipnet::Ipv4Net;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pool = AddressAllocator::new("10.0.0.0/24".parse::<Ipv4Net>()?)?;
//! // 10.0.0.0, 10.0.0.254, and 10.0.0.255 are reserved.
//! assert_eq!(pool.count_free(), 253);
//! assert_eq!(addr::to_dotted(pool.allocate(0)?), "10.0.0.1");
//! assert_eq!(addr::to_dotted(pool.allocate(0)?), "10.0.0.2");
//! pool.release(addr::from_dotted("10.0.0.1")?)?;
//! assert_eq!(addr::to_dotted(pool.allocate(0)?), "10.0.0.1");
//! # Ok(())
//! # }
//! ```
//!
//! # Description of the Tree
//!
//! The allocator is a binary trie over the bits of an address, most significant bit first. The
//! path from the root to a node at depth `d` fixes the first `d` bits, so the node covers a range
//! of `2^(W - d)` addresses, where `W` is the address width. The first `P` levels (the prefix
//! length of the subnet) form a chain that anchors the *subnet root*, whose subtree covers
//! exactly the subnet. These anchors are created once and never removed.
//!
//! Below the subnet root, the trie only contains what is allocated:
//!
//! - A missing child means that its entire range is free.
//! - A node at depth `W` is a leaf and stands for a single allocated address.
//! - Every other node is *full* iff both of its children exist and are full.
//!
//! Nodes are stored in an arena and reference each other by index. Releasing an address removes
//! its leaf and every ancestor that is left without children, so the trie never holds more than
//! `O(n * (W - P))` nodes for `n` allocated addresses.
//!
//! # Searching for a free address
//!
//! To find the smallest free address at or above a candidate, we walk from the subnet root along
//! the bits of the candidate. If we hit a missing node, the candidate is free. If we hit a full
//! node, the candidate moves to the first address after that node's range, and we start again.
//! Any exhausted range is thus skipped in a single step, no matter how large it is.
//!
//! # Operations on the tree
//!
//! The following are the computational complexities of the functions, where `n` is the number of
//! allocated addresses and `h = W - P` is the number of host bits.
//!
//! | Operation                          | Complexity  |
//! |------------------------------------|-------------|
//! | `new`, `with_reservations`         | `O(W)`      |
//! | `allocate`                         | `O(h^2)`    |
//! | `reserve`, `release`               | `O(h)`      |
//! | `is_allocated`                     | `O(h)`      |
//! | `count_free`, `iter`, `clear`      | `O(n * h)`  |
//! | `len`, `is_empty`, `capacity`      | `O(1)`      |
//!
//! # Reserved addresses
//!
//! By default, the network address, the host with offset `254`, and the broadcast address are
//! allocated right after construction (see [`Reservations`]). They count as allocated in
//! [`AddressAllocator::count_free`].
//!
//! # Concurrency
//!
//! All operations run to completion without blocking. The allocator has no internal locking;
//! callers sharing one allocator between threads must serialize all calls, e.g., behind a
//! `Mutex`.

#![allow(clippy::collapsible_else_if)]
#![deny(missing_docs)]

mod error;
mod fmt;
mod inner;
mod reserve;
mod subnet;
#[cfg(test)]
mod fuzzing;

pub mod addr;
pub mod allocator;

pub use allocator::AddressAllocator;
pub use error::Error;
pub use reserve::{Reservations, DEFAULT_SERVER_OFFSET};
pub use subnet::Subnet;
