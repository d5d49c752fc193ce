//! Addresses that are taken out of the pool when an allocator is created.

use num_traits::NumCast;

use crate::Subnet;

/// Host offset of the address reserved for the server (or gateway) by default.
pub const DEFAULT_SERVER_OFFSET: u64 = 254;

/// Which addresses of the subnet are allocated right after construction. Reserved addresses are
/// regular allocations: they count as used in [`AddressAllocator::count_free`] and can be
/// released like any other address.
///
/// The default reserves the network address, the host with offset `254` and the broadcast
/// address. For a `/24`, these are `x.y.z.0`, `x.y.z.254` and `x.y.z.255`.
///
/// [`AddressAllocator::count_free`]: crate::AddressAllocator::count_free
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reservations {
    /// Reserve the network address (all host bits zero).
    pub network: bool,
    /// Reserve the host with the given offset from the network address. Skipped if the offset
    /// does not fit into the host bits of the subnet.
    pub server: Option<u64>,
    /// Reserve the broadcast address (all host bits one).
    pub broadcast: bool,
}

impl Default for Reservations {
    fn default() -> Self {
        Self {
            network: true,
            server: Some(DEFAULT_SERVER_OFFSET),
            broadcast: true,
        }
    }
}

impl Reservations {
    /// Reserve nothing; every address of the subnet can be allocated.
    pub fn none() -> Self {
        Self {
            network: false,
            server: None,
            broadcast: false,
        }
    }

    /// The addresses to reserve in `subnet`, in ascending order and without duplicates.
    pub(crate) fn addresses<S: Subnet>(&self, subnet: &S) -> Vec<S::R> {
        let network = subnet.network();
        let host_mask = !crate::subnet::mask_from_prefix_len::<S::R>(subnet.prefix_len());
        let server = self
            .server
            .and_then(|offset| <S::R as NumCast>::from(offset))
            .filter(|offset| *offset & host_mask == *offset)
            .map(|offset| network | offset);

        let mut addrs: Vec<S::R> = [
            self.network.then_some(network),
            server,
            self.broadcast.then(|| subnet.broadcast()),
        ]
        .into_iter()
        .flatten()
        .collect();
        addrs.sort_unstable();
        addrs.dedup();
        addrs
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_slash_24() {
        let addrs = Reservations::default().addresses(&(0x0a000000u32, 24));
        assert_eq!(addrs, vec![0x0a000000, 0x0a0000fe, 0x0a0000ff]);
    }

    #[test]
    fn default_slash_16() {
        let addrs = Reservations::default().addresses(&(0xc0a80000u32, 16));
        assert_eq!(addrs, vec![0xc0a80000, 0xc0a800fe, 0xc0a8ffff]);
    }

    #[test]
    fn server_outside_host_range() {
        let addrs = Reservations::default().addresses(&(0x0a000000u32, 28));
        assert_eq!(addrs, vec![0x0a000000, 0x0a00000f]);
        let addrs = Reservations::default().addresses(&(0x40u8, 4));
        assert_eq!(addrs, vec![0x40, 0x4f]);
    }

    #[test]
    fn single_address() {
        let addrs = Reservations::default().addresses(&(7u8, 8));
        assert_eq!(addrs, vec![7]);
    }

    #[test]
    fn nothing() {
        assert!(Reservations::none().addresses(&(0x0a000000u32, 24)).is_empty());
    }
}
