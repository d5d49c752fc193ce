//! Description of the generic type `Subnet`.

#[cfg(feature = "ipnet")]
use ipnet::Ipv4Net;
#[cfg(feature = "ipnetwork")]
use ipnetwork::Ipv4Network;
use num_traits::{PrimInt, Unsigned, Zero};

/// Trait for defining the subnet from which addresses are allocated.
pub trait Subnet: Sized {
    /// How an address is represented. This must be one of `u8`, `u16`, `u32`, or `u64`.
    type R: Unsigned + PrimInt + Zero + Into<u64>;

    /// Get raw representation of the base address, ignoring the prefix length. The host bits
    /// may be set; they are masked away by [`Subnet::network`].
    fn repr(&self) -> Self::R;

    /// Prefix length, i.e., the number of fixed bits that identify the subnet.
    fn prefix_len(&self) -> u8;

    /// Number of bits in an address.
    fn width() -> u8 {
        <Self::R as Zero>::zero().count_zeros() as u8
    }

    /// Number of bits that identify a host within the subnet.
    fn host_bits(&self) -> u8 {
        Self::width().saturating_sub(self.prefix_len())
    }

    /// The network address, i.e., `self.repr()` with all host bits cleared. If you can guarantee
    /// that `repr` is already masked, then simply re-implement this function for your type.
    fn network(&self) -> Self::R {
        self.repr() & mask_from_prefix_len(self.prefix_len())
    }

    /// The broadcast address, i.e., the network address with all host bits set.
    fn broadcast(&self) -> Self::R {
        self.network() | !mask_from_prefix_len::<Self::R>(self.prefix_len())
    }

    /// Check if `addr` lies within the subnet.
    fn contains_addr(&self, addr: Self::R) -> bool {
        addr & mask_from_prefix_len(self.prefix_len()) == self.network()
    }
}

pub(crate) fn mask_from_prefix_len<R>(len: u8) -> R
where
    R: PrimInt + Zero,
{
    if len as u32 >= R::zero().count_zeros() {
        !R::zero()
    } else if len == 0 {
        R::zero()
    } else {
        !((!R::zero()) >> len as usize)
    }
}

/// Check if bit `bit` of `addr` is set, counted from the least significant bit.
#[inline(always)]
pub(crate) fn bit_at<R: PrimInt>(addr: R, bit: u8) -> bool {
    (addr >> bit as usize) & R::one() == R::one()
}

/// Number of addresses covered by a subtree with `bit` remaining host bits, as an address.
#[inline(always)]
pub(crate) fn block<R: PrimInt>(bit: u8) -> R {
    R::one() << bit as usize
}

#[cfg(feature = "ipnet")]
impl Subnet for Ipv4Net {
    type R = u32;

    fn repr(&self) -> u32 {
        self.addr().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix_len()
    }

    fn network(&self) -> u32 {
        self.network().into()
    }

    fn broadcast(&self) -> u32 {
        self.broadcast().into()
    }
}

#[cfg(feature = "ipnetwork")]
impl Subnet for Ipv4Network {
    type R = u32;

    fn repr(&self) -> u32 {
        self.ip().into()
    }

    fn prefix_len(&self) -> u8 {
        self.prefix()
    }

    fn network(&self) -> u32 {
        self.network().into()
    }
}

impl<R> Subnet for (R, u8)
where
    R: Unsigned + PrimInt + Zero + Into<u64>,
{
    type R = R;

    fn repr(&self) -> R {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }
}
