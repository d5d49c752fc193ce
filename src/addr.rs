//! Conversion between raw IPv4 addresses and their dotted-quad notation.
//!
//! ```
//! # use subnet_trie::addr;
//! assert_eq!(addr::to_dotted(0x0a0000fe), "10.0.0.254");
//! assert_eq!(addr::from_dotted("10.0.0.254"), Ok(0x0a0000fe));
//! assert!(addr::from_dotted("10.0.0").is_err());
//! ```

use std::net::Ipv4Addr;

use crate::Error;

/// Render a raw IPv4 address as `a.b.c.d`.
pub fn to_dotted(addr: u32) -> String {
    Ipv4Addr::from(addr).to_string()
}

/// Parse `a.b.c.d` into a raw IPv4 address. Surrounding whitespace is ignored.
pub fn from_dotted(s: &str) -> Result<u32, Error> {
    Ok(s.trim().parse::<Ipv4Addr>()?.into())
}
