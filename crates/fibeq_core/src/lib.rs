//! Basic vocabulary shared by every fibeq crate: IPv4 prefixes as bit paths, next-hop
//! identifiers, and the error raised for an out-of-range prefix.
pub mod parser;
pub mod prefix;

pub use crate::prefix::{Prefix, PrefixError, ADDR_BITS};

/// Identifier an address resolves to (an outgoing link, a neighbor router, ...).
pub type NextHop = u32;

/// The next hop of an address that no entry covers.
pub const NO_ENTRY: NextHop = 0;

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{
        ipv4_prefix,
        prefix::{Prefix, PrefixError, ADDR_BITS},
        NextHop, NO_ENTRY,
    };
}
