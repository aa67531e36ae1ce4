//! # Prefix
//!
//! A [Prefix] is at once a path in a binary trie (the left/right choices taken from the root,
//! most significant bit first) and the CIDR block that path stands for. Bits past the prefix
//! length are kept at zero, so two equal blocks always compare equal.
//!
//! ## Example
//! ```
//! use fibeq_core::prefix::Prefix;
//!
//! let p: Prefix = "10.128.0.0/9".parse().unwrap();
//! assert_eq!(p.to_string(), "10.128.0.0/9");
//! assert_eq!(format!("{:b}", p), "000010101/9");
//! assert!(p.contains(u32::from_be_bytes([10, 200, 1, 1])));
//! assert_eq!(p.parent().unwrap().to_string(), "10.0.0.0/8");
//! ```

use std::{
    cmp::Ordering,
    fmt::{Binary, Display, Formatter},
    net::Ipv4Addr,
    str::FromStr,
};

use bitvec::prelude::*;
use nom::{combinator::all_consuming, Finish};
use thiserror::Error;

use crate::parser::parse_prefix_parts;

/// Width of an address in bits, also the deepest possible trie level.
pub const ADDR_BITS: usize = u32::BITS as usize;

pub type PrefixBitOrder = Msb0;
pub type PrefixBitStore = u32;

type PrefixBits = BitArray<[PrefixBitStore; 1], PrefixBitOrder>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefixError {
    #[error("invalid prefix length {len}, expected 0..=32")]
    InvalidPrefix { len: u32 },
    #[error("malformed prefix `{0}`")]
    Malformed(String),
}

#[derive(Debug, Default, Eq, PartialEq, Hash, Clone, Copy)]
pub struct Prefix {
    bits: PrefixBits,
    len: usize,
}

impl Prefix {
    /// Builds the block `addr/len`, clearing host bits. Fails when `len` is larger than 32.
    pub fn new(addr: u32, len: u32) -> Result<Self, PrefixError> {
        if len as usize > ADDR_BITS {
            return Err(PrefixError::InvalidPrefix { len });
        }
        let len = len as usize;
        let mut bits = PrefixBits::new([addr]);
        bits[len..].fill(false);
        Ok(Prefix { bits, len })
    }

    /// The empty path, i.e. `0.0.0.0/0`.
    #[inline]
    pub fn root() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Base address of the block.
    #[inline]
    pub fn addr(&self) -> u32 {
        self.bits.into_inner()[0]
    }

    #[inline]
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.addr())
    }

    /// Last address of the block.
    #[inline]
    pub fn last_addr(&self) -> u32 {
        let mut bits = self.bits;
        bits[self.len..].fill(true);
        bits.into_inner()[0]
    }

    /// Number of addresses in the block.
    #[inline]
    pub fn size(&self) -> u64 {
        1u64 << (ADDR_BITS - self.len)
    }

    /// The `i`-th path bit, counted from the most significant one.
    #[inline]
    pub fn bit(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        self.bits[i]
    }

    /// Path bits from the root down.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits[..self.len].iter().by_vals()
    }

    /// One level deeper, taking the right branch when `bit` is set.
    #[inline]
    pub fn child(&self, bit: bool) -> Prefix {
        debug_assert!(self.len < ADDR_BITS, "{} has no children", self);
        let mut child = *self;
        child.bits.set(self.len, bit);
        child.len += 1;
        child
    }

    #[inline]
    pub fn parent(&self) -> Option<Prefix> {
        if self.len == 0 {
            return None;
        }
        let mut parent = *self;
        parent.len -= 1;
        parent.bits.set(parent.len, false);
        Some(parent)
    }

    /// `other` shares this block's parent and sits on the other branch.
    pub fn is_sibling_of(&self, other: &Prefix) -> bool {
        self.len == other.len
            && self.len > 0
            && self.bits[..self.len - 1] == other.bits[..self.len - 1]
            && self.bits[self.len - 1] != other.bits[self.len - 1]
    }

    pub fn contains(&self, addr: u32) -> bool {
        let addr = PrefixBits::new([addr]);
        addr[..self.len] == self.bits[..self.len]
    }

    /// Whether `other` lies inside this block (a block covers itself).
    pub fn covers(&self, other: &Prefix) -> bool {
        self.len <= other.len && self.bits[..self.len] == other.bits[..self.len]
    }
}

impl PartialOrd for Prefix {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Prefix {
    /// Ascending base address, wider blocks first.
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.addr()
            .cmp(&other.addr())
            .then_with(|| self.len.cmp(&other.len))
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network(), self.len)
    }
}

impl Binary for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for bit in self.bits() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        write!(f, "/{}", self.len)
    }
}

impl FromStr for Prefix {
    type Err = PrefixError;

    /// Accepts `a.b.c.d/len` as well as `<u32>/len`, the same text the table loader accepts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed: Result<_, nom::error::Error<&str>> =
            all_consuming(parse_prefix_parts)(s.trim()).finish();
        let (_, (addr, len)) = parsed.map_err(|_| PrefixError::Malformed(s.to_owned()))?;
        Prefix::new(addr, len)
    }
}

impl From<Ipv4Addr> for Prefix {
    /// A host route.
    fn from(addr: Ipv4Addr) -> Self {
        let bits = PrefixBits::new([addr.into()]);
        Prefix {
            bits,
            len: ADDR_BITS,
        }
    }
}

pub mod macros {
    /// Build a [Prefix](crate::Prefix) from a literal, panicking on a malformed one.
    /// ```
    /// use fibeq_core::ipv4_prefix;
    /// let _ = ipv4_prefix!("192.168.1.0/24");
    /// let _ = ipv4_prefix!("3232235776/32");
    /// let _ = ipv4_prefix!("0/0");
    /// ```
    #[macro_export]
    macro_rules! ipv4_prefix {
        ($value:expr) => {
            $value
                .parse::<$crate::Prefix>()
                .expect("Wrong format of IPv4 prefix")
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipv4_prefix;

    #[test]
    fn test_new_masks_host_bits() {
        let p = Prefix::new(u32::from_be_bytes([10, 1, 2, 3]), 8).unwrap();
        assert_eq!(p.addr(), u32::from_be_bytes([10, 0, 0, 0]));
        assert_eq!(p.len(), 8);
        assert_eq!(p.to_string(), "10.0.0.0/8");
        assert_eq!(p.last_addr(), u32::from_be_bytes([10, 255, 255, 255]));
        assert_eq!(p.size(), 1 << 24);
    }

    #[test]
    fn test_invalid_length() {
        assert_eq!(
            Prefix::new(0, 33),
            Err(PrefixError::InvalidPrefix { len: 33 })
        );
        assert_eq!(
            "10.0.0.0/40".parse::<Prefix>(),
            Err(PrefixError::InvalidPrefix { len: 40 })
        );
        assert!(matches!(
            "10.0.0/8".parse::<Prefix>(),
            Err(PrefixError::Malformed(_))
        ));
        assert!(matches!(
            "10.0.0.0".parse::<Prefix>(),
            Err(PrefixError::Malformed(_))
        ));
    }

    #[test]
    fn test_root_and_full_length() {
        let root = Prefix::root();
        assert!(root.is_empty());
        assert_eq!(root.to_string(), "0.0.0.0/0");
        assert_eq!(root.size(), 1 << 32);
        assert_eq!(root.last_addr(), u32::MAX);
        assert!(root.contains(u32::MAX));
        assert!(root.parent().is_none());

        let host = Prefix::from(Ipv4Addr::new(255, 255, 255, 255));
        assert_eq!(host.len(), ADDR_BITS);
        assert_eq!(host.size(), 1);
        assert_eq!(host.to_string(), "255.255.255.255/32");
    }

    #[test]
    fn test_child_parent_walk() {
        let mut p = Prefix::root();
        // 10 = 00001010
        for bit in [false, false, false, false, true, false, true, false] {
            p = p.child(bit);
        }
        assert_eq!(p, ipv4_prefix!("10.0.0.0/8"));
        assert_eq!(format!("{:b}", p), "00001010/8");
        let right = p.child(true);
        assert_eq!(right.to_string(), "10.128.0.0/9");
        assert!(right.is_sibling_of(&p.child(false)));
        assert!(!right.is_sibling_of(&right));
        assert_eq!(right.parent(), Some(p));
        assert_eq!(p.bits().collect::<Vec<_>>().len(), 8);
        assert!(p.bit(4));
        assert!(!p.bit(5));
    }

    #[test]
    fn test_contains_and_covers() {
        let p = ipv4_prefix!("10.0.0.0/8");
        assert!(p.contains(u32::from_be_bytes([10, 255, 0, 1])));
        assert!(!p.contains(u32::from_be_bytes([11, 0, 0, 0])));
        assert!(p.covers(&ipv4_prefix!("10.1.0.0/16")));
        assert!(p.covers(&p));
        assert!(!ipv4_prefix!("10.1.0.0/16").covers(&p));
    }

    #[test]
    fn test_ordering() {
        let mut v = vec![
            ipv4_prefix!("10.128.0.0/9"),
            ipv4_prefix!("10.0.0.0/9"),
            ipv4_prefix!("10.0.0.0/8"),
            ipv4_prefix!("0.0.0.0/0"),
        ];
        v.sort();
        let v: Vec<_> = v.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            v,
            ["0.0.0.0/0", "10.0.0.0/8", "10.0.0.0/9", "10.128.0.0/9"]
        );
    }

    #[test]
    fn test_numeric_form() {
        assert_eq!(ipv4_prefix!("167772160/8"), ipv4_prefix!("10.0.0.0/8"));
    }

    #[test]
    fn test_parse_matches_loader_grammar() {
        assert_eq!(ipv4_prefix!(" 010.001.0.0/16 "), ipv4_prefix!("10.1.0.0/16"));
        assert_eq!(ipv4_prefix!("4294967295/32").to_string(), "255.255.255.255/32");
        for bad in ["+5/8", "5/+8", "-1/8", "10.0.0.0/-8", "4294967296/8", "10.0.0.0 /8", "10.0.0.0/8/8"] {
            assert_eq!(
                bad.parse::<Prefix>(),
                Err(PrefixError::Malformed(bad.to_owned())),
                "{bad}"
            );
        }
    }
}
