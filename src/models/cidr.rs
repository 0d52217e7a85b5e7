//! IPv4 CIDR blocks and dotted-quad parsing.
//!
//! Provides [`CidrBlock`] along with the mask arithmetic the range expander
//! and the CIDR-range parser are built on.

use crate::error::RangeError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use standardise_ip::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, RangeError> {
    if len > MAX_LENGTH {
        Err(RangeError::InvalidPrefix(len.to_string()))
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;

        let mask = (all_bits >> right_len) << right_len;

        Ok(mask as u32)
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: Ipv4Addr, len: u8) -> Result<Ipv4Addr, RangeError> {
    let mask = get_cidr_mask(len)?;
    Ok(Ipv4Addr::from(u32::from(addr) & mask))
}

/// Smallest prefix length `ip` is a valid network address for.
///
/// `0.0.0.0` is aligned to everything and gets `/0`.
pub fn lo_mask(ip: Ipv4Addr) -> u8 {
    let trailing_zeros = u32::from(ip).trailing_zeros() as u8;
    MAX_LENGTH - trailing_zeros.min(MAX_LENGTH)
}

/// Parse one decimal octet. Leading zeros are tolerated, values above 255 are not.
pub fn parse_octet(s: &str) -> Result<u8, RangeError> {
    if s.is_empty() || s.len() > 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::InvalidOctet(s.to_string()));
    }
    let value: u16 = s
        .parse()
        .map_err(|_| RangeError::InvalidOctet(s.to_string()))?;
    u8::try_from(value).map_err(|_| RangeError::InvalidOctet(s.to_string()))
}

/// Parse `a.b.c.d` into an address.
///
/// Unlike [`Ipv4Addr::from_str`] this accepts zero-padded octets like `010`,
/// which people type into spreadsheets all the time.
pub fn parse_dotted_quad(s: &str) -> Result<Ipv4Addr, RangeError> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 4 {
        return Err(RangeError::InvalidAddress(s.to_string()));
    }
    let mut octets = [0u8; 4];
    for (octet, part) in octets.iter_mut().zip(parts) {
        *octet = parse_octet(part).map_err(|_| RangeError::InvalidAddress(s.to_string()))?;
    }
    Ok(Ipv4Addr::from(octets))
}

/// An IPv4 network: address with the host bits cleared, plus prefix length.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct CidrBlock {
    /// Network address.
    pub addr: Ipv4Addr,
    /// Prefix length (0-32).
    pub mask: u8,
}

impl CidrBlock {
    /// Build a block, clearing any host bits set in `addr`.
    pub fn new(addr: Ipv4Addr, mask: u8) -> Result<CidrBlock, RangeError> {
        let addr = cut_addr(addr, mask)?;
        Ok(CidrBlock { addr, mask })
    }

    /// A single-address `/32` block.
    pub fn host(addr: Ipv4Addr) -> CidrBlock {
        CidrBlock {
            addr,
            mask: MAX_LENGTH,
        }
    }

    /// Lowest (network) address in the block.
    pub fn lo(&self) -> Ipv4Addr {
        self.addr
    }

    /// Highest (broadcast) address in the block.
    pub fn hi(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) | self.host_bits())
    }

    /// Number of addresses in the block.
    pub fn size(&self) -> u64 {
        1u64 << (MAX_LENGTH - self.mask)
    }

    fn host_bits(&self) -> u32 {
        ((self.size() - 1) & u32::MAX as u64) as u32
    }
}

impl FromStr for CidrBlock {
    type Err = RangeError;

    /// Parse `a.b.c.d/n`; host bits are cleared.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, mask) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| RangeError::InvalidAddress(s.to_string()))?;
        let addr = parse_dotted_quad(addr)?;
        let mask: u8 = mask
            .parse()
            .map_err(|_| RangeError::InvalidPrefix(mask.to_string()))?;
        CidrBlock::new(addr, mask)
    }
}

impl std::fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

impl Serialize for CidrBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D>(deserializer: D) -> Result<CidrBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e| de::Error::custom(format!("invalid CIDR {s}: {e}")))
    }
}
