//! Canonical CIDR-range parser.
//!
//! Turns one clean literal (a network, a host, a wildcard or a small set of
//! range notations) into its minimal CIDR blocks. The classifier hands it the
//! substring a shape matched; anything it cannot read is an error the
//! classifier records as a rejection.

use super::expand::range_to_cidrs;
use crate::error::ParseCidrError;
use crate::models::{parse_dotted_quad, parse_octet, CidrBlock};
use lazy_static::lazy_static;
use regex::Regex;
use std::net::Ipv4Addr;

/// Parses a single address literal into CIDR blocks.
pub trait CidrRangeParser {
    fn parse(&self, literal: &str) -> Result<Vec<CidrBlock>, ParseCidrError>;
}

/// Default parser for the notations found in the address sheets.
///
/// | literal | meaning |
/// |---|---|
/// | `10.0.0.5/24` | `10.0.0.0/24` (host bits cleared) |
/// | `10.0.0.5` | `10.0.0.5/32` |
/// | `10.0.0.*`, `10.0.*.*` | `/24`, `/16` |
/// | `10.0.0.4-9` | `10.0.0.4` to `10.0.0.9` |
/// | `10.0.0.4-10.0.1.9` | full range |
/// | `10.0.0.1[0-9]` | `10.0.0.10` to `10.0.0.19` |
/// | `10.0.0.[4-9]` | `10.0.0.4` to `10.0.0.9` |
#[derive(Debug, Default, Clone, Copy)]
pub struct StdCidrParser;

lazy_static! {
    static ref RE_FULL_RANGE: Regex = Regex::new(
        r"^([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})-([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})$"
    )
    .expect("Invalid Regex?");
    static ref RE_FOURTH_RANGE: Regex =
        Regex::new(r"^([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})\.([0-9]{1,3})-([0-9]{1,3})$")
            .expect("Invalid Regex?");
    static ref RE_DIGIT_BRACKET: Regex = Regex::new(
        r"^([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})\.([0-9])\[([0-9]{1,3})-([0-9]{1,3})\]$"
    )
    .expect("Invalid Regex?");
    static ref RE_FOURTH_BRACKET: Regex =
        Regex::new(r"^([0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})\.\[([0-9]{1,3})-([0-9]{1,3})\]$")
            .expect("Invalid Regex?");
}

impl CidrRangeParser for StdCidrParser {
    fn parse(&self, literal: &str) -> Result<Vec<CidrBlock>, ParseCidrError> {
        let literal = literal.trim();
        let err = |reason: &dyn std::fmt::Display| ParseCidrError::new(literal, reason);

        if literal.contains('/') {
            let block: CidrBlock = literal.parse().map_err(|e| err(&e))?;
            return Ok(vec![block]);
        }
        if literal.contains('*') {
            return parse_wildcard(literal).map(|block| vec![block]);
        }
        if let Some(caps) = RE_FULL_RANGE.captures(literal) {
            let start = parse_dotted_quad(&caps[1]).map_err(|e| err(&e))?;
            let end = parse_dotted_quad(&caps[2]).map_err(|e| err(&e))?;
            return range_to_cidrs(start, end).map_err(|e| err(&e));
        }
        if let Some(caps) = RE_FOURTH_RANGE.captures(literal) {
            return last_octet_range(literal, &caps[1], &caps[2], &caps[3]);
        }
        if let Some(caps) = RE_DIGIT_BRACKET.captures(literal) {
            let lo = format!("{}{}", &caps[2], &caps[3]);
            let hi = format!("{}{}", &caps[2], &caps[4]);
            return last_octet_range(literal, &caps[1], &lo, &hi);
        }
        if let Some(caps) = RE_FOURTH_BRACKET.captures(literal) {
            return last_octet_range(literal, &caps[1], &caps[2], &caps[3]);
        }

        let addr = parse_dotted_quad(literal).map_err(|e| err(&e))?;
        Ok(vec![CidrBlock::host(addr)])
    }
}

/// `prefix.lo` through `prefix.hi`, where `prefix` holds the first three octets.
fn last_octet_range(
    literal: &str,
    prefix: &str,
    lo: &str,
    hi: &str,
) -> Result<Vec<CidrBlock>, ParseCidrError> {
    let start = parse_dotted_quad(&format!("{prefix}.{lo}"))
        .map_err(|e| ParseCidrError::new(literal, e))?;
    let end = parse_dotted_quad(&format!("{prefix}.{hi}"))
        .map_err(|e| ParseCidrError::new(literal, e))?;
    range_to_cidrs(start, end).map_err(|e| ParseCidrError::new(literal, e))
}

/// Trailing `*` octets: `10.1.2.*` is `/24`, `10.1.*.*` is `/16`.
fn parse_wildcard(literal: &str) -> Result<CidrBlock, ParseCidrError> {
    let parts: Vec<&str> = literal.split('.').collect();
    if parts.len() != 4 {
        return Err(ParseCidrError::new(literal, "expected four octets"));
    }
    let fixed = parts.iter().take_while(|p| **p != "*").count();
    if fixed == 0 || parts[fixed..].iter().any(|p| *p != "*") {
        return Err(ParseCidrError::new(
            literal,
            "wildcards must be the trailing octets",
        ));
    }

    let mut octets = [0u8; 4];
    for (octet, part) in octets.iter_mut().zip(&parts[..fixed]) {
        *octet = parse_octet(part).map_err(|e| ParseCidrError::new(literal, e))?;
    }
    let mask = (fixed * 8) as u8;
    CidrBlock::new(Ipv4Addr::from(octets), mask).map_err(|e| ParseCidrError::new(literal, e))
}
