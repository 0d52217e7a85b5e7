//! Reduce an inclusive address range to the minimal list of CIDR blocks.

use crate::error::RangeError;
use crate::models::{lo_mask, CidrBlock, MAX_LENGTH};
use std::net::Ipv4Addr;

/// Minimal ascending list of blocks whose union is exactly `[start, end]`.
///
/// Fails with [`RangeError::Reversed`] when `start > end`.
pub fn range_to_cidrs(start: Ipv4Addr, end: Ipv4Addr) -> Result<Vec<CidrBlock>, RangeError> {
    if start > end {
        return Err(RangeError::Reversed { start, end });
    }

    // u64 so stepping past 255.255.255.255 cannot overflow
    let end_bits = u32::from(end) as u64;
    let mut next = u32::from(start) as u64;
    let mut blocks = Vec::new();

    while next <= end_bits {
        let addr = Ipv4Addr::from(next as u32);
        let remaining = end_bits - next + 1;
        let mask = biggest_block_mask(addr, remaining);
        blocks.push(CidrBlock { addr, mask });
        next += 1u64 << (MAX_LENGTH - mask);
    }

    log::trace!(
        "range_to_cidrs({start}, {end}) = {} block(s)",
        blocks.len()
    );
    Ok(blocks)
}

/// Find the biggest block that starts at `start_ip` and holds at most `remaining` addresses.
///
/// Constrained by:
/// 1. The IP alignment - `start_ip` must be a valid network address for the mask
/// 2. The block must not run past the end of the range
fn biggest_block_mask(start_ip: Ipv4Addr, remaining: u64) -> u8 {
    let mut mask = lo_mask(start_ip);
    while (1u64 << (MAX_LENGTH - mask)) > remaining {
        mask += 1;
    }
    assert!(
        mask <= MAX_LENGTH,
        "mask[{mask}] > 32 should never happen."
    );
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cidrs(start: &str, end: &str) -> Vec<String> {
        range_to_cidrs(start.parse().unwrap(), end.parse().unwrap())
            .unwrap()
            .iter()
            .map(|b| b.to_string())
            .collect()
    }

    #[test]
    fn test_single_host() {
        assert_eq!(cidrs("10.0.0.1", "10.0.0.1"), vec!["10.0.0.1/32"]);
    }

    #[test]
    fn test_aligned_pair_of_24s_is_one_23() {
        assert_eq!(cidrs("10.0.0.0", "10.0.1.255"), vec!["10.0.0.0/23"]);
    }

    #[test]
    fn test_unaligned_range() {
        assert_eq!(
            cidrs("10.1.2.0", "10.1.4.255"),
            vec!["10.1.2.0/23", "10.1.4.0/24"]
        );
        assert_eq!(
            cidrs("192.0.2.5", "192.0.2.20"),
            vec![
                "192.0.2.5/32",
                "192.0.2.6/31",
                "192.0.2.8/29",
                "192.0.2.16/30",
                "192.0.2.20/32"
            ]
        );
    }

    #[test]
    fn test_alignment_limits_block() {
        // 10.6.2.80 can only start a /28 or smaller
        assert_eq!(
            cidrs("10.6.2.80", "10.6.7.255"),
            vec![
                "10.6.2.80/28",
                "10.6.2.96/27",
                "10.6.2.128/25",
                "10.6.3.0/24",
                "10.6.4.0/22"
            ]
        );
    }

    #[test]
    fn test_whole_space() {
        assert_eq!(cidrs("0.0.0.0", "255.255.255.255"), vec!["0.0.0.0/0"]);
        assert_eq!(
            cidrs("255.255.255.254", "255.255.255.255"),
            vec!["255.255.255.254/31"]
        );
    }

    #[test]
    fn test_worst_case_is_bounded() {
        let blocks = range_to_cidrs(
            Ipv4Addr::new(0, 0, 0, 1),
            Ipv4Addr::new(255, 255, 255, 254),
        )
        .unwrap();
        assert_eq!(blocks.len(), 62);
    }

    #[test]
    fn test_reversed_range_fails() {
        let err = range_to_cidrs(Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(10, 0, 0, 1))
            .unwrap_err();
        assert_eq!(err.to_string(), "reversed range 10.0.0.2 > 10.0.0.1");
    }

    proptest! {
        #[test]
        fn prop_blocks_cover_range_exactly(a in any::<u32>(), b in any::<u32>()) {
            let (lo, hi) = (a.min(b), a.max(b));
            let blocks = range_to_cidrs(Ipv4Addr::from(lo), Ipv4Addr::from(hi)).unwrap();

            let mut expected_next = lo as u64;
            for block in &blocks {
                // contiguous, ascending and disjoint
                prop_assert_eq!(u32::from(block.lo()) as u64, expected_next);
                prop_assert!(u32::from(block.hi()) as u64 <= hi as u64);
                expected_next = u32::from(block.hi()) as u64 + 1;
            }
            prop_assert_eq!(expected_next, hi as u64 + 1);
            prop_assert!(blocks.len() <= 62);
        }

        #[test]
        fn prop_each_block_reexpands_to_itself(a in any::<u32>(), b in any::<u32>()) {
            let (lo, hi) = (a.min(b), a.max(b));
            for block in range_to_cidrs(Ipv4Addr::from(lo), Ipv4Addr::from(hi)).unwrap() {
                prop_assert_eq!(range_to_cidrs(block.lo(), block.hi()).unwrap(), vec![block]);
            }
        }

        #[test]
        fn prop_reversed_always_fails(a in any::<u32>(), b in any::<u32>()) {
            prop_assume!(a != b);
            let (lo, hi) = (a.min(b), a.max(b));
            prop_assert!(range_to_cidrs(Ipv4Addr::from(hi), Ipv4Addr::from(lo)).is_err());
        }
    }
}
