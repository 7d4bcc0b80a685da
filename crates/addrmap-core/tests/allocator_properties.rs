//! Property coverage for the bus allocator and the address literal codec.

#![allow(clippy::pedantic, clippy::nursery)]

use addrmap_core::{
    format_binary, format_hex, parse_binary, parse_hex, parse_literal, AddressRange,
    AddressSpace, BUS_DOMAIN_END,
};
use log as _;
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

const OWNERS: [&str; 4] = ["ddr_0", "uart_0", "gpio_0", "eth_0"];

#[derive(Debug, Clone)]
enum Op {
    Allocate { base: u64, len: u64, owner: usize },
    Locate { size: u64, min_base: u64, owner: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..=BUS_DOMAIN_END, 0_u64..0x10_0000, 0..OWNERS.len()).prop_map(|(base, len, owner)| {
            Op::Allocate {
                base,
                len: len.min(BUS_DOMAIN_END - base),
                owner,
            }
        }),
        (0_u64..0x100_0000, 0..=BUS_DOMAIN_END, 0..OWNERS.len())
            .prop_map(|(size, min_base, owner)| Op::Locate { size, min_base, owner }),
    ]
}

fn apply(range: &mut AddressRange, op: &Op) {
    match *op {
        Op::Allocate { base, len, owner } => {
            range.allocate(base, base + len, OWNERS[owner]);
        }
        Op::Locate {
            size,
            min_base,
            owner,
        } => {
            range.locate_free_space(size, min_base, OWNERS[owner]);
        }
    }
}

fn assert_partition(range: &AddressRange) -> Result<(), TestCaseError> {
    let all: Vec<&AddressSpace> = range
        .allocated()
        .iter()
        .chain(range.unallocated().iter())
        .collect();

    for (i, a) in all.iter().enumerate() {
        for b in all.iter().skip(i + 1) {
            prop_assert!(
                !a.overlaps(b),
                "overlap between [{:#X}, {:#X}] and [{:#X}, {:#X}]",
                a.start(),
                a.end(),
                b.start(),
                b.end()
            );
        }
        prop_assert!(a.end() <= BUS_DOMAIN_END);
    }

    let covered: u64 = all.iter().map(|space| space.size()).sum();
    prop_assert_eq!(covered, BUS_DOMAIN_END + 1);
    Ok(())
}

proptest! {
    #[test]
    fn property_partition_survives_any_request_sequence(
        ops in prop::collection::vec(op_strategy(), 0..40)
    ) {
        let mut range = AddressRange::new("plb");
        for op in &ops {
            apply(&mut range, op);
            assert_partition(&range)?;
        }
    }

    #[test]
    fn property_successful_allocation_is_idempotent(
        ops in prop::collection::vec(op_strategy(), 0..20),
        base in 0..=BUS_DOMAIN_END,
        len in 0_u64..0x1_0000,
    ) {
        let mut range = AddressRange::new("plb");
        for op in &ops {
            apply(&mut range, op);
        }
        let high = base + len.min(BUS_DOMAIN_END - base);
        if range.allocate(base, high, "probe") {
            let snapshot = range.clone();
            prop_assert!(range.allocate(base, high, "probe"));
            prop_assert_eq!(&range, &snapshot);
            prop_assert!(range.is_available(base, high, "probe"));
        }
    }

    #[test]
    fn property_locate_is_deterministic_and_exclusive(
        ops in prop::collection::vec(op_strategy(), 0..20),
        size in 0_u64..0x10_0000,
        min_base in 0..=BUS_DOMAIN_END,
    ) {
        let mut range = AddressRange::new("plb");
        for op in &ops {
            apply(&mut range, op);
        }
        let mut twin = range.clone();
        let before = range.clone();

        let first = range.locate_free_space(size, min_base, "probe");
        let second = twin.locate_free_space(size, min_base, "probe");
        prop_assert_eq!(first, second);

        if let Some((base, high)) = first {
            prop_assert_eq!(high - base, size);
            prop_assert!(base >= min_base);
            prop_assert!(before.is_available(base, high, "other"));
            prop_assert!(!range.is_available(base, high, "other"));
        }
    }

    #[test]
    fn property_hex_round_trip(value in any::<u64>()) {
        prop_assert_eq!(parse_hex(&format_hex(value, 8)), Ok(value));
        prop_assert_eq!(parse_literal(&format_hex(value, 8)), Ok(value));
    }

    #[test]
    fn property_binary_round_trip(value in any::<u64>(), digits in 0_usize..70) {
        prop_assert_eq!(parse_binary(&format_binary(value, digits)), Ok(value));
    }

    #[test]
    fn property_hex_rendering_is_padded(value in any::<u32>(), digits in 0_usize..12) {
        let rendered = format_hex(u64::from(value), digits);
        prop_assert!(rendered.starts_with("0x"));
        prop_assert!(rendered.len() - 2 >= digits);
        prop_assert_eq!(rendered.to_uppercase().replacen("0X", "0x", 1), rendered);
    }
}
