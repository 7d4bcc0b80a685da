#![no_main]

use addrmap_core::{parse_literal, AddressRange, BUS_DOMAIN_END};
use libfuzzer_sys::fuzz_target;

const OWNERS: [&str; 3] = ["ddr_0", "uart_0", "gpio_0"];

fuzz_target!(|data: &[u8]| {
    let mut range = AddressRange::new("plb");

    for chunk in data.chunks_exact(9) {
        let a = u64::from(u32::from_be_bytes([chunk[1], chunk[2], chunk[3], chunk[4]]));
        let b = u64::from(u32::from_be_bytes([chunk[5], chunk[6], chunk[7], chunk[8]]));
        let owner = OWNERS[usize::from(chunk[0] >> 1) % OWNERS.len()];

        if chunk[0] & 1 == 0 {
            let (base, high) = if a <= b { (a, b) } else { (b, a) };
            let _ = range.allocate(base, high, owner);
        } else if let Some((base, high)) = range.locate_free_space(a & 0xF_FFFF, b, owner) {
            assert!(base >= b);
            assert!(range.is_available(base, high, owner));
        }
    }

    let spaces: Vec<_> = range
        .allocated()
        .iter()
        .chain(range.unallocated().iter())
        .collect();
    let covered: u64 = spaces.iter().map(|space| space.size()).sum();
    assert_eq!(covered, BUS_DOMAIN_END + 1);
    for (i, a) in spaces.iter().enumerate() {
        for b in spaces.iter().skip(i + 1) {
            assert!(!a.overlaps(b));
        }
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_literal(text);
    }
});
