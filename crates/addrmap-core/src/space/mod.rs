//! Bus address-space bookkeeping: intervals, per-bus partitions, and the
//! bus-name table used by one verification pass.

/// Owner-tagged inclusive address intervals.
pub mod interval;
/// Per-bus partition into free and allocated intervals.
pub mod range;
/// Name-keyed collection of per-bus partitions.
pub mod table;

pub use interval::{AddressSpace, SpaceError};
pub use range::AddressRange;
pub use table::BusRangeTable;

/// Inclusive first address of every bus domain.
pub const BUS_DOMAIN_START: u64 = 0;
/// Inclusive last address of every bus domain (32-bit buses).
pub const BUS_DOMAIN_END: u64 = u32::MAX as u64;

#[cfg(test)]
mod tests {
    use super::{AddressRange, BUS_DOMAIN_END, BUS_DOMAIN_START};

    #[test]
    fn fresh_bus_is_one_free_space_over_the_full_domain() {
        let range = AddressRange::new("plb");
        assert_eq!(range.unallocated().len(), 1);
        assert_eq!(range.unallocated()[0].start(), BUS_DOMAIN_START);
        assert_eq!(range.unallocated()[0].end(), BUS_DOMAIN_END);
        assert!(range.allocated().is_empty());
    }
}
