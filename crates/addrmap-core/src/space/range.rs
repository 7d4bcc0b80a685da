//! Per-bus partition of the address domain into free and allocated spaces.
//!
//! Both lists keep insertion order. Searches walk the free list front to
//! back and take the first fit, so the outcome of a sequence of requests
//! depends on the order in which they arrive. Free spaces are never merged
//! and allocated spaces are never released.

use super::{AddressSpace, SpaceError, BUS_DOMAIN_END, BUS_DOMAIN_START};

/// Address domain of one bus, split into unallocated and allocated spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AddressRange {
    name: String,
    unallocated: Vec<AddressSpace>,
    allocated: Vec<AddressSpace>,
}

impl AddressRange {
    /// Creates a bus whose whole 32-bit domain is free.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unallocated: vec![AddressSpace::from_bounds(
                BUS_DOMAIN_START,
                BUS_DOMAIN_END,
                String::new(),
            )],
            allocated: Vec::new(),
        }
    }

    /// Creates a bus over a custom inclusive domain.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::Inverted`] when `end < start`.
    pub fn with_domain(name: impl Into<String>, start: u64, end: u64) -> Result<Self, SpaceError> {
        Ok(Self {
            name: name.into(),
            unallocated: vec![AddressSpace::free(start, end)?],
            allocated: Vec::new(),
        })
    }

    /// Bus identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free spaces in insertion order.
    #[must_use]
    pub fn unallocated(&self) -> &[AddressSpace] {
        &self.unallocated
    }

    /// Allocated spaces in allocation order.
    #[must_use]
    pub fn allocated(&self) -> &[AddressSpace] {
        &self.allocated
    }

    /// Allocated spaces owned by `reserved_for`.
    pub fn allocations_for<'a>(
        &'a self,
        reserved_for: &'a str,
    ) -> impl Iterator<Item = &'a AddressSpace> + 'a {
        self.allocated
            .iter()
            .filter(move |space| space.reserved_for() == reserved_for)
    }

    /// Total number of free addresses left on the bus.
    #[must_use]
    pub fn free_addresses(&self) -> u64 {
        self.unallocated
            .iter()
            .fold(0_u64, |total, space| total.saturating_add(space.size()))
    }

    /// Returns `true` when `[base, high]` lies inside one free space, or
    /// inside a space already allocated to `reserved_for`.
    #[must_use]
    pub fn is_available(&self, base: u64, high: u64, reserved_for: &str) -> bool {
        if high < base {
            return false;
        }
        self.unallocated
            .iter()
            .any(|space| space.contains(base, high))
            || self.is_owned_by(base, high, reserved_for)
    }

    /// Reserves `[base, high]` for `reserved_for`.
    ///
    /// The first free space containing the window is replaced by the
    /// window's allocation plus up to two free residuals appended to the
    /// free list. When no free space fits, the call still succeeds if the
    /// window is already owned by `reserved_for`, which makes repeated
    /// allocation of the same window a no-op.
    pub fn allocate(&mut self, base: u64, high: u64, reserved_for: &str) -> bool {
        if high < base {
            return false;
        }

        let Some(index) = self
            .unallocated
            .iter()
            .position(|space| space.contains(base, high))
        else {
            return self.is_owned_by(base, high, reserved_for);
        };

        let free = self.unallocated.remove(index);
        let (before, after) = free.residuals(base, high);
        self.allocated.push(AddressSpace::from_bounds(
            base,
            high,
            reserved_for.to_string(),
        ));
        self.unallocated.extend(before);
        self.unallocated.extend(after);
        true
    }

    /// Finds and immediately reserves a window for `reserved_for`.
    ///
    /// Walks the free list in order and takes the first space whose size is
    /// at least `min_size` and whose start is at least `min_base`. The
    /// reserved window is `[start, start + min_size]`, one address wider
    /// than `min_size`.
    ///
    /// This is stricter than a plain `size >= min_size` first fit: a space
    /// of exactly `min_size` addresses cannot hold the extra address and is
    /// passed over in favour of the next space that can.
    pub fn locate_free_space(
        &mut self,
        min_size: u64,
        min_base: u64,
        reserved_for: &str,
    ) -> Option<(u64, u64)> {
        let (base, high) = self
            .unallocated
            .iter()
            .filter(|space| space.size() >= min_size && space.start() >= min_base)
            .find_map(|space| {
                let high = space.start().checked_add(min_size)?;
                space
                    .contains(space.start(), high)
                    .then_some((space.start(), high))
            })?;

        self.allocate(base, high, reserved_for)
            .then_some((base, high))
    }

    fn is_owned_by(&self, base: u64, high: u64, reserved_for: &str) -> bool {
        self.allocations_for(reserved_for)
            .any(|space| space.contains(base, high))
    }
}
