//! Owner-tagged inclusive address intervals.

use thiserror::Error;

/// Error raised when an interval cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SpaceError {
    /// The end address lies below the start address.
    #[error("address space end {end:#X} precedes start {start:#X}")]
    Inverted {
        /// Requested inclusive start.
        start: u64,
        /// Requested inclusive end.
        end: u64,
    },
}

/// Inclusive address interval `[start, end]` with an optional owner.
///
/// An empty `reserved_for` marks the interval as free. Values are immutable
/// once built; allocation replaces intervals instead of editing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AddressSpace {
    start: u64,
    end: u64,
    reserved_for: String,
}

impl AddressSpace {
    /// Builds an interval owned by `reserved_for`.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::Inverted`] when `end < start`.
    pub fn new(start: u64, end: u64, reserved_for: impl Into<String>) -> Result<Self, SpaceError> {
        if end < start {
            return Err(SpaceError::Inverted { start, end });
        }
        Ok(Self::from_bounds(start, end, reserved_for.into()))
    }

    /// Builds an unowned interval.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::Inverted`] when `end < start`.
    pub fn free(start: u64, end: u64) -> Result<Self, SpaceError> {
        Self::new(start, end, String::new())
    }

    pub(crate) fn from_bounds(start: u64, end: u64, reserved_for: String) -> Self {
        debug_assert!(start <= end, "interval bounds must be ordered");
        Self {
            start,
            end,
            reserved_for,
        }
    }

    /// Inclusive first address.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Inclusive last address.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Number of addresses covered, saturating for a full 64-bit interval.
    #[must_use]
    pub const fn size(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// Owner identifier, empty when free.
    #[must_use]
    pub fn reserved_for(&self) -> &str {
        &self.reserved_for
    }

    /// Returns `true` when no core owns this interval.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.reserved_for.is_empty()
    }

    /// Returns `true` when `[base, high]` is a well-formed window inside
    /// this interval.
    #[must_use]
    pub const fn contains(&self, base: u64, high: u64) -> bool {
        base <= high && base >= self.start && high <= self.end
    }

    /// Returns `true` when the two intervals share at least one address.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Splits off the free residuals left when `[base, high]` is carved out
    /// of this interval.
    ///
    /// The caller guarantees the window is contained.
    #[must_use]
    pub fn residuals(&self, base: u64, high: u64) -> (Option<Self>, Option<Self>) {
        debug_assert!(self.contains(base, high));
        let before =
            (base > self.start).then(|| Self::from_bounds(self.start, base - 1, String::new()));
        let after = (high < self.end).then(|| Self::from_bounds(high + 1, self.end, String::new()));
        (before, after)
    }
}
