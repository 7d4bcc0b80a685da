//! Name-keyed table of bus address ranges.

use std::collections::{BTreeMap, BTreeSet};

use super::AddressRange;

/// Per-bus address ranges for one verification pass.
///
/// Bus names are declared up front; the [`AddressRange`] behind a name is
/// only built the first time that bus is touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusRangeTable {
    declared: BTreeSet<String>,
    ranges: BTreeMap<String, AddressRange>,
}

impl BusRangeTable {
    /// Declares every bus in `bus_names` with a full free domain.
    pub fn new<I, S>(bus_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            declared: bus_names.into_iter().map(Into::into).collect(),
            ranges: BTreeMap::new(),
        }
    }

    /// Returns `true` when `bus` was declared.
    #[must_use]
    pub fn contains(&self, bus: &str) -> bool {
        self.declared.contains(bus)
    }

    /// Declared bus names in sorted order.
    pub fn bus_names(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }

    /// Number of declared buses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declared.len()
    }

    /// Returns `true` when no bus was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    /// Range of a bus that has already been touched.
    #[must_use]
    pub fn get(&self, bus: &str) -> Option<&AddressRange> {
        self.ranges.get(bus)
    }

    /// Range of a declared bus, built on first use.
    ///
    /// Returns `None` for buses that were never declared.
    pub fn range_mut(&mut self, bus: &str) -> Option<&mut AddressRange> {
        if !self.declared.contains(bus) {
            return None;
        }
        Some(
            self.ranges
                .entry(bus.to_string())
                .or_insert_with(|| AddressRange::new(bus)),
        )
    }

    /// Ranges touched so far, in bus-name order.
    pub fn ranges(&self) -> impl Iterator<Item = &AddressRange> {
        self.ranges.values()
    }
}
