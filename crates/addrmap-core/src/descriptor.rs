//! Address-window descriptor lookup for core instances.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::design::{Core, CoreAddressRangeInfo};

/// Failure reported by a descriptor provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("descriptor lookup for core type '{core_type}' failed: {message}")]
pub struct ProviderError {
    /// Core type whose descriptors could not be retrieved.
    pub core_type: String,
    /// Provider-specific detail.
    pub message: String,
}

/// Source of the address windows a core declares.
///
/// Implementations back onto component-definition repositories; an empty
/// list means the core occupies no bus addresses.
pub trait DescriptorProvider {
    /// Returns the address windows declared for `core`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the definition cannot be retrieved.
    fn address_ranges(&self, core: &Core) -> Result<Vec<CoreAddressRangeInfo>, ProviderError>;
}

/// Descriptor provider backed by an in-memory table keyed by core type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StaticDescriptorProvider {
    windows: BTreeMap<String, Vec<CoreAddressRangeInfo>>,
}

impl StaticDescriptorProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the windows of `core_type`, replacing earlier entries.
    pub fn insert(&mut self, core_type: impl Into<String>, windows: Vec<CoreAddressRangeInfo>) {
        self.windows.insert(core_type.into(), windows);
    }

    /// Registers the windows of `core_type`, builder style.
    #[must_use]
    pub fn with(mut self, core_type: impl Into<String>, windows: Vec<CoreAddressRangeInfo>) -> Self {
        self.insert(core_type, windows);
        self
    }

    /// Number of registered core types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Returns `true` when no core type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl DescriptorProvider for StaticDescriptorProvider {
    fn address_ranges(&self, core: &Core) -> Result<Vec<CoreAddressRangeInfo>, ProviderError> {
        Ok(self.windows.get(&core.core_type).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::{DescriptorProvider, StaticDescriptorProvider};
    use crate::design::{Core, CoreAddressRangeInfo};

    #[test]
    fn unknown_core_type_has_no_windows() {
        let provider = StaticDescriptorProvider::new();
        let core = Core::new("gpio_0", "xps_gpio");
        assert_eq!(provider.address_ranges(&core), Ok(Vec::new()));
        assert!(provider.is_empty());
    }

    #[test]
    fn registered_windows_are_returned_in_order() {
        let provider = StaticDescriptorProvider::new().with(
            "plbv46_pcie",
            vec![
                CoreAddressRangeInfo::new("C_BASEADDR", "C_HIGHADDR", 0x1FF, true, ["SPLB"]),
                CoreAddressRangeInfo::new("C_MEM0_BASEADDR", "C_MEM0_HIGHADDR", 0xFFFF, false, ["SPLB"]),
            ],
        );
        let core = Core::new("pcie_0", "plbv46_pcie");
        let windows = provider.address_ranges(&core).expect("static lookup");
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[1].base_param, "C_MEM0_BASEADDR");
        assert_eq!(provider.len(), 1);
    }
}
