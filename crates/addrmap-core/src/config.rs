//! Verifier configuration.

use crate::space::BUS_DOMAIN_START;

/// Hex digits written for generated addresses (32-bit buses).
pub const DEFAULT_ADDRESS_DIGITS: usize = 8;

/// Settings for one verification pass over a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VerifierConfig {
    /// Platform identifier used as part of every address-map record key.
    pub platform_id: String,
    /// Core type of the platform's primary memory controller. Its windows
    /// are placed first and anchored at address zero.
    pub memory_controller: Option<String>,
    /// Lowest start address considered when generating a window.
    pub minimum_base: u64,
    /// Minimum hex digits used when writing addresses back.
    pub address_digits: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            platform_id: String::new(),
            memory_controller: None,
            minimum_base: BUS_DOMAIN_START,
            address_digits: DEFAULT_ADDRESS_DIGITS,
        }
    }
}

impl VerifierConfig {
    /// Creates a configuration for `platform_id` with default settings.
    #[must_use]
    pub fn for_platform(platform_id: impl Into<String>) -> Self {
        Self {
            platform_id: platform_id.into(),
            ..Self::default()
        }
    }

    /// Sets the memory-controller core type, builder style.
    #[must_use]
    pub fn with_memory_controller(mut self, core_type: impl Into<String>) -> Self {
        self.memory_controller = Some(core_type.into());
        self
    }

    /// Returns `true` when `core_type` is the configured memory controller.
    #[must_use]
    pub fn is_memory_controller(&self, core_type: &str) -> bool {
        self.memory_controller
            .as_deref()
            .is_some_and(|controller| controller.eq_ignore_ascii_case(core_type))
    }
}

#[cfg(test)]
mod tests {
    use super::{VerifierConfig, DEFAULT_ADDRESS_DIGITS};

    #[test]
    fn defaults_place_from_zero_with_eight_digits() {
        let config = VerifierConfig::default();
        assert_eq!(config.minimum_base, 0);
        assert_eq!(config.address_digits, DEFAULT_ADDRESS_DIGITS);
        assert!(config.memory_controller.is_none());
    }

    #[test]
    fn memory_controller_match_ignores_case() {
        let config = VerifierConfig::for_platform("ml507").with_memory_controller("ppc440mc_ddr2");
        assert!(config.is_memory_controller("PPC440MC_DDR2"));
        assert!(!config.is_memory_controller("xps_uartlite"));
        assert!(!VerifierConfig::default().is_memory_controller(""));
    }
}
