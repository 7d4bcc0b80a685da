//! JSON platform design documents.
//!
//! A design lists the system buses, the core instances in processing
//! order, and the address windows each core type declares:
//!
//! ```json
//! {
//!   "platform": "ml507",
//!   "memory_controller": "ppc440mc_ddr2",
//!   "buses": ["plb"],
//!   "descriptors": {
//!     "xps_uartlite": [
//!       { "base_param": "C_BASEADDR", "high_param": "C_HIGHADDR",
//!         "min_size": 65535, "required": true, "buses": ["SPLB"] }
//!     ]
//!   },
//!   "cores": [
//!     { "instance": "uart_0", "core_type": "xps_uartlite",
//!       "parameters": [{ "name": "C_BASEADDR", "value": "0x84000000" }],
//!       "bus_interfaces": [{ "interface": "SPLB", "bus": "plb" }] }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use addrmap_core::{Core, StaticDescriptorProvider};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Parsed platform design.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DesignFile {
    /// Platform identifier used for address-map records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Core type of the primary memory controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_controller: Option<String>,
    /// System bus instance names.
    pub buses: Vec<String>,
    /// Address windows per core type.
    #[serde(default)]
    pub descriptors: StaticDescriptorProvider,
    /// Core instances in processing order.
    #[serde(default)]
    pub cores: Vec<Core>,
}

impl DesignFile {
    /// Reads and parses the design at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not a valid design.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read design {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid design {}", path.display()))
    }

    /// Parses a design from JSON text.
    ///
    /// # Errors
    ///
    /// Fails when `text` is not a valid design document.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Writes the design to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        fs::write(path, text).with_context(|| format!("failed to write design {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::DesignFile;
    use addrmap_core::DescriptorProvider;

    const DESIGN: &str = r#"{
        "platform": "ml507",
        "buses": ["plb"],
        "descriptors": {
            "xps_uartlite": [
                { "base_param": "C_BASEADDR", "high_param": "C_HIGHADDR",
                  "min_size": 65535, "required": true, "buses": ["SPLB"] }
            ]
        },
        "cores": [
            { "instance": "uart_0", "core_type": "xps_uartlite",
              "parameters": [{ "name": "C_BASEADDR", "value": "0x84000000" }],
              "bus_interfaces": [{ "interface": "SPLB", "bus": "plb" }] },
            { "instance": "proc_0", "core_type": "ppc440_virtex5" }
        ]
    }"#;

    #[test]
    fn parses_design_with_defaults() {
        let design = DesignFile::parse(DESIGN).expect("valid design");
        assert_eq!(design.platform.as_deref(), Some("ml507"));
        assert!(design.memory_controller.is_none());
        assert_eq!(design.cores.len(), 2);
        assert!(design.cores[1].parameters.is_empty());

        let windows = design
            .descriptors
            .address_ranges(&design.cores[0])
            .expect("static lookup");
        assert_eq!(windows.len(), 1);
        assert!(windows[0].condition.is_none());
        assert_eq!(windows[0].min_size, 0xFFFF);
    }

    #[test]
    fn rejects_design_without_buses() {
        assert!(DesignFile::parse(r#"{ "cores": [] }"#).is_err());
    }
}
