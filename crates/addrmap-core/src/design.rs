//! Hardware-design model consumed by the verifier: core instances, their
//! parameters and bus bindings, and the address windows they declare.

/// A named parameter on a core instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Parameter {
    /// Parameter name, e.g. `C_BASEADDR`.
    pub name: String,
    /// Parameter value as written in the design.
    pub value: String,
}

/// Connection of one of a core's bus interfaces to a system bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BusInterface {
    /// Interface name declared by the core type, e.g. `SPLB`.
    pub interface: String,
    /// System bus instance the interface is attached to.
    pub bus: String,
}

/// One instantiated hardware core.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Core {
    /// Unique instance name within the design.
    pub instance: String,
    /// Core type (IP name) used to look up descriptors.
    pub core_type: String,
    /// Parameters in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parameters: Vec<Parameter>,
    /// Bus interface bindings in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bus_interfaces: Vec<BusInterface>,
}

impl Core {
    /// Creates a core with no parameters or bindings.
    #[must_use]
    pub fn new(instance: impl Into<String>, core_type: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            core_type: core_type.into(),
            parameters: Vec::new(),
            bus_interfaces: Vec::new(),
        }
    }

    /// Adds or replaces a parameter, builder style.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_parameter(name, value);
        self
    }

    /// Adds a bus interface binding, builder style.
    #[must_use]
    pub fn with_bus_interface(
        mut self,
        interface: impl Into<String>,
        bus: impl Into<String>,
    ) -> Self {
        self.bus_interfaces.push(BusInterface {
            interface: interface.into(),
            bus: bus.into(),
        });
        self
    }

    /// Value of the parameter called `name`. Names compare ASCII
    /// case-insensitively, as in hardware description files.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|parameter| parameter.name.eq_ignore_ascii_case(name))
            .map(|parameter| parameter.value.as_str())
    }

    /// Sets `name` to `value`, appending the parameter when absent.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .parameters
            .iter_mut()
            .find(|parameter| parameter.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => existing.value = value,
            None => self.parameters.push(Parameter { name, value }),
        }
    }

    /// Removes the parameter called `name`, returning its value.
    pub fn remove_parameter(&mut self, name: &str) -> Option<String> {
        let index = self
            .parameters
            .iter()
            .position(|parameter| parameter.name.eq_ignore_ascii_case(name))?;
        Some(self.parameters.remove(index).value)
    }
}

/// Address window declared by a core type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CoreAddressRangeInfo {
    /// Name of the parameter holding the window's base address.
    pub base_param: String,
    /// Name of the parameter holding the window's high address.
    pub high_param: String,
    /// Expression deciding whether the window is in use.
    #[cfg_attr(feature = "serde", serde(default))]
    pub condition: Option<String>,
    /// Minimum number of addresses the window needs.
    pub min_size: u64,
    /// Whether the design is invalid without this window.
    #[cfg_attr(feature = "serde", serde(default))]
    pub required: bool,
    /// Bus interface names through which the window may be mapped.
    pub buses: Vec<String>,
}

impl CoreAddressRangeInfo {
    /// Creates a window with no condition that may live on `buses`.
    #[must_use]
    pub fn new<I, S>(
        base_param: impl Into<String>,
        high_param: impl Into<String>,
        min_size: u64,
        required: bool,
        buses: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base_param: base_param.into(),
            high_param: high_param.into(),
            condition: None,
            min_size,
            required,
            buses: buses.into_iter().map(Into::into).collect(),
        }
    }

    /// Attaches a validity condition, builder style.
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Returns `true` when the window may be mapped through `interface`.
    #[must_use]
    pub fn allows_interface(&self, interface: &str) -> bool {
        self.buses
            .iter()
            .any(|bus| bus.eq_ignore_ascii_case(interface))
    }
}

#[cfg(test)]
mod tests {
    use super::{Core, CoreAddressRangeInfo};

    #[test]
    fn parameter_lookup_ignores_case() {
        let core = Core::new("uart_0", "xps_uartlite").with_parameter("C_BASEADDR", "0x84000000");
        assert_eq!(core.parameter("c_baseaddr"), Some("0x84000000"));
        assert_eq!(core.parameter("C_HIGHADDR"), None);
    }

    #[test]
    fn set_parameter_replaces_in_place() {
        let mut core = Core::new("uart_0", "xps_uartlite")
            .with_parameter("C_BASEADDR", "0x0")
            .with_parameter("C_HIGHADDR", "0xFF");
        core.set_parameter("c_baseaddr", "0x100");
        assert_eq!(core.parameters.len(), 2);
        assert_eq!(core.parameters[0].name, "C_BASEADDR");
        assert_eq!(core.parameters[0].value, "0x100");
    }

    #[test]
    fn remove_parameter_returns_value() {
        let mut core = Core::new("uart_0", "xps_uartlite").with_parameter("C_BASEADDR", "0x0");
        assert_eq!(core.remove_parameter("C_BASEADDR"), Some("0x0".to_string()));
        assert_eq!(core.remove_parameter("C_BASEADDR"), None);
        assert!(core.parameters.is_empty());
    }

    #[test]
    fn window_interface_match_ignores_case() {
        let window = CoreAddressRangeInfo::new("C_BASEADDR", "C_HIGHADDR", 0xFF, true, ["SPLB"]);
        assert!(window.allows_interface("splb"));
        assert!(!window.allows_interface("SOPB"));
        assert!(window.condition.is_none());
        assert_eq!(
            window.with_condition("C_USE_BAR == 1").condition.as_deref(),
            Some("C_USE_BAR == 1")
        );
    }
}
