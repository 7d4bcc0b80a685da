//! Per-window results of a verification pass.

/// How a window was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum WindowOutcome {
    /// Declared addresses were valid and free, and were kept.
    Validated,
    /// Declared addresses were missing, invalid, or colliding; a new
    /// window was generated.
    Regenerated,
    /// Memory-controller window shifted down to start at address zero.
    Anchored,
    /// Optional window with no room left; its parameters were removed.
    Dropped,
    /// Validity condition evaluated false.
    SkippedCondition,
    /// None of the core's bus bindings reaches a legal, declared bus.
    SkippedNoBus,
}

/// Result for one address window of one core.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WindowReport {
    /// Core instance name.
    pub core: String,
    /// Base-address parameter naming the window.
    pub base_param: String,
    /// Bus the window was resolved on.
    pub bus: Option<String>,
    /// Resolution taken.
    pub outcome: WindowOutcome,
    /// Final inclusive `(base, high)`, when the window is mapped.
    pub window: Option<(u64, u64)>,
}

/// Outcome of a complete verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct VerificationReport {
    /// Window results in processing order.
    pub windows: Vec<WindowReport>,
}

impl VerificationReport {
    /// Number of windows resolved with `outcome`.
    #[must_use]
    pub fn count(&self, outcome: WindowOutcome) -> usize {
        self.windows
            .iter()
            .filter(|window| window.outcome == outcome)
            .count()
    }

    /// Results belonging to core instance `core`.
    pub fn for_core<'a>(&'a self, core: &'a str) -> impl Iterator<Item = &'a WindowReport> + 'a {
        self.windows.iter().filter(move |window| window.core == core)
    }

    /// Windows that ended up mapped on a bus.
    pub fn mapped(&self) -> impl Iterator<Item = &WindowReport> {
        self.windows.iter().filter(|window| window.window.is_some())
    }
}
