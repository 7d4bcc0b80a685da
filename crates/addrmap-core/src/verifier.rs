//! Address verification pass: validates declared core address windows
//! against per-bus free space and generates replacements where needed.
//!
//! A pass walks the cores in input order. Memory-controller instances go
//! first and are anchored at address zero; every other core follows. Each
//! window is fully resolved (checked, regenerated if necessary, persisted)
//! before the next one is looked at, so the order of `cores` decides which
//! core wins a contested range.

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::condition::{ConditionError, ConditionEvaluator};
use crate::config::VerifierConfig;
use crate::descriptor::{DescriptorProvider, ProviderError};
use crate::design::{Core, CoreAddressRangeInfo};
use crate::numeric::{format_hex, parse_literal};
use crate::record::{AddressMapStore, AddressUpdate, RecordKey, StoreError};
use crate::report::{VerificationReport, WindowOutcome, WindowReport};
use crate::space::{BusRangeTable, BUS_DOMAIN_START};

/// Failure that aborts a verification pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// A required window found no free space on its bus.
    #[error(
        "core '{core}': no free space of {min_size:#X} addresses on bus '{bus}' for required window '{base_param}'"
    )]
    RequiredWindowUnsatisfiable {
        /// Core instance name.
        core: String,
        /// Base-address parameter naming the window.
        base_param: String,
        /// Bus the window was resolved on.
        bus: String,
        /// Declared minimum size.
        min_size: u64,
    },
    /// Descriptor retrieval failed.
    #[error("core '{core}': {source}")]
    Provider {
        /// Core instance name.
        core: String,
        /// Provider failure.
        source: ProviderError,
    },
    /// A validity condition could not be evaluated.
    #[error("core '{core}': {source}")]
    Condition {
        /// Core instance name.
        core: String,
        /// Evaluation failure.
        source: ConditionError,
    },
    /// The address-map store rejected an update.
    #[error("core '{core}': {source}")]
    Store {
        /// Core instance name.
        core: String,
        /// Store failure.
        source: StoreError,
    },
}

impl VerificationError {
    /// Instance name of the core that failed.
    #[must_use]
    pub fn core(&self) -> &str {
        match self {
            Self::RequiredWindowUnsatisfiable { core, .. }
            | Self::Provider { core, .. }
            | Self::Condition { core, .. }
            | Self::Store { core, .. } => core,
        }
    }
}

/// Where a core's windows may be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Windows must start at address zero.
    Anchored,
    /// Declared windows are kept when free, otherwise first fit.
    FirstFit,
}

/// Verification state for one platform.
///
/// The session owns the bus table and the store handle; collaborators are
/// borrowed for its lifetime. Each call to [`verify`](Self::verify) starts
/// from a fresh, fully free table.
pub struct VerificationSession<'a, P: ?Sized, C: ?Sized, S> {
    bus_names: Vec<String>,
    table: BusRangeTable,
    provider: &'a P,
    conditions: &'a C,
    store: S,
    config: VerifierConfig,
}

impl<'a, P, C, S> VerificationSession<'a, P, C, S>
where
    P: DescriptorProvider + ?Sized,
    C: ConditionEvaluator + ?Sized,
    S: AddressMapStore,
{
    /// Creates a session for the system buses in `bus_names`.
    pub fn new<I, N>(
        bus_names: I,
        provider: &'a P,
        conditions: &'a C,
        store: S,
        config: VerifierConfig,
    ) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let bus_names: Vec<String> = bus_names.into_iter().map(Into::into).collect();
        Self {
            table: BusRangeTable::new(bus_names.iter().cloned()),
            bus_names,
            provider,
            conditions,
            store,
            config,
        }
    }

    /// Bus allocations made by the most recent pass.
    #[must_use]
    pub const fn table(&self) -> &BusRangeTable {
        &self.table
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Shared access to the address-map store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consumes the session, returning the address-map store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Validates and, where needed, regenerates the address windows of
    /// every core in `cores`.
    ///
    /// Parameters of `cores` are rewritten in place for generated,
    /// anchored, and dropped windows. Store updates made before a failure
    /// are kept.
    ///
    /// # Errors
    ///
    /// Returns the first [`VerificationError`] met; the pass stops there.
    pub fn verify(&mut self, cores: &mut [Core]) -> Result<VerificationReport, VerificationError> {
        self.table = BusRangeTable::new(self.bus_names.iter().cloned());
        info!(
            "verifying {} cores on {} buses for platform '{}'",
            cores.len(),
            self.table.len(),
            self.config.platform_id
        );

        let mut report = VerificationReport::default();

        for placement in [Placement::Anchored, Placement::FirstFit] {
            for core in cores.iter_mut() {
                let anchored = self.config.is_memory_controller(&core.core_type);
                if anchored == (placement == Placement::Anchored) {
                    self.verify_core(core, placement, &mut report)?;
                }
            }
        }

        info!(
            "verification finished: {} validated, {} regenerated, {} anchored, {} dropped",
            report.count(WindowOutcome::Validated),
            report.count(WindowOutcome::Regenerated),
            report.count(WindowOutcome::Anchored),
            report.count(WindowOutcome::Dropped)
        );
        Ok(report)
    }

    /// Runs [`verify`](Self::verify), logging any failure and reducing the
    /// result to success or failure.
    pub fn check(&mut self, cores: &mut [Core]) -> bool {
        match self.verify(cores) {
            Ok(_) => true,
            Err(err) => {
                error!("address verification failed: {err}");
                false
            }
        }
    }

    fn verify_core(
        &mut self,
        core: &mut Core,
        placement: Placement,
        report: &mut VerificationReport,
    ) -> Result<(), VerificationError> {
        let windows =
            self.provider
                .address_ranges(core)
                .map_err(|source| VerificationError::Provider {
                    core: core.instance.clone(),
                    source,
                })?;

        for window in &windows {
            let entry = self.verify_window(core, window, placement)?;
            report.windows.push(entry);
        }
        Ok(())
    }

    fn verify_window(
        &mut self,
        core: &mut Core,
        window: &CoreAddressRangeInfo,
        placement: Placement,
    ) -> Result<WindowReport, VerificationError> {
        let skipped = |outcome| WindowReport {
            core: core.instance.clone(),
            base_param: window.base_param.clone(),
            bus: None,
            outcome,
            window: None,
        };

        if let Some(expression) = window.condition.as_deref() {
            let valid = self
                .conditions
                .evaluate(core, expression)
                .map_err(|source| VerificationError::Condition {
                    core: core.instance.clone(),
                    source,
                })?;
            if !valid {
                debug!(
                    "{}: window '{}' disabled by condition '{expression}'",
                    core.instance, window.base_param
                );
                return Ok(skipped(WindowOutcome::SkippedCondition));
            }
        }

        let Some(bus) = self.resolve_bus(core, window) else {
            debug!(
                "{}: window '{}' has no binding to a declared bus",
                core.instance, window.base_param
            );
            return Ok(skipped(WindowOutcome::SkippedNoBus));
        };

        let mut base = declared_address(core, &window.base_param);
        let mut high = declared_address(core, &window.high_param);
        let mut shifted = false;

        if placement == Placement::Anchored {
            if let (Some(b), Some(h)) = (base, high) {
                if h > b && b != 0 {
                    info!(
                        "{}: anchoring memory controller window {} at 0x0",
                        core.instance,
                        format_hex(b, self.config.address_digits)
                    );
                    base = Some(0);
                    high = Some(h - b);
                    shifted = true;
                }
            }
        }

        let Some(range) = self.table.range_mut(&bus) else {
            return Ok(skipped(WindowOutcome::SkippedNoBus));
        };

        let resolved = match (base, high) {
            (Some(b), Some(h)) if h > b && range.is_available(b, h, &core.instance) => {
                range.allocate(b, h, &core.instance);
                debug!(
                    "{}: window '{}' [{b:#X}, {h:#X}] accepted on bus '{bus}'",
                    core.instance, window.base_param
                );
                let outcome = if shifted {
                    WindowOutcome::Anchored
                } else {
                    WindowOutcome::Validated
                };
                Some((b, h, outcome))
            }
            _ => {
                let hint = match (base, high) {
                    (Some(b), Some(h)) if h > b => Some(h - b),
                    _ => None,
                };
                let min_base = match placement {
                    Placement::Anchored => BUS_DOMAIN_START,
                    Placement::FirstFit => self.config.minimum_base,
                };
                hint.and_then(|size| range.locate_free_space(size, min_base, &core.instance))
                    .or_else(|| range.locate_free_space(window.min_size, min_base, &core.instance))
                    .map(|(b, h)| (b, h, WindowOutcome::Regenerated))
            }
        };

        let Some((base, high, outcome)) = resolved else {
            if window.required {
                error!(
                    "{}: required window '{}' does not fit on bus '{bus}'",
                    core.instance, window.base_param
                );
                return Err(VerificationError::RequiredWindowUnsatisfiable {
                    core: core.instance.clone(),
                    base_param: window.base_param.clone(),
                    bus,
                    min_size: window.min_size,
                });
            }
            warn!(
                "{}: optional window '{}' does not fit on bus '{bus}', removing it",
                core.instance, window.base_param
            );
            core.remove_parameter(&window.base_param);
            core.remove_parameter(&window.high_param);
            return Ok(WindowReport {
                core: core.instance.clone(),
                base_param: window.base_param.clone(),
                bus: Some(bus),
                outcome: WindowOutcome::Dropped,
                window: None,
            });
        };

        if outcome == WindowOutcome::Regenerated {
            warn!(
                "{}: window '{}' regenerated as [{base:#X}, {high:#X}] on bus '{bus}'",
                core.instance, window.base_param
            );
            if placement == Placement::Anchored && base != 0 {
                warn!(
                    "{}: memory controller window could not be placed at 0x0",
                    core.instance
                );
            }
        }
        if outcome != WindowOutcome::Validated {
            let digits = self.config.address_digits;
            core.set_parameter(window.base_param.clone(), format_hex(base, digits));
            core.set_parameter(window.high_param.clone(), format_hex(high, digits));
        }

        let key = RecordKey {
            core_instance: &core.instance,
            core_type: &core.core_type,
            platform_id: &self.config.platform_id,
        };
        let update = AddressUpdate {
            base,
            high,
            digits: self.config.address_digits,
        };
        self.store
            .update(&key, &update)
            .map_err(|source| VerificationError::Store {
                core: core.instance.clone(),
                source,
            })?;

        Ok(WindowReport {
            core: core.instance.clone(),
            base_param: window.base_param.clone(),
            bus: Some(bus),
            outcome,
            window: Some((base, high)),
        })
    }

    fn resolve_bus(&self, core: &Core, window: &CoreAddressRangeInfo) -> Option<String> {
        core.bus_interfaces
            .iter()
            .find(|binding| {
                window.allows_interface(&binding.interface) && self.table.contains(&binding.bus)
            })
            .map(|binding| binding.bus.clone())
    }
}

/// Reads an address parameter. Empty or malformed literals count as
/// absent, which sends the window down the regeneration path.
fn declared_address(core: &Core, name: &str) -> Option<u64> {
    let literal = core.parameter(name)?;
    parse_literal(literal)
        .inspect_err(|err| warn!("{}: {err}; treating '{name}' as unset", core.instance))
        .ok()
}

/// Runs one verification pass with freshly built state.
///
/// # Errors
///
/// Returns the [`VerificationError`] that aborted the pass.
pub fn verify<P, C, S>(
    bus_names: &[String],
    cores: &mut [Core],
    provider: &P,
    conditions: &C,
    store: S,
    config: VerifierConfig,
) -> Result<VerificationReport, VerificationError>
where
    P: DescriptorProvider + ?Sized,
    C: ConditionEvaluator + ?Sized,
    S: AddressMapStore,
{
    VerificationSession::new(bus_names.iter().cloned(), provider, conditions, store, config)
        .verify(cores)
}

#[cfg(test)]
mod tests {
    use super::{VerificationError, VerificationSession};
    use crate::condition::AlwaysValid;
    use crate::config::VerifierConfig;
    use crate::descriptor::StaticDescriptorProvider;
    use crate::design::{Core, CoreAddressRangeInfo};
    use crate::record::{AddressMap, AddressMapStore, AddressUpdate, RecordKey, StoreError};
    use crate::report::WindowOutcome;

    fn provider() -> StaticDescriptorProvider {
        StaticDescriptorProvider::new().with(
            "xps_uartlite",
            vec![CoreAddressRangeInfo::new(
                "C_BASEADDR",
                "C_HIGHADDR",
                0xFFFF,
                true,
                ["SPLB"],
            )],
        )
    }

    fn uart(name: &str, base: &str, high: &str) -> Core {
        Core::new(name, "xps_uartlite")
            .with_parameter("C_BASEADDR", base)
            .with_parameter("C_HIGHADDR", high)
            .with_bus_interface("SPLB", "plb")
    }

    #[test]
    fn valid_free_window_is_kept_and_persisted() {
        let provider = provider();
        let mut session = VerificationSession::new(
            ["plb"],
            &provider,
            &AlwaysValid,
            AddressMap::new(),
            VerifierConfig::for_platform("ml507"),
        );
        let mut cores = vec![uart("uart_0", "0x84000000", "0x8400FFFF")];

        let report = session.verify(&mut cores).expect("pass succeeds");

        assert_eq!(report.windows[0].outcome, WindowOutcome::Validated);
        assert_eq!(cores[0].parameter("C_BASEADDR"), Some("0x84000000"));
        let key = RecordKey {
            core_instance: "uart_0",
            core_type: "xps_uartlite",
            platform_id: "ml507",
        };
        let record = session.store().find(&key).expect("record written");
        assert_eq!(record.size, "0x00010000");
    }

    #[test]
    fn colliding_window_is_regenerated_with_same_size() {
        let provider = provider();
        let mut session = VerificationSession::new(
            ["plb"],
            &provider,
            &AlwaysValid,
            AddressMap::new(),
            VerifierConfig::default(),
        );
        let mut cores = vec![
            uart("uart_0", "0x0", "0xFFFF"),
            uart("uart_1", "0x8000", "0x17FFF"),
        ];

        let report = session.verify(&mut cores).expect("pass succeeds");

        assert_eq!(report.windows[1].outcome, WindowOutcome::Regenerated);
        assert_eq!(report.windows[1].window, Some((0x10000, 0x1FFFF)));
        assert_eq!(cores[1].parameter("C_BASEADDR"), Some("0x00010000"));
        assert_eq!(cores[1].parameter("C_HIGHADDR"), Some("0x0001FFFF"));
    }

    #[test]
    fn malformed_base_with_valid_high_is_regenerated() {
        let provider = provider();
        let mut session = VerificationSession::new(
            ["plb"],
            &provider,
            &AlwaysValid,
            AddressMap::new(),
            VerifierConfig::default(),
        );
        let mut cores = vec![uart("uart_0", "0xZZ", "0xFFFF")];

        let report = session.verify(&mut cores).expect("pass succeeds");

        assert_eq!(report.windows[0].outcome, WindowOutcome::Regenerated);
        assert_eq!(cores[0].parameter("C_BASEADDR"), Some("0x00000000"));
        assert_eq!(cores[0].parameter("C_HIGHADDR"), Some("0x0000FFFF"));
    }

    #[test]
    fn rerunning_a_session_starts_from_a_fresh_table() {
        let provider = provider();
        let mut session = VerificationSession::new(
            ["plb"],
            &provider,
            &AlwaysValid,
            AddressMap::new(),
            VerifierConfig::default(),
        );
        let mut cores = vec![uart("uart_0", "0x0", "0xFFFF")];

        session.verify(&mut cores).expect("first pass");
        let report = session.verify(&mut cores).expect("second pass");

        assert_eq!(report.windows[0].outcome, WindowOutcome::Validated);
        assert_eq!(
            session.table().get("plb").map(|r| r.allocated().len()),
            Some(1)
        );
    }

    struct FailingStore;

    impl AddressMapStore for FailingStore {
        fn update(
            &mut self,
            _key: &RecordKey<'_>,
            _update: &AddressUpdate,
        ) -> Result<(), StoreError> {
            Err(StoreError::new("disk full"))
        }
    }

    #[test]
    fn store_failure_aborts_the_pass() {
        let provider = provider();
        let mut session = VerificationSession::new(
            ["plb"],
            &provider,
            &AlwaysValid,
            FailingStore,
            VerifierConfig::default(),
        );
        let mut cores = vec![uart("uart_0", "0x0", "0xFFFF")];

        let err = session.verify(&mut cores).expect_err("store fails");
        assert!(matches!(err, VerificationError::Store { .. }));
        assert_eq!(err.core(), "uart_0");
        assert!(!session.check(&mut cores));
    }
}
