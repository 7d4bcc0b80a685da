//! Implementations of the command line actions.

use std::fmt::Write as _;
use std::path::Path;

use addrmap_core::{
    format_binary, format_hex, verify, AddressMap, AddressMapStore, ParameterConditionEvaluator,
    VerificationReport, VerifierConfig, WindowOutcome, DEFAULT_ADDRESS_DIGITS,
};
use anyhow::Result;
use log::info;

use crate::cli::{Action, LiteralConfig, VerifyConfig};
use crate::design_file::DesignFile;
use crate::map_file::AddressMapFile;

/// Runs `action`, writing its human-readable output to stdout.
///
/// # Errors
///
/// Returns the failure that aborted the action.
pub fn run(action: &Action) -> Result<()> {
    match action {
        Action::Verify(config) => {
            let report = verify_design(config, true)?;
            print!("{}", format_report(&report, DEFAULT_ADDRESS_DIGITS));
        }
        Action::Check(config) => {
            let report = verify_design(config, false)?;
            print!("{}", format_report(&report, DEFAULT_ADDRESS_DIGITS));
        }
        Action::Literal(config) => print!("{}", format_literal(*config)),
    }
    Ok(())
}

/// Builds the verifier settings; command line values win over `design`.
#[must_use]
pub fn verifier_config(config: &VerifyConfig, design: &DesignFile) -> VerifierConfig {
    let mut settings = VerifierConfig::for_platform(
        config
            .platform
            .clone()
            .or_else(|| design.platform.clone())
            .unwrap_or_default(),
    );
    settings.memory_controller = config
        .memory_controller
        .clone()
        .or_else(|| design.memory_controller.clone());
    if let Some(minimum_base) = config.minimum_base {
        settings.minimum_base = minimum_base;
    }
    settings
}

/// Verifies the design named by `config`.
///
/// With `write` set, the address map is updated on disk as windows are
/// resolved and the reconciled design is written to the output path.
/// Otherwise both are left untouched.
///
/// # Errors
///
/// Fails when an input cannot be loaded, verification aborts, or an
/// output cannot be written.
pub fn verify_design(config: &VerifyConfig, write: bool) -> Result<VerificationReport> {
    let mut design = DesignFile::load(&config.design)?;
    let settings = verifier_config(config, &design);

    let report = match (&config.address_map, write) {
        (Some(path), true) => run_pass(&mut design, AddressMapFile::open(path)?, settings)?,
        (Some(path), false) => {
            run_pass(&mut design, AddressMapFile::open(path)?.into_map(), settings)?
        }
        (None, _) => run_pass(&mut design, AddressMap::new(), settings)?,
    };

    if write {
        let output: &Path = config.output.as_deref().unwrap_or(&config.design);
        design.save(output)?;
        info!("wrote design to {}", output.display());
    }
    Ok(report)
}

fn run_pass<S: AddressMapStore>(
    design: &mut DesignFile,
    store: S,
    settings: VerifierConfig,
) -> Result<VerificationReport> {
    Ok(verify(
        &design.buses,
        &mut design.cores,
        &design.descriptors,
        &ParameterConditionEvaluator,
        store,
        settings,
    )?)
}

/// Short label for an outcome, as printed in reports.
#[must_use]
pub const fn outcome_label(outcome: WindowOutcome) -> &'static str {
    match outcome {
        WindowOutcome::Validated => "validated",
        WindowOutcome::Regenerated => "regenerated",
        WindowOutcome::Anchored => "anchored",
        WindowOutcome::Dropped => "dropped",
        WindowOutcome::SkippedCondition => "skipped (condition)",
        WindowOutcome::SkippedNoBus => "skipped (no bus)",
    }
}

/// Renders one line per window followed by a summary line.
#[must_use]
pub fn format_report(report: &VerificationReport, digits: usize) -> String {
    let mut out = String::new();
    for entry in &report.windows {
        let window = entry.window.map_or_else(
            || "-".to_string(),
            |(base, high)| {
                format!(
                    "{}..{}",
                    format_hex(base, digits),
                    format_hex(high, digits)
                )
            },
        );
        let _ = writeln!(
            out,
            "{} {} {} {} {}",
            entry.core,
            entry.base_param,
            entry.bus.as_deref().unwrap_or("-"),
            window,
            outcome_label(entry.outcome)
        );
    }
    let _ = writeln!(
        out,
        "{} windows: {} validated, {} regenerated, {} anchored, {} dropped",
        report.windows.len(),
        report.count(WindowOutcome::Validated),
        report.count(WindowOutcome::Regenerated),
        report.count(WindowOutcome::Anchored),
        report.count(WindowOutcome::Dropped),
    );
    out
}

/// Renders `config.value` in hexadecimal, binary, and decimal.
#[must_use]
pub fn format_literal(config: LiteralConfig) -> String {
    format!(
        "hex: {}\nbinary: {}\ndecimal: {}\n",
        format_hex(config.value, config.digits),
        format_binary(config.value, config.digits.saturating_mul(4)),
        config.value
    )
}
