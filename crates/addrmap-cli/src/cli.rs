//! Command line parsing and [`Action`] construction.

use std::ffi::OsString;
use std::path::PathBuf;

use addrmap_core::{parse_literal, DEFAULT_ADDRESS_DIGITS};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

/// Parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cli {
    /// Number of `-v` flags given.
    pub verbosity: u8,
    /// The action to carry out.
    pub action: Action,
}

/// The action to carry out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Verify a design and write the reconciled design and address map.
    Verify(VerifyConfig),
    /// Verify a design without writing anything.
    Check(VerifyConfig),
    /// Print an address literal in every supported base.
    Literal(LiteralConfig),
}

/// Inputs of a verification run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyConfig {
    /// Design document to verify.
    pub design: PathBuf,
    /// Address-map file to update.
    pub address_map: Option<PathBuf>,
    /// Where to write the reconciled design; defaults to `design`.
    pub output: Option<PathBuf>,
    /// Platform identifier overriding the design's own.
    pub platform: Option<String>,
    /// Memory-controller core type overriding the design's own.
    pub memory_controller: Option<String>,
    /// Lowest base address for generated windows.
    pub minimum_base: Option<u64>,
}

/// Inputs of the `literal` action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiteralConfig {
    /// Decoded value.
    pub value: u64,
    /// Minimum hex digits to render.
    pub digits: usize,
}

/// Parses the process arguments, exiting with usage on error.
#[must_use]
pub fn get_cli() -> Cli {
    parse_matches(&command_parser().get_matches())
}

/// Parses `args` (including the binary name).
///
/// # Errors
///
/// Returns the [`clap::Error`] describing invalid usage.
pub fn try_parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Ok(parse_matches(&command_parser().try_get_matches_from(args)?))
}

/// Returns the command parser for all [`Action`]s.
#[must_use]
pub fn command_parser() -> Command {
    Command::new("addrmap")
        .about("Verifies and generates bus address maps for FPGA platform designs")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Log more detail; repeat for debug output"),
        )
        .subcommand(
            verify_parser(
                "verify",
                "Verify a design, regenerate colliding windows, and write the results",
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .env("ADDRMAP_OUTPUT")
                    .value_parser(value_parser!(PathBuf))
                    .help("Where to write the reconciled design [default: DESIGN]"),
            ),
        )
        .subcommand(verify_parser(
            "check",
            "Verify a design without writing any file",
        ))
        .subcommand(literal_parser())
        .subcommand_required(true)
        .arg_required_else_help(true)
}

fn verify_parser(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(
            Arg::new("design")
                .value_name("DESIGN")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Platform design document (JSON)"),
        )
        .arg(
            Arg::new("address-map")
                .short('m')
                .long("address-map")
                .env("ADDRMAP_ADDRESS_MAP")
                .value_parser(value_parser!(PathBuf))
                .help("Address-map file to update"),
        )
        .arg(
            Arg::new("platform")
                .long("platform")
                .env("ADDRMAP_PLATFORM")
                .help("Platform identifier for address-map records"),
        )
        .arg(
            Arg::new("memory-controller")
                .long("memory-controller")
                .env("ADDRMAP_MEMORY_CONTROLLER")
                .help("Core type anchored at address 0"),
        )
        .arg(
            Arg::new("minimum-base")
                .long("minimum-base")
                .env("ADDRMAP_MINIMUM_BASE")
                .value_parser(parse_address)
                .help("Lowest base address for generated windows"),
        )
}

fn literal_parser() -> Command {
    Command::new("literal")
        .about("Print an address literal in hexadecimal, binary, and decimal")
        .arg(
            Arg::new("value")
                .value_name("VALUE")
                .required(true)
                .value_parser(parse_address)
                .help("Literal in 0x/0h, 0b, or decimal form"),
        )
        .arg(
            Arg::new("digits")
                .long("digits")
                .env("ADDRMAP_DIGITS")
                .value_parser(value_parser!(usize))
                .help("Minimum hex digits [default: 8]"),
        )
}

fn parse_address(value: &str) -> Result<u64, String> {
    parse_literal(value).map_err(|err| err.to_string())
}

fn parse_matches(matches: &ArgMatches) -> Cli {
    let Some((subcommand_name, subcommand_matches)) = matches.subcommand() else {
        unreachable!("subcommand is required");
    };
    let verbosity = subcommand_matches.get_count("verbose");
    let action = match subcommand_name {
        "verify" => Action::Verify(parse_verify_arguments(subcommand_matches)),
        "check" => Action::Check(parse_verify_arguments(subcommand_matches)),
        "literal" => Action::Literal(parse_literal_arguments(subcommand_matches)),
        _ => unreachable!("unexpected subcommand: {subcommand_name:?}"),
    };
    Cli { verbosity, action }
}

fn parse_verify_arguments(matches: &ArgMatches) -> VerifyConfig {
    let design = matches
        .get_one::<PathBuf>("design")
        .cloned()
        .unwrap_or_else(|| unreachable!("`design` is a required argument"));

    VerifyConfig {
        design,
        address_map: matches.get_one::<PathBuf>("address-map").cloned(),
        output: matches
            .try_get_one::<PathBuf>("output")
            .ok()
            .flatten()
            .cloned(),
        platform: matches.get_one::<String>("platform").cloned(),
        memory_controller: matches.get_one::<String>("memory-controller").cloned(),
        minimum_base: matches.get_one::<u64>("minimum-base").copied(),
    }
}

fn parse_literal_arguments(matches: &ArgMatches) -> LiteralConfig {
    LiteralConfig {
        value: matches
            .get_one::<u64>("value")
            .copied()
            .unwrap_or_else(|| unreachable!("`value` is a required argument")),
        digits: matches
            .get_one::<usize>("digits")
            .copied()
            .unwrap_or(DEFAULT_ADDRESS_DIGITS),
    }
}
