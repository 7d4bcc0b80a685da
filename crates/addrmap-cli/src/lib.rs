//! Command-line front end for the bus address-map verifier.

/// Command line parsing.
pub mod cli;
/// Action implementations and report rendering.
pub mod commands;
/// JSON platform design documents.
pub mod design_file;
/// Stderr logger behind the `log` facade.
pub mod logger;
/// JSON-backed address-map store.
pub mod map_file;
