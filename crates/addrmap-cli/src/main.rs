//! CLI entry point for the `addrmap` binary.

use std::env;
use std::process::ExitCode;

use addrmap_cli::cli::get_cli;
use addrmap_cli::commands::run;
use addrmap_cli::logger::{self, LOG_ENV};
use addrmap_core as _;
use anyhow as _;
use clap as _;
use log as _;
use serde as _;
use serde_json as _;
#[cfg(test)]
use tempfile as _;

fn main() -> ExitCode {
    let cli = get_cli();
    let env_level = env::var(LOG_ENV).ok();
    if let Err(err) = logger::init(logger::level_for(cli.verbosity, env_level.as_deref())) {
        eprintln!("warning: {err}");
    }

    match run(&cli.action) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
