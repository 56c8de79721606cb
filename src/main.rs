//! WIR Converter CLI
//!
//! Command-line interface for converting preset IRs to WAV files.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use wir_converter::cli::{commands, Cli};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("WIR Converter v{}", env!("CARGO_PKG_VERSION"));

    let report = commands::convert(&cli)
        .with_context(|| format!("Failed to convert presets from {}", cli.xps_file.display()))?;

    if report.has_failures() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
