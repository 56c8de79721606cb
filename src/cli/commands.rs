//! CLI Command Implementations
//!
//! Implements the conversion run behind the command line.

use log::info;

use crate::cli::Cli;
use crate::error::Result;
use crate::preset::{PresetDocument, PresetWalker};
use crate::report::RunReport;

/// Convert every IR referenced by the preset document named on the command line.
pub fn convert(cli: &Cli) -> Result<RunReport> {
    info!("Loading preset document: {}", cli.xps_file.display());

    let document = PresetDocument::load(&cli.xps_file)?;
    let walker = PresetWalker::new(cli.walker_config());
    let report = walker.run(&document)?;

    println!("{}", report.summary_line());

    if let Some(report_path) = &cli.report {
        report.write_json(report_path)?;
        println!("Report written: {}", report_path.display());
    }

    Ok(report)
}
