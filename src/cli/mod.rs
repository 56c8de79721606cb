//! CLI Module
//!
//! Command-line interface for the WIR converter.

pub mod commands;

use clap::Parser;
use std::path::PathBuf;

use crate::audio::NormalizationMode;
use crate::preset::{ErrorPolicy, ResolvePolicy, WalkerConfig};

/// WIR Converter - turns convolution-reverb preset IRs into playable WAV files
#[derive(Parser, Debug)]
#[command(name = "wir-converter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// IR preset file (.xps)
    #[arg(value_name = "XPS_FILE")]
    pub xps_file: PathBuf,

    /// Normalize converted files by the stored preset factor or by their own peak
    #[arg(short, long, value_enum)]
    pub normalize: Option<NormalizationMode>,

    /// Use the first matching IR file instead of failing when several match
    #[arg(long)]
    pub first_match: bool,

    /// Keep converting after a variation fails and report failures at the end
    #[arg(short, long)]
    pub keep_going: bool,

    /// Write a JSON report of the run to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the walker configuration selected by the flags
    pub fn walker_config(&self) -> WalkerConfig {
        let mut config = WalkerConfig {
            normalization: self.normalize,
            ..WalkerConfig::default()
        };
        if self.first_match {
            config = config.with_resolve_policy(ResolvePolicy::FirstMatch);
        }
        if self.keep_going {
            config = config.with_error_policy(ErrorPolicy::KeepGoing);
        }
        config
    }
}
