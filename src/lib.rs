//! WIR Converter - convolution-reverb IR extraction
//!
//! Converts the proprietary impulse-response files referenced by a preset
//! document into standard WAV files.
//!
//! # Pipeline
//!
//! For every variation of every preset:
//! - Resolve the referenced IR file below the document's directory
//! - Classify its channel topology (mono, stereo, true stereo, binaural)
//! - Repair the obfuscated container header into a valid WAV header
//! - Optionally normalize the samples (preset factor or peak)
//! - Split true-stereo results into two stereo files

pub mod audio;
pub mod cli;
pub mod container;
pub mod error;
pub mod preset;
pub mod report;
pub mod topology;

pub use error::{ConvertError, Result};
