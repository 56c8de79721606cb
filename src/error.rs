//! Error handling for the WIR converter
//!
//! Every failure carries the path or preset it concerns so the diagnostic
//! printed by the CLI identifies what went wrong without extra context.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for converter operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Main error type for converter operations
#[derive(Error, Debug)]
pub enum ConvertError {
    // Resolution Errors
    #[error("IR file '{name}' not found under {root}")]
    IrFileNotFound { name: String, root: PathBuf },

    #[error("IR file '{name}' is ambiguous: {} candidates under {root}", .candidates.len())]
    AmbiguousIrFile {
        name: String,
        root: PathBuf,
        candidates: Vec<PathBuf>,
    },

    // Container Errors
    #[error("Malformed IR container: {len} bytes (header needs at least {required})")]
    MalformedContainer { len: usize, required: usize },

    #[error("Invalid WAV layout in {path}: {reason}")]
    InvalidLayout { path: PathBuf, reason: String },

    // Preset Document Errors
    #[error("Failed to parse preset document {path}: {source}")]
    PresetParse {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Preset document {path} is not readable text: {reason}")]
    PresetEncoding { path: PathBuf, reason: String },

    #[error("Preset element is missing the '{attribute}' attribute")]
    MissingAttribute { attribute: &'static str },

    #[error("Preset \"{preset}\" has a variation without a '{descriptor}' descriptor")]
    MissingDescriptor {
        preset: String,
        descriptor: &'static str,
    },

    #[error("Preset \"{preset}\": descriptor '{descriptor}' has invalid value '{value}'")]
    InvalidDescriptor {
        preset: String,
        descriptor: &'static str,
        value: String,
    },

    // Normalization Errors
    #[error("Preset \"{preset}\" requests preset normalization but has no 'Norm' descriptor")]
    NormFactorMissing { preset: String },

    #[error("Invalid normalization factor: {factor}")]
    InvalidNormFactor { factor: f64 },

    #[error("Preset \"{preset}\": 'Norm' value '{value}' is not a number")]
    InvalidNormText { preset: String, value: String },

    #[error("Cannot peak-normalize silent audio: {path}")]
    SilentAudio { path: PathBuf },

    // Audio Errors
    #[error("Expected {expected} channels, found {found}: {path}")]
    ChannelCountMismatch {
        path: PathBuf,
        expected: u16,
        found: u16,
    },

    #[error("Invalid audio file {path}: {source}")]
    InvalidAudio {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported sample format: {format}")]
    UnsupportedSampleFormat { format: String },

    // I/O Errors
    #[error("Failed to read file: {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConvertError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ConvertError::IrFileNotFound { .. } => "IR_FILE_NOT_FOUND",
            ConvertError::AmbiguousIrFile { .. } => "AMBIGUOUS_IR_FILE",
            ConvertError::MalformedContainer { .. } => "MALFORMED_CONTAINER",
            ConvertError::InvalidLayout { .. } => "INVALID_LAYOUT",
            ConvertError::PresetParse { .. } => "PRESET_PARSE",
            ConvertError::PresetEncoding { .. } => "PRESET_ENCODING",
            ConvertError::MissingAttribute { .. } => "MISSING_ATTRIBUTE",
            ConvertError::MissingDescriptor { .. } => "MISSING_DESCRIPTOR",
            ConvertError::InvalidDescriptor { .. } => "INVALID_DESCRIPTOR",
            ConvertError::NormFactorMissing { .. } => "NORM_FACTOR_MISSING",
            ConvertError::InvalidNormFactor { .. } => "INVALID_NORM_FACTOR",
            ConvertError::InvalidNormText { .. } => "INVALID_NORM_TEXT",
            ConvertError::SilentAudio { .. } => "SILENT_AUDIO",
            ConvertError::ChannelCountMismatch { .. } => "CHANNEL_COUNT_MISMATCH",
            ConvertError::InvalidAudio { .. } => "INVALID_AUDIO",
            ConvertError::UnsupportedSampleFormat { .. } => "UNSUPPORTED_SAMPLE_FORMAT",
            ConvertError::FileRead { .. } => "FILE_READ",
            ConvertError::FileWrite { .. } => "FILE_WRITE",
            ConvertError::Io(_) => "IO_ERROR",
            ConvertError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is scoped to a single variation
    ///
    /// Per-variation errors may be collected in keep-going mode; anything
    /// else (a broken preset document, a failing report write) ends the run.
    pub fn is_per_variation(&self) -> bool {
        matches!(
            self,
            ConvertError::IrFileNotFound { .. }
                | ConvertError::AmbiguousIrFile { .. }
                | ConvertError::MalformedContainer { .. }
                | ConvertError::InvalidLayout { .. }
                | ConvertError::NormFactorMissing { .. }
                | ConvertError::InvalidNormFactor { .. }
                | ConvertError::InvalidNormText { .. }
                | ConvertError::SilentAudio { .. }
                | ConvertError::ChannelCountMismatch { .. }
                | ConvertError::InvalidAudio { .. }
                | ConvertError::UnsupportedSampleFormat { .. }
                | ConvertError::FileRead { .. }
                | ConvertError::FileWrite { .. }
        )
    }
}
