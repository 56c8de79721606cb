//! Run report
//!
//! Records what happened to every variation of a run so the CLI can print a
//! summary and optionally save it as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audio::{NormalizationMode, SplitPair};
use crate::error::{ConvertError, Result};
use crate::topology::Role;

/// Outcome of every variation in a run, in processing order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub document: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub normalization: Option<NormalizationMode>,
    pub outcomes: Vec<VariationOutcome>,
}

/// What happened to one variation
#[derive(Debug, Clone, Serialize)]
pub struct VariationOutcome {
    pub preset: String,
    /// Position of the variation within its preset
    pub index: usize,
    pub input_channels: u32,
    pub output_channels: u32,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Converted {
        role: Role,
        source: PathBuf,
        output: PathBuf,
        /// Divisor applied by normalization, if any
        normalization_divisor: Option<f64>,
        split: Option<SplitPair>,
    },
    Unsupported,
    Failed {
        code: &'static str,
        message: String,
    },
}

impl OutcomeStatus {
    pub fn failed(err: &ConvertError) -> Self {
        OutcomeStatus::Failed {
            code: err.error_code(),
            message: err.to_string(),
        }
    }
}

impl RunReport {
    pub fn new(document: &Path, normalization: Option<NormalizationMode>) -> Self {
        Self {
            document: document.to_path_buf(),
            generated_at: Utc::now(),
            normalization,
            outcomes: Vec::new(),
        }
    }

    pub fn converted_count(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Converted { .. }))
    }

    pub fn unsupported_count(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Unsupported))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// One-line summary for the end of a run
    pub fn summary_line(&self) -> String {
        format!(
            "{} converted, {} unsupported, {} failed",
            self.converted_count(),
            self.unsupported_count(),
            self.failed_count()
        )
    }

    /// Save the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| ConvertError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn outcome(status: OutcomeStatus) -> VariationOutcome {
        VariationOutcome {
            preset: "Hall".to_string(),
            index: 0,
            input_channels: 2,
            output_channels: 2,
            status,
        }
    }

    fn sample_report() -> RunReport {
        let mut report = RunReport::new(Path::new("/presets/bank.xps"), Some(NormalizationMode::Sample));
        report.outcomes.push(outcome(OutcomeStatus::Converted {
            role: Role::TrueStereo,
            source: PathBuf::from("/presets/hall.wir"),
            output: PathBuf::from("/presets/Hall_true_stereo.wav"),
            normalization_divisor: Some(0.5),
            split: Some(SplitPair::beside(Path::new("/presets/hall.wir"), "Hall", "wav")),
        }));
        report.outcomes.push(outcome(OutcomeStatus::Unsupported));
        report.outcomes.push(outcome(OutcomeStatus::failed(&ConvertError::NormFactorMissing {
            preset: "Hall".to_string(),
        })));
        report
    }

    #[test]
    fn test_counts_and_summary() {
        let report = sample_report();
        assert_eq!(report.converted_count(), 1);
        assert_eq!(report.unsupported_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(report.has_failures());
        assert_eq!(report.summary_line(), "1 converted, 1 unsupported, 1 failed");
    }

    #[test]
    fn test_json_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        sample_report().write_json(&path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["normalization"], "sample");

        let outcomes = value["outcomes"].as_array().unwrap();
        assert_eq!(outcomes[0]["status"], "converted");
        assert_eq!(outcomes[0]["role"], "true_stereo");
        assert_eq!(outcomes[0]["split"]["left"], "/presets/Hall L.wav");
        assert_eq!(outcomes[1]["status"], "unsupported");
        assert_eq!(outcomes[2]["code"], "NORM_FACTOR_MISSING");
    }
}
