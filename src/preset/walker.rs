//! Preset Walker
//!
//! Drives a conversion run: every variation of every preset is resolved to
//! its IR file, classified, repaired into a WAV file next to the source, and
//! then normalized and split as its configuration requires.
//!
//! Variations are processed strictly in document order. The walker only
//! creates files; it never rewrites the preset document or the raw IRs.

use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;

use crate::audio::{normalize_in_place, split_true_stereo, Normalization, NormalizationMode, SplitPair};
use crate::container::repair_file;
use crate::error::Result;
use crate::preset::document::{Preset, PresetDocument, Variation};
use crate::preset::resolver::{IrResolver, ResolvePolicy, WalkDirResolver};
use crate::report::{OutcomeStatus, RunReport, VariationOutcome};
use crate::topology::{classify, Role, Topology};

/// Default extension of converted files
pub const DEFAULT_OUTPUT_EXTENSION: &str = "wav";

/// How hard per-variation failures are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Abort the run on the first failure
    #[default]
    FailFast,
    /// Record the failure and continue with the next variation
    KeepGoing,
}

/// Configuration of a conversion run
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Normalization applied to every converted file (none by default)
    pub normalization: Option<NormalizationMode>,
    pub resolve_policy: ResolvePolicy,
    pub error_policy: ErrorPolicy,
    /// Extension of converted files, without the dot
    pub output_extension: String,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        WalkerConfig {
            normalization: None,
            resolve_policy: ResolvePolicy::default(),
            error_policy: ErrorPolicy::default(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
        }
    }
}

impl WalkerConfig {
    pub fn with_normalization(mut self, mode: NormalizationMode) -> Self {
        self.normalization = Some(mode);
        self
    }

    pub fn with_resolve_policy(mut self, policy: ResolvePolicy) -> Self {
        self.resolve_policy = policy;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}

/// Walks a preset document and converts its IRs
pub struct PresetWalker<R: IrResolver = WalkDirResolver> {
    config: WalkerConfig,
    resolver: R,
}

impl PresetWalker<WalkDirResolver> {
    /// Create a walker that searches the filesystem for IR files
    pub fn new(config: WalkerConfig) -> Self {
        let resolver = WalkDirResolver::new(config.resolve_policy);
        Self { config, resolver }
    }
}

impl<R: IrResolver> PresetWalker<R> {
    /// Create a walker with a custom resolver
    pub fn with_resolver(config: WalkerConfig, resolver: R) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// Convert every variation of `document`.
    ///
    /// # Errors
    /// Any variation failure in fail-fast mode, and failures that are not
    /// scoped to a variation in keep-going mode.
    pub fn run(&self, document: &PresetDocument) -> Result<RunReport> {
        let root = document.root_dir();
        let mut report = RunReport::new(&document.path, self.config.normalization);

        info!(
            "Converting {} presets ({} variations) from {}",
            document.presets.len(),
            document.variation_count(),
            document.path.display()
        );

        for preset in &document.presets {
            println!("Preset \"{}\" Found", preset.name);

            for (index, variation) in preset.variations.iter().enumerate() {
                let status = match self.process_variation(&root, preset, variation) {
                    Ok(status) => status,
                    Err(e) if self.config.error_policy == ErrorPolicy::KeepGoing && e.is_per_variation() => {
                        warn!("Preset \"{}\" variation {}: {}", preset.name, index, e);
                        OutcomeStatus::failed(&e)
                    }
                    Err(e) => return Err(e),
                };

                report.outcomes.push(VariationOutcome {
                    preset: preset.name.clone(),
                    index,
                    input_channels: variation.input_channels,
                    output_channels: variation.output_channels,
                    status,
                });
            }
        }

        info!("Finished: {}", report.summary_line());
        Ok(report)
    }

    /// Convert one variation, reporting unsupported topologies as skipped
    fn process_variation(&self, root: &Path, preset: &Preset, variation: &Variation) -> Result<OutcomeStatus> {
        let source = self.resolver.resolve(root, &variation.ir_reference_name)?;

        let topology = classify(variation.input_channels, variation.output_channels);
        let role = match topology {
            Topology::Supported(role) => role,
            Topology::Unsupported { input, output } => {
                if let Some(message) = topology.skip_message(&preset.name) {
                    println!("{}", message);
                }
                warn!("Skipping preset \"{}\": {}ch -> {}ch is not a known topology", preset.name, input, output);
                return Ok(OutcomeStatus::Unsupported);
            }
        };

        let base = preset.sanitized_name();
        let output = source.with_file_name(format!("{}{}.{}", base, role.suffix(), self.config.output_extension));

        print!("Process {}...", role);
        let result = self.convert(variation, &preset.name, &base, role, &source, &output);
        println!("{}", if result.is_ok() { "Done!" } else { "Failed!" });

        let (normalization_divisor, split) = result?;
        Ok(OutcomeStatus::Converted {
            role,
            source,
            output,
            normalization_divisor,
            split,
        })
    }

    /// Repair, normalize and split, in that order
    fn convert(
        &self,
        variation: &Variation,
        preset_name: &str,
        base: &str,
        role: Role,
        source: &Path,
        output: &Path,
    ) -> Result<(Option<f64>, Option<SplitPair>)> {
        debug!("{} -> {}", source.display(), output.display());
        repair_file(source, output)?;

        let normalization = match self.config.normalization {
            Some(NormalizationMode::Preset) => Some(Normalization::Fixed(variation.norm_factor(preset_name)?)),
            Some(NormalizationMode::Sample) => Some(Normalization::Peak),
            None => None,
        };
        let divisor = normalization
            .map(|n| normalize_in_place(output, n))
            .transpose()?;

        let split = if role.requires_split() {
            let pair = SplitPair::beside(output, base, &self.config.output_extension);
            split_true_stereo(output, &pair)?;
            Some(pair)
        } else {
            None
        };

        Ok((divisor, split))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Resolver that records lookups and never finds anything
    #[derive(Default)]
    struct RecordingResolver {
        lookups: RefCell<Vec<String>>,
    }

    impl IrResolver for RecordingResolver {
        fn resolve(&self, root: &Path, file_name: &str) -> Result<PathBuf> {
            self.lookups.borrow_mut().push(file_name.to_string());
            Err(ConvertError::IrFileNotFound {
                name: file_name.to_string(),
                root: root.to_path_buf(),
            })
        }
    }

    fn document(variations: Vec<Variation>) -> PresetDocument {
        PresetDocument {
            path: PathBuf::from("/nonexistent/bank.xps"),
            presets: vec![Preset {
                name: "Hall".to_string(),
                variations,
            }],
        }
    }

    #[test]
    fn test_default_config() {
        let config = WalkerConfig::default();
        assert_eq!(config.normalization, None);
        assert_eq!(config.resolve_policy, ResolvePolicy::Strict);
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
        assert_eq!(config.output_extension, "wav");
    }

    #[test]
    fn test_fail_fast_propagates_not_found() {
        let doc = document(vec![Variation::new(1, 1, "a.wir"), Variation::new(1, 1, "b.wir")]);
        let walker = PresetWalker::with_resolver(WalkerConfig::default(), RecordingResolver::default());

        let result = walker.run(&doc);
        assert!(matches!(result, Err(ConvertError::IrFileNotFound { .. })));
        assert_eq!(*walker.resolver.lookups.borrow(), vec!["a.wir".to_string()]);
    }

    #[test]
    fn test_keep_going_records_failures() {
        let doc = document(vec![Variation::new(1, 1, "a.wir"), Variation::new(1, 2, "b.wir")]);
        let config = WalkerConfig::default().with_error_policy(ErrorPolicy::KeepGoing);
        let walker = PresetWalker::with_resolver(config, RecordingResolver::default());

        let report = walker.run(&doc).unwrap();
        assert_eq!(report.failed_count(), 2);
        assert_eq!(walker.resolver.lookups.borrow().len(), 2);
        match &report.outcomes[1].status {
            OutcomeStatus::Failed { code, .. } => assert_eq!(*code, "IR_FILE_NOT_FOUND"),
            other => panic!("Expected Failed outcome, got: {:?}", other),
        }
    }

    #[test]
    fn test_builder_methods() {
        let config = WalkerConfig::default()
            .with_normalization(NormalizationMode::Preset)
            .with_resolve_policy(ResolvePolicy::FirstMatch);
        let walker = PresetWalker::new(config);
        assert_eq!(walker.config().normalization, Some(NormalizationMode::Preset));
        assert_eq!(walker.resolver.policy, ResolvePolicy::FirstMatch);
    }
}
