//! Channel Topology Classification
//!
//! Maps the (input, output) channel counts stored in preset metadata to the
//! role of the converted file. The role decides the output name suffix and
//! whether the result must be split into two stereo files.

use std::fmt;

use serde::Serialize;

/// Output role of a converted IR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Mono,
    Stereo,
    TrueStereo,
    /// Recognized from the preset metadata; processing beyond renaming is
    /// not known, so none is applied.
    MonoBinaural,
    /// See [`Role::MonoBinaural`].
    StereoBinaural,
}

/// Every recognized (input channels, output channels) pair
const TOPOLOGY_TABLE: [((u32, u32), Role); 5] = [
    ((1, 1), Role::Mono),
    ((1, 2), Role::Stereo),
    ((2, 2), Role::TrueStereo),
    ((1, 3), Role::MonoBinaural),
    ((2, 3), Role::StereoBinaural),
];

impl Role {
    /// File name suffix appended to the preset name
    pub fn suffix(&self) -> &'static str {
        match self {
            Role::Mono => "_mono",
            Role::Stereo => "_stereo",
            Role::TrueStereo => "_true_stereo",
            Role::MonoBinaural => "_mono_binaural",
            Role::StereoBinaural => "_stereo_binaural",
        }
    }

    /// Human-readable name for progress output
    pub fn label(&self) -> &'static str {
        match self {
            Role::Mono => "Mono",
            Role::Stereo => "Stereo",
            Role::TrueStereo => "True Stereo",
            Role::MonoBinaural => "Mono Binaural",
            Role::StereoBinaural => "Stereo Binaural",
        }
    }

    /// Whether the converted file must be split into two stereo files
    pub fn requires_split(&self) -> bool {
        matches!(self, Role::TrueStereo)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of classifying a channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Supported(Role),
    /// Not an error: the variation is reported and skipped.
    Unsupported { input: u32, output: u32 },
}

impl Topology {
    /// Progress line printed when a variation of `preset` is skipped; `None`
    /// for supported topologies.
    pub fn skip_message(&self, preset: &str) -> Option<String> {
        match *self {
            Topology::Supported(_) => None,
            Topology::Unsupported { input, output } => Some(format!(
                "Unsupported channel configuration in preset \"{}\": {}ch in / {}ch out, skipping",
                preset, input, output
            )),
        }
    }
}

/// Classify a channel configuration.
pub fn classify(input_channels: u32, output_channels: u32) -> Topology {
    TOPOLOGY_TABLE
        .iter()
        .find(|(pair, _)| *pair == (input_channels, output_channels))
        .map(|&(_, role)| Topology::Supported(role))
        .unwrap_or(Topology::Unsupported {
            input: input_channels,
            output: output_channels,
        })
}
