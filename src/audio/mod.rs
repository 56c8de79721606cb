//! Audio Module
//!
//! Post-processing of repaired IR files:
//! - WAV read/write with spec preservation
//! - In-place normalization
//! - True-stereo splitting

pub mod io;
pub mod normalize;
pub mod split;

pub use io::{read_wav, write_wav, WavAudio};
pub use normalize::{normalize_in_place, Normalization, NormalizationMode};
pub use split::{split_true_stereo, SplitPair};
