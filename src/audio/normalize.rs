//! Amplitude normalization
//!
//! Rescales the samples of a converted IR either by the factor stored in the
//! preset or by the file's own peak. The file is rewritten in place: the
//! header bytes stay as they are and only the `data` chunk is overwritten.

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use clap::ValueEnum;
use log::debug;
use serde::Serialize;

use crate::audio::io::{f32_to_int, read_wav, WavAudio};
use crate::container::layout::{read_layout, SampleEncoding};
use crate::error::{ConvertError, Result};

/// Normalization requested for a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// Divide by the `Norm` factor stored with each variation
    Preset,
    /// Normalize each file to unity peak
    Sample,
}

/// Normalization applied to a single file
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    /// Divide every sample by a fixed, non-zero factor
    Fixed(f64),
    /// Divide every sample by the peak absolute sample value
    Peak,
}

/// Normalize the WAV file at `path` in place.
///
/// Returns the divisor that was applied.
///
/// # Errors
/// * `InvalidNormFactor` - If a fixed factor is zero or non-finite
/// * `SilentAudio` - If peak normalization is requested on silence
/// * `UnsupportedSampleFormat` - If the data chunk encoding cannot be written
pub fn normalize_in_place(path: &Path, normalization: Normalization) -> Result<f64> {
    if let Normalization::Fixed(factor) = normalization {
        if factor == 0.0 || !factor.is_finite() {
            return Err(ConvertError::InvalidNormFactor { factor });
        }
    }

    let mut audio = read_wav(path)?;

    let divisor = match normalization {
        Normalization::Fixed(factor) => factor,
        Normalization::Peak => {
            let peak = audio.peak();
            if peak == 0.0 {
                return Err(ConvertError::SilentAudio {
                    path: path.to_path_buf(),
                });
            }
            peak as f64
        }
    };

    debug!("Normalizing {} by {}", path.display(), divisor);

    for sample in audio.samples.iter_mut() {
        *sample = (*sample as f64 / divisor) as f32;
    }

    overwrite_samples(path, &audio)?;

    Ok(divisor)
}

/// Replace the sample bytes of the `data` chunk with the samples of `audio`
///
/// `audio` must be what hound decoded from `path`; the chunk walk has to agree
/// with it before any byte is written.
fn overwrite_samples(path: &Path, audio: &WavAudio) -> Result<()> {
    let layout = read_layout(path)?;
    layout
        .check_against(&audio.spec)
        .map_err(|reason| ConvertError::InvalidLayout {
            path: path.to_path_buf(),
            reason,
        })?;
    let encoding = layout.encoding()?;

    let encoded = encode_samples(&audio.samples, encoding);
    if encoded.len() as u64 > layout.data_len {
        return Err(ConvertError::InvalidLayout {
            path: path.to_path_buf(),
            reason: format!(
                "{} sample bytes do not fit a {}-byte data chunk",
                encoded.len(),
                layout.data_len
            ),
        });
    }

    let write_err = |e: std::io::Error| ConvertError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = OpenOptions::new().write(true).open(path).map_err(write_err)?;
    file.seek(SeekFrom::Start(layout.data_offset)).map_err(write_err)?;
    file.write_all(&encoded).map_err(write_err)?;
    file.flush().map_err(write_err)
}

/// Encode samples as little-endian bytes for `encoding`
fn encode_samples(samples: &[f32], encoding: SampleEncoding) -> Vec<u8> {
    match encoding {
        SampleEncoding::Float32 => samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        SampleEncoding::Pcm { bits: 8 } => samples
            .iter()
            .map(|&s| (f32_to_int(s, 8) + 128) as u8)
            .collect(),
        SampleEncoding::Pcm { bits } => {
            let width = (bits / 8) as usize;
            let mut out = Vec::with_capacity(samples.len() * width);
            for &s in samples {
                out.extend_from_slice(&f32_to_int(s, bits).to_le_bytes()[..width]);
            }
            out
        }
    }
}
