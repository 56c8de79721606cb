//! Audio file I/O for the converter
//!
//! Reads and writes WAV files as interleaved 32-bit float buffers while
//! keeping the sample rate and sample format of the source. Integer PCM is
//! scaled into [-1.0, 1.0) on read and back to its bit depth on write.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{ConvertError, Result};

/// Interleaved audio with the spec it was read with
#[derive(Debug, Clone)]
pub struct WavAudio {
    pub spec: WavSpec,
    /// Interleaved samples (frame 0 ch 0, frame 0 ch 1, ...)
    pub samples: Vec<f32>,
}

impl WavAudio {
    /// Number of interleaved channels
    #[inline]
    pub fn channels(&self) -> u16 {
        self.spec.channels
    }

    /// Number of frames (samples per channel)
    #[inline]
    pub fn frames(&self) -> usize {
        match self.spec.channels {
            0 => 0,
            ch => self.samples.len() / ch as usize,
        }
    }

    /// Maximum absolute sample value across all channels and frames
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
    }

    /// Copy the channels in `range` out of every frame
    ///
    /// The returned audio keeps the sample rate and format of `self`.
    pub fn select_channels(&self, range: std::ops::Range<usize>) -> WavAudio {
        let channels = self.spec.channels as usize;
        let width = range.len();
        let mut samples = Vec::with_capacity(self.frames() * width);

        for frame in self.samples.chunks_exact(channels) {
            samples.extend_from_slice(&frame[range.clone()]);
        }

        WavAudio {
            spec: WavSpec {
                channels: width as u16,
                ..self.spec
            },
            samples,
        }
    }
}

/// Read a WAV file into an interleaved f32 buffer
///
/// # Errors
/// * `FileRead` - If the file does not exist
/// * `InvalidAudio` - If the file is not a readable WAV file
/// * `UnsupportedSampleFormat` - If the bit depth has no f32 mapping
pub fn read_wav(path: &Path) -> Result<WavAudio> {
    if !path.exists() {
        return Err(ConvertError::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }

    let reader = WavReader::open(path).map_err(|e| invalid_audio(path, e))?;
    let spec = reader.spec();
    let samples = read_samples_as_f32(reader, path)?;

    Ok(WavAudio { spec, samples })
}

/// Write an interleaved f32 buffer using `audio.spec`
///
/// The file is created or truncated; the writer is finalized before return
/// so the header sizes are correct.
pub fn write_wav(path: &Path, audio: &WavAudio) -> Result<()> {
    let spec = audio.spec;
    let mut writer = WavWriter::create(path, spec).map_err(|e| invalid_audio(path, e))?;

    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => {
            for &sample in &audio.samples {
                writer.write_sample(sample).map_err(|e| invalid_audio(path, e))?;
            }
        }
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            for &sample in &audio.samples {
                writer
                    .write_sample(f32_to_int(sample, bits))
                    .map_err(|e| invalid_audio(path, e))?;
            }
        }
        (format, bits) => {
            return Err(ConvertError::UnsupportedSampleFormat {
                format: format!("{:?} {}-bit", format, bits),
            });
        }
    }

    writer.finalize().map_err(|e| invalid_audio(path, e))
}

/// Full-scale divisor of a signed integer sample of `bits` bits
pub(crate) fn int_full_scale(bits: u16) -> f64 {
    (1u64 << (bits - 1)) as f64
}

/// Scale an f32 sample to a signed integer of `bits` bits, clamping to range
pub(crate) fn f32_to_int(sample: f32, bits: u16) -> i32 {
    let scale = int_full_scale(bits);
    (sample as f64 * scale).round().clamp(-scale, scale - 1.0) as i32
}

// ============================================================================
// Internal helper functions
// ============================================================================

fn invalid_audio(path: &Path, source: hound::Error) -> ConvertError {
    ConvertError::InvalidAudio {
        path: path.to_path_buf(),
        source,
    }
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(mut reader: WavReader<R>, path: &Path) -> Result<Vec<f32>> {
    let spec = reader.spec();
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid_audio(path, e)),
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let scale = int_full_scale(bits);
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| (v as f64 / scale) as f32))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid_audio(path, e))
        }
        (format, bits) => Err(ConvertError::UnsupportedSampleFormat {
            format: format!("{:?} {}-bit", format, bits),
        }),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    fn float_spec(channels: u16) -> WavSpec {
        WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        }
    }

    #[test]
    fn test_frames_and_peak() {
        let audio = WavAudio {
            spec: float_spec(2),
            samples: vec![0.1, -0.7, 0.3, 0.2, -0.05, 0.4],
        };
        assert_eq!(audio.frames(), 3);
        assert_abs_diff_eq!(audio.peak(), 0.7);
    }

    #[test]
    fn test_select_channels() {
        let audio = WavAudio {
            spec: float_spec(4),
            samples: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        };

        let upper = audio.select_channels(2..4);
        assert_eq!(upper.channels(), 2);
        assert_eq!(upper.spec.sample_rate, 44100);
        assert_eq!(upper.samples, vec![3.0, 4.0, 7.0, 8.0]);
    }

    #[test]
    fn test_float_write_read_is_lossless() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let audio = WavAudio {
            spec: float_spec(1),
            samples: vec![0.0, 0.123_456_79, -0.987_654_3, 1.5],
        };

        write_wav(&path, &audio).unwrap();
        let read = read_wav(&path).unwrap();

        assert_eq!(read.spec, audio.spec);
        assert_eq!(read.samples, audio.samples);
    }

    #[test]
    fn test_int16_preserves_spec() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("int16.wav");
        let audio = WavAudio {
            spec: WavSpec {
                channels: 2,
                sample_rate: 48000,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
            samples: vec![0.5, -0.5, 0.25, -1.0],
        };

        write_wav(&path, &audio).unwrap();
        let read = read_wav(&path).unwrap();

        assert_eq!(read.spec, audio.spec);
        for (a, b) in audio.samples.iter().zip(read.samples.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1.0 / 32768.0);
        }
    }

    #[test]
    fn test_f32_to_int_clamps() {
        assert_eq!(f32_to_int(1.0, 16), 32767);
        assert_eq!(f32_to_int(-1.0, 16), -32768);
        assert_eq!(f32_to_int(2.0, 8), 127);
        assert_eq!(f32_to_int(0.5, 24), 4_194_304);
    }

    #[test]
    fn test_read_nonexistent_file() {
        match read_wav(Path::new("/nonexistent/path/ir.wav")).unwrap_err() {
            ConvertError::FileRead { path, .. } => {
                assert!(path.to_string_lossy().contains("nonexistent"));
            }
            other => panic!("Expected FileRead error, got: {:?}", other),
        }
    }
}
