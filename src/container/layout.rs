//! RIFF chunk layout of a repaired container
//!
//! Locates the `fmt ` parameters and the start of the `data` chunk so sample
//! bytes can be rewritten without touching the header.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavSpec};

use crate::error::{ConvertError, Result};

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_IEEE_FLOAT: u16 = 0x0003;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Minimum `fmt ` body (WAVEFORMAT + wBitsPerSample)
const FMT_MIN_LEN: usize = 16;
/// `fmt ` body offset of the sub-format GUID in WAVEFORMATEXTENSIBLE
const EXTENSIBLE_SUBFORMAT_OFFSET: usize = 24;

/// How one sample is encoded in the `data` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    /// IEEE 754 little-endian float
    Float32,
    /// Signed little-endian PCM (unsigned for 8-bit) filling its container
    Pcm { bits: u16 },
}

/// Parameters of a WAVE file needed for in-place sample rewrites
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavLayout {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Absolute file offset of the first sample byte
    pub data_offset: u64,
    /// Length of the sample data in bytes (clamped to the file size)
    pub data_len: u64,
}

impl WavLayout {
    /// Bytes occupied by one sample of one channel
    pub fn bytes_per_sample(&self) -> u16 {
        if self.channels == 0 {
            0
        } else {
            self.block_align / self.channels
        }
    }

    /// Resolve the sample encoding from the format tag and bit depth
    pub fn encoding(&self) -> Result<SampleEncoding> {
        let bytes = self.bytes_per_sample();
        match (self.format_tag, self.bits_per_sample) {
            (WAVE_FORMAT_IEEE_FLOAT, 32) if bytes == 4 => Ok(SampleEncoding::Float32),
            (WAVE_FORMAT_PCM, bits @ (8 | 16 | 24 | 32)) if bytes * 8 == bits => {
                Ok(SampleEncoding::Pcm { bits })
            }
            (tag, bits) => Err(ConvertError::UnsupportedSampleFormat {
                format: format!("format tag 0x{:04X}, {}-bit in {}-byte container", tag, bits, bytes),
            }),
        }
    }

    /// Check that hound decoded the same stream this layout would rewrite.
    pub fn check_against(&self, spec: &WavSpec) -> std::result::Result<(), String> {
        let format_matches = matches!(
            (self.format_tag, spec.sample_format),
            (WAVE_FORMAT_IEEE_FLOAT, SampleFormat::Float) | (WAVE_FORMAT_PCM, SampleFormat::Int)
        );
        if !format_matches
            || self.channels != spec.channels
            || self.sample_rate != spec.sample_rate
            || self.bits_per_sample != spec.bits_per_sample
        {
            return Err(format!(
                "fmt chunk (tag 0x{:04X}, {}ch, {} Hz, {}-bit) disagrees with decoded stream ({:?}, {}ch, {} Hz, {}-bit)",
                self.format_tag,
                self.channels,
                self.sample_rate,
                self.bits_per_sample,
                spec.sample_format,
                spec.channels,
                spec.sample_rate,
                spec.bits_per_sample
            ));
        }
        Ok(())
    }
}

/// Read the layout of the WAVE file at `path`.
pub fn read_layout(path: &Path) -> Result<WavLayout> {
    let bytes = fs::read(path).map_err(|e| ConvertError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_layout(&bytes).map_err(|reason| ConvertError::InvalidLayout {
        path: path.to_path_buf(),
        reason,
    })
}

/// Walk the RIFF chunks of `bytes` up to and including the `data` chunk.
pub fn parse_layout(bytes: &[u8]) -> std::result::Result<WavLayout, String> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err("missing RIFF/WAVE signature".to_string());
    }

    let mut fmt: Option<(u16, u16, u32, u16, u16)> = None;
    let mut pos = 12usize;

    while pos + 8 <= bytes.len() {
        let id = &bytes[pos..pos + 4];
        let size = read_u32(bytes, pos + 4) as usize;
        let body = pos + 8;

        match id {
            b"fmt " => {
                if size < FMT_MIN_LEN || body + size > bytes.len() {
                    return Err(format!("truncated fmt chunk ({} bytes)", size));
                }
                let mut format_tag = read_u16(bytes, body);
                if format_tag == WAVE_FORMAT_EXTENSIBLE && size >= EXTENSIBLE_SUBFORMAT_OFFSET + 2 {
                    format_tag = read_u16(bytes, body + EXTENSIBLE_SUBFORMAT_OFFSET);
                }
                fmt = Some((
                    format_tag,
                    read_u16(bytes, body + 2),
                    read_u32(bytes, body + 4),
                    read_u16(bytes, body + 12),
                    read_u16(bytes, body + 14),
                ));
            }
            b"data" => {
                let (format_tag, channels, sample_rate, block_align, bits_per_sample) =
                    fmt.ok_or_else(|| "data chunk precedes fmt chunk".to_string())?;
                let available = bytes.len() - body;
                return Ok(WavLayout {
                    format_tag,
                    channels,
                    sample_rate,
                    block_align,
                    bits_per_sample,
                    data_offset: body as u64,
                    data_len: size.min(available) as u64,
                });
            }
            _ => {}
        }

        // Chunks are padded to even sizes
        pos = body.saturating_add(size).saturating_add(size & 1);
    }

    Err("no data chunk".to_string())
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave_bytes(format_tag: u16, channels: u16, bits: u16, extra_chunk: bool, data: &[u8]) -> Vec<u8> {
        let block_align = channels * bits.div_ceil(8);
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(b"WAVE");
        if extra_chunk {
            out.extend_from_slice(b"LIST");
            out.extend_from_slice(&3u32.to_le_bytes());
            out.extend_from_slice(&[1, 2, 3, 0]);
        }
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&format_tag.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&48000u32.to_le_bytes());
        out.extend_from_slice(&(48000 * block_align as u32).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_canonical_layout() {
        let bytes = wave_bytes(WAVE_FORMAT_IEEE_FLOAT, 4, 32, false, &[0u8; 32]);
        let layout = parse_layout(&bytes).unwrap();

        assert_eq!(layout.channels, 4);
        assert_eq!(layout.sample_rate, 48000);
        assert_eq!(layout.data_offset, 44);
        assert_eq!(layout.data_len, 32);
        assert_eq!(layout.encoding().unwrap(), SampleEncoding::Float32);
    }

    #[test]
    fn test_skips_padded_chunks() {
        let bytes = wave_bytes(WAVE_FORMAT_PCM, 2, 16, true, &[0u8; 8]);
        let layout = parse_layout(&bytes).unwrap();

        // 12 + LIST(8 + 3 + pad) + fmt(8 + 16) + data header
        assert_eq!(layout.data_offset, 12 + 12 + 24 + 8);
        assert_eq!(layout.encoding().unwrap(), SampleEncoding::Pcm { bits: 16 });
    }

    #[test]
    fn test_data_len_clamped_to_file() {
        let mut bytes = wave_bytes(WAVE_FORMAT_IEEE_FLOAT, 1, 32, false, &[0u8; 16]);
        bytes.truncate(bytes.len() - 4);
        let layout = parse_layout(&bytes).unwrap();
        assert_eq!(layout.data_len, 12);
    }

    #[test]
    fn test_missing_signature() {
        let mut bytes = wave_bytes(WAVE_FORMAT_IEEE_FLOAT, 1, 32, false, &[0u8; 4]);
        bytes[0..4].copy_from_slice(b"XXXX");
        assert!(parse_layout(&bytes).is_err());
    }

    fn float_spec(channels: u16) -> WavSpec {
        WavSpec {
            channels,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        }
    }

    #[test]
    fn test_check_against_matching_spec() {
        let bytes = wave_bytes(WAVE_FORMAT_IEEE_FLOAT, 4, 32, false, &[0u8; 32]);
        let layout = parse_layout(&bytes).unwrap();
        assert!(layout.check_against(&float_spec(4)).is_ok());
    }

    #[test]
    fn test_check_against_detects_disagreement() {
        let bytes = wave_bytes(WAVE_FORMAT_IEEE_FLOAT, 4, 32, false, &[0u8; 32]);
        let layout = parse_layout(&bytes).unwrap();

        let reason = layout.check_against(&float_spec(2)).unwrap_err();
        assert!(reason.contains("4ch"), "reason: {}", reason);

        let int_spec = WavSpec {
            sample_format: SampleFormat::Int,
            ..float_spec(4)
        };
        assert!(layout.check_against(&int_spec).is_err());
    }

    #[test]
    fn test_unsupported_float_depth() {
        let bytes = wave_bytes(WAVE_FORMAT_IEEE_FLOAT, 1, 64, false, &[0u8; 8]);
        let layout = parse_layout(&bytes).unwrap();
        assert!(matches!(
            layout.encoding(),
            Err(ConvertError::UnsupportedSampleFormat { .. })
        ));
    }
}
