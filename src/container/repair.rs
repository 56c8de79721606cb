//! Container header repair
//!
//! The raw IR files are ordinary WAVE files whose outer chunk tags and
//! bits-per-sample field were overwritten. Repair restores exactly those
//! five fields and passes every other byte through untouched.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{ConvertError, Result};

/// Size of the canonical RIFF/WAVE header region
pub const HEADER_LEN: usize = 44;

const RIFF_TAG: &[u8; 4] = b"RIFF";
const WAVE_TAG: &[u8; 4] = b"WAVE";

const RIFF_TAG_OFFSET: usize = 0;
const WAVE_TAG_OFFSET: usize = 8;

/// Low byte of `wBitsPerSample` in the `fmt ` chunk
const BIT_DEPTH_OFFSET: usize = 34;

/// Stored bit depth is never trusted; the payload is always 32-bit float
const REPAIRED_BIT_DEPTH: u8 = 32;

/// Restore the header fields of a raw IR container in place.
///
/// # Errors
/// * `MalformedContainer` - If the buffer is shorter than [`HEADER_LEN`]
pub fn repair_header(bytes: &mut [u8]) -> Result<()> {
    if bytes.len() < HEADER_LEN {
        return Err(ConvertError::MalformedContainer {
            len: bytes.len(),
            required: HEADER_LEN,
        });
    }

    bytes[RIFF_TAG_OFFSET..RIFF_TAG_OFFSET + 4].copy_from_slice(RIFF_TAG);
    bytes[WAVE_TAG_OFFSET..WAVE_TAG_OFFSET + 4].copy_from_slice(WAVE_TAG);
    bytes[BIT_DEPTH_OFFSET] = REPAIRED_BIT_DEPTH;

    Ok(())
}

/// Read `source`, repair its header, and write the result to `output`.
///
/// The source file is never modified. `output` is created or truncated.
pub fn repair_file(source: &Path, output: &Path) -> Result<()> {
    let mut bytes = fs::read(source).map_err(|e| ConvertError::FileRead {
        path: source.to_path_buf(),
        source: e,
    })?;

    debug!(
        "Repairing {} ({} bytes, stored bit depth {})",
        source.display(),
        bytes.len(),
        bytes.get(BIT_DEPTH_OFFSET).copied().unwrap_or_default()
    );

    repair_header(&mut bytes)?;

    fs::write(output, &bytes).map_err(|e| ConvertError::FileWrite {
        path: output.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PATCHED_OFFSETS: [usize; 9] = [0, 1, 2, 3, 8, 9, 10, 11, 34];

    fn scrambled(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn test_repair_sets_tags_and_bit_depth() {
        let mut bytes = scrambled(HEADER_LEN);
        bytes[BIT_DEPTH_OFFSET] = 23;

        repair_header(&mut bytes).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes[34], 32);
    }

    #[test]
    fn test_repair_touches_only_header_fields() {
        let original = scrambled(4096);
        let mut repaired = original.clone();

        repair_header(&mut repaired).unwrap();

        assert_eq!(repaired.len(), original.len());
        for (i, (a, b)) in original.iter().zip(repaired.iter()).enumerate() {
            if !PATCHED_OFFSETS.contains(&i) {
                assert_eq!(a, b, "byte {} changed", i);
            }
        }
    }

    #[test]
    fn test_repair_is_idempotent() {
        let mut once = scrambled(128);
        repair_header(&mut once).unwrap();
        let mut twice = once.clone();
        repair_header(&mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_short_container_rejected() {
        let mut bytes = scrambled(HEADER_LEN - 1);
        match repair_header(&mut bytes).unwrap_err() {
            ConvertError::MalformedContainer { len, required } => {
                assert_eq!(len, 43);
                assert_eq!(required, 44);
            }
            other => panic!("Expected MalformedContainer, got: {:?}", other),
        }
    }

    #[test]
    fn test_repair_file_leaves_source_untouched() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("raw.wir");
        let output = dir.path().join("out.wav");

        let original = scrambled(256);
        fs::write(&source, &original).unwrap();

        repair_file(&source, &output).unwrap();

        assert_eq!(fs::read(&source).unwrap(), original);
        let repaired = fs::read(&output).unwrap();
        assert_eq!(repaired.len(), original.len());
        assert_eq!(&repaired[0..4], b"RIFF");
        assert_eq!(&repaired[HEADER_LEN..], &original[HEADER_LEN..]);
    }

    #[test]
    fn test_repair_file_missing_source() {
        let dir = tempdir().unwrap();
        let result = repair_file(&dir.path().join("missing.wir"), &dir.path().join("out.wav"));
        assert!(matches!(result, Err(ConvertError::FileRead { .. })));
    }
}
