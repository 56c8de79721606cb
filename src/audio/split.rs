//! True-stereo splitting
//!
//! A true-stereo IR stores four signal paths interleaved as four channels.
//! Splitting writes channels {0, 1} (left receiver) and {2, 3} (right
//! receiver) to two independent stereo files.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use crate::audio::io::{read_wav, write_wav};
use crate::error::{ConvertError, Result};

/// Channel count of a true-stereo source
pub const TRUE_STEREO_CHANNELS: u16 = 4;

const LEFT_MARKER: &str = " L";
const RIGHT_MARKER: &str = " R";

/// Destination paths of a split
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitPair {
    pub left: PathBuf,
    pub right: PathBuf,
}

impl SplitPair {
    /// Paths next to `source` named `<base> L.<ext>` and `<base> R.<ext>`
    pub fn beside(source: &Path, base: &str, extension: &str) -> Self {
        let name = |marker: &str| format!("{}{}.{}", base, marker, extension);
        Self {
            left: source.with_file_name(name(LEFT_MARKER)),
            right: source.with_file_name(name(RIGHT_MARKER)),
        }
    }
}

/// Split the four-channel file at `source` into the two files of `pair`.
///
/// Sample rate and sample format are copied from the source. The source file
/// is left in place.
///
/// # Errors
/// * `ChannelCountMismatch` - If the source does not have exactly 4 channels
pub fn split_true_stereo(source: &Path, pair: &SplitPair) -> Result<()> {
    let audio = read_wav(source)?;

    if audio.channels() != TRUE_STEREO_CHANNELS {
        return Err(ConvertError::ChannelCountMismatch {
            path: source.to_path_buf(),
            expected: TRUE_STEREO_CHANNELS,
            found: audio.channels(),
        });
    }

    debug!(
        "Splitting {} ({} frames) into {} / {}",
        source.display(),
        audio.frames(),
        pair.left.display(),
        pair.right.display()
    );

    write_wav(&pair.left, &audio.select_channels(0..2))?;
    write_wav(&pair.right, &audio.select_channels(2..4))?;

    Ok(())
}
