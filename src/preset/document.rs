//! Preset document parsing
//!
//! A preset document (`.xps`) lists `Preset` elements under its root. Each
//! `PluginSpecific` element with `DataType="NoData"` below a preset is one
//! IR variation, described by `Descriptor` elements keyed by `Name`.

use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::Node;

use crate::error::{ConvertError, Result};

const PRESET_TAG: &str = "Preset";
const VARIATION_TAG: &str = "PluginSpecific";
const DESCRIPTOR_TAG: &str = "Descriptor";

const IR_FILE_DESCRIPTOR: &str = "IRFileNameFull";
const IN_CHANNELS_DESCRIPTOR: &str = "NumInChannels";
const OUT_CHANNELS_DESCRIPTOR: &str = "NumOutChannels";
const NORM_DESCRIPTOR: &str = "Norm";

/// Characters that cannot appear in file names on common platforms
const ILLEGAL_NAME_CHARS: [char; 2] = ['<', '>'];

/// A parsed preset document
#[derive(Debug, Clone)]
pub struct PresetDocument {
    /// Path the document was loaded from
    pub path: PathBuf,
    pub presets: Vec<Preset>,
}

/// A named preset and its IR variations, in document order
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub variations: Vec<Variation>,
}

/// One IR of a preset with its channel routing metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    pub input_channels: u32,
    pub output_channels: u32,
    /// Final path component of `IRFileNameFull`; empty when absent
    pub ir_reference_name: String,
    /// Raw `Norm` descriptor text, parsed only when preset normalization is used
    norm: Option<String>,
}

impl PresetDocument {
    /// Load and parse the preset document at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| ConvertError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let text = decode_text(&bytes).map_err(|reason| ConvertError::PresetEncoding {
            path: path.to_path_buf(),
            reason,
        })?;
        let presets = parse_presets(&text).map_err(|e| match e {
            ParseFailure::Xml(source) => ConvertError::PresetParse {
                path: path.to_path_buf(),
                source,
            },
            ParseFailure::Content(err) => err,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            presets,
        })
    }

    /// Directory searched for the IR files referenced by this document
    pub fn root_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Total number of variations across all presets
    pub fn variation_count(&self) -> usize {
        self.presets.iter().map(|p| p.variations.len()).sum()
    }
}

impl Preset {
    /// Preset name usable as a file name fragment
    pub fn sanitized_name(&self) -> String {
        sanitize_name(&self.name)
    }
}

impl Variation {
    pub fn new(input_channels: u32, output_channels: u32, ir_reference_name: impl Into<String>) -> Self {
        Self {
            input_channels,
            output_channels,
            ir_reference_name: ir_reference_name.into(),
            norm: None,
        }
    }

    /// Attach a raw `Norm` descriptor value
    pub fn with_norm(mut self, norm: impl Into<String>) -> Self {
        self.norm = Some(norm.into());
        self
    }

    /// Read the stored normalization factor.
    ///
    /// # Errors
    /// * `NormFactorMissing` - If the variation has no `Norm` descriptor
    /// * `InvalidNormText` - If the descriptor is not a number
    pub fn norm_factor(&self, preset: &str) -> Result<f64> {
        let text = self.norm.as_deref().ok_or_else(|| ConvertError::NormFactorMissing {
            preset: preset.to_string(),
        })?;
        text.parse::<f64>().map_err(|_| ConvertError::InvalidNormText {
            preset: preset.to_string(),
            value: text.to_string(),
        })
    }
}

/// Strip characters that are illegal in file names
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| !ILLEGAL_NAME_CHARS.contains(c)).collect()
}

/// Final component of a stored IR path, accepting `/` and `\` separators
pub fn reference_file_name(stored: &str) -> &str {
    stored.rsplit(['/', '\\']).next().unwrap_or_default()
}

// ============================================================================
// Internal helper functions
// ============================================================================

enum ParseFailure {
    Xml(roxmltree::Error),
    Content(ConvertError),
}

impl From<ConvertError> for ParseFailure {
    fn from(err: ConvertError) -> Self {
        ParseFailure::Content(err)
    }
}

/// Decode document bytes: UTF-8 (with or without BOM) or BOM-marked UTF-16
fn decode_text(bytes: &[u8]) -> std::result::Result<String, String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => utf8_text(rest),
        [0xFF, 0xFE, rest @ ..] => utf16_text(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => utf16_text(rest, u16::from_be_bytes),
        _ => utf8_text(bytes),
    }
}

fn utf8_text(bytes: &[u8]) -> std::result::Result<String, String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| format!("not UTF-8 (invalid byte at offset {})", e.valid_up_to()))
}

fn utf16_text(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> std::result::Result<String, String> {
    if bytes.len() % 2 != 0 {
        return Err("UTF-16 text has an odd byte length".to_string());
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| format!("invalid UTF-16 ({})", e))
}

fn parse_presets(text: &str) -> std::result::Result<Vec<Preset>, ParseFailure> {
    // Plugin exports may start with a DOCTYPE
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options).map_err(ParseFailure::Xml)?;

    let mut presets = Vec::new();
    for node in doc.root_element().children().filter(|n| n.has_tag_name(PRESET_TAG)) {
        presets.push(parse_preset(node)?);
    }
    Ok(presets)
}

fn parse_preset(node: Node<'_, '_>) -> Result<Preset> {
    let name = node
        .attribute("Name")
        .ok_or(ConvertError::MissingAttribute { attribute: "Name" })?
        .to_string();

    let variations = node
        .descendants()
        .filter(|n| n.has_tag_name(VARIATION_TAG) && n.attribute("DataType") == Some("NoData"))
        .map(|v| parse_variation(v, &name))
        .collect::<Result<Vec<_>>>()?;

    Ok(Preset { name, variations })
}

fn parse_variation(node: Node<'_, '_>, preset: &str) -> Result<Variation> {
    let ir_reference_name = descriptor(node, IR_FILE_DESCRIPTOR)
        .map(|path| reference_file_name(path).to_string())
        .unwrap_or_default();

    Ok(Variation {
        input_channels: channel_count(node, preset, IN_CHANNELS_DESCRIPTOR)?,
        output_channels: channel_count(node, preset, OUT_CHANNELS_DESCRIPTOR)?,
        ir_reference_name,
        norm: descriptor(node, NORM_DESCRIPTOR).map(str::to_string),
    })
}

fn channel_count(node: Node<'_, '_>, preset: &str, name: &'static str) -> Result<u32> {
    let text = descriptor(node, name).ok_or_else(|| ConvertError::MissingDescriptor {
        preset: preset.to_string(),
        descriptor: name,
    })?;
    text.parse::<u32>().map_err(|_| ConvertError::InvalidDescriptor {
        preset: preset.to_string(),
        descriptor: name,
        value: text.to_string(),
    })
}

/// Trimmed text of the first `Descriptor` named `name` below `node`
fn descriptor<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.descendants()
        .find(|n| n.has_tag_name(DESCRIPTOR_TAG) && n.attribute("Name") == Some(name))
        .and_then(|n| n.text())
        .map(str::trim)
}
