//! Preset Module
//!
//! Everything between a preset document on disk and the converted files:
//! - Document parsing into presets and variations
//! - IR file resolution
//! - The walker that runs a conversion

pub mod document;
pub mod resolver;
pub mod walker;

pub use document::{sanitize_name, Preset, PresetDocument, Variation};
pub use resolver::{IrResolver, ResolvePolicy, WalkDirResolver};
pub use walker::{ErrorPolicy, PresetWalker, WalkerConfig};
