//! IR Container Module
//!
//! Byte-level handling of the raw IR containers:
//! - Header repair of the obfuscated RIFF/WAVE tags
//! - RIFF chunk layout lookup for in-place sample rewrites

pub mod layout;
pub mod repair;

pub use layout::{read_layout, WavLayout};
pub use repair::{repair_file, repair_header, HEADER_LEN};
