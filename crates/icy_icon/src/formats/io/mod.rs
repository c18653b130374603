//! I/O implementations for the icon container layouts.
//!
//! This module contains the actual serialization logic for the supported
//! containers. The implementations are accessed through
//! `IconFormat::to_bytes()` and `IconFormat::from_bytes()`.

mod icns;
mod ico;
mod png_codec;

// Re-export load/save functions for use by IconFormat
pub(crate) use icns::{load_icns, save_icns};
pub(crate) use ico::{load_ico, save_ico};
