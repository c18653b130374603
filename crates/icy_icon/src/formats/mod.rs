//! Icon container format registry.
//!
//! This module provides a central registry for the supported icon container
//! layouts, enabling consistent file type detection and save/load operations.
//! The actual serialization lives in [`io`].

pub(crate) mod io;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{IconError, IconLayer, Result};

/// Save settings for one export pass.
///
/// Mirrors the designer's compression settings pair: compression is a global
/// switch plus a threshold, applied per layer when the layer set is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// When set, layers at or above the threshold are stored as PNG payloads
    /// instead of raw bitmap scanlines.
    pub compress: bool,

    /// Smallest scale that gets a PNG payload when `compress` is set.
    pub compress_threshold: u32,
}

impl SaveOptions {
    pub const fn new() -> Self {
        SaveOptions {
            compress: true,
            compress_threshold: 256,
        }
    }

    /// Per-layer compression decision for a given scale.
    pub fn is_compressed(&self, scale: u32) -> bool {
        self.compress && scale >= self.compress_threshold
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Represents the supported icon container layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconFormat {
    /// Windows icon container (.ico): little-endian directory table followed
    /// by per-image payload blocks.
    Ico,
    /// macOS icon container (.icns): big-endian tagged PNG elements wrapped
    /// in one outer record.
    Icns,
}

impl IconFormat {
    /// All known container formats
    pub const ALL: &'static [IconFormat] = &[IconFormat::Ico, IconFormat::Icns];

    /// Detect the container format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<IconFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "ico" => Some(IconFormat::Ico),
            "icns" => Some(IconFormat::Icns),
            _ => None,
        }
    }

    /// Detect the container format from a file path by its extension.
    pub fn from_path(path: &Path) -> Option<IconFormat> {
        path.extension().and_then(|ext| ext.to_str()).and_then(IconFormat::from_extension)
    }

    /// Get the primary file extension for this format (used for saving).
    pub fn primary_extension(&self) -> &'static str {
        match self {
            IconFormat::Ico => "ico",
            IconFormat::Icns => "icns",
        }
    }

    /// Get all file extensions recognized for this format.
    pub fn all_extensions(&self) -> &'static [&'static str] {
        match self {
            IconFormat::Ico => &["ico"],
            IconFormat::Icns => &["icns"],
        }
    }

    /// Get a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            IconFormat::Ico => "Windows Icon",
            IconFormat::Icns => "macOS Icon",
        }
    }

    /// Serialize the layer set into one container image held in memory.
    ///
    /// Layers are emitted in input order; callers sort ascending by scale by
    /// convention. The directory table is assembled after all payloads, so
    /// every offset is final before a single byte reaches the disk.
    ///
    /// # Errors
    /// Returns an error when a layer violates the format's constraints or the
    /// payload encoder fails; no partial output is produced in that case.
    pub fn to_bytes(&self, layers: &[IconLayer]) -> Result<Vec<u8>> {
        match self {
            IconFormat::Ico => io::save_ico(layers),
            IconFormat::Icns => io::save_icns(layers),
        }
    }

    /// Write the container to `path`, truncating any previous file there.
    ///
    /// # Errors
    /// Returns `DestinationUnwritable` when the path cannot be created or
    /// written, or any serialization error from [`IconFormat::to_bytes`].
    pub fn save(&self, layers: &[IconLayer], path: &Path) -> Result<()> {
        let bytes = self.to_bytes(layers)?;
        std::fs::write(path, &bytes).map_err(|err| IconError::destination_unwritable(path, err))?;
        log::info!("wrote {} layer(s), {} bytes to {}", layers.len(), bytes.len(), path.display());
        Ok(())
    }

    /// Parse a container image back into its layers.
    ///
    /// # Errors
    /// Returns an error when the data is truncated, carries a wrong magic
    /// number or contains a payload this engine cannot decode.
    pub fn from_bytes(&self, data: &[u8]) -> Result<Vec<IconLayer>> {
        match self {
            IconFormat::Ico => io::load_ico(data),
            IconFormat::Icns => io::load_icns(data),
        }
    }

    /// Read a container file and parse it into its layers.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed.
    pub fn load(&self, path: &Path) -> Result<Vec<IconLayer>> {
        let data = std::fs::read(path)?;
        self.from_bytes(&data)
    }
}

impl std::fmt::Display for IconFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
