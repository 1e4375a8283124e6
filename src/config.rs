// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Export configuration.
//!
//! An [`ExportConfig`] can be loaded from TOML or assembled with
//! [`ExportConfigBuilder`]. The defaults write every recognized stream beside
//! its input file with text cells unquoted.
//!
//! ```toml
//! output_dir = "csv"
//! quote_text = true
//! families = ["IMU", "Baro"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::sensor::FamilyTag;
use crate::{ExportError, Result};

/// Options for one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory for output files (None = beside each input)
    pub output_dir: Option<PathBuf>,
    /// Quote text cells that contain delimiters
    pub quote_text: bool,
    /// Families to export (None = all)
    pub families: Option<Vec<FamilyTag>>,
}

impl ExportConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }

    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ExportError::config(e.to_string()))
    }

    /// Load a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ExportError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Whether streams of `tag` are exported.
    pub fn allows(&self, tag: FamilyTag) -> bool {
        self.families
            .as_ref()
            .map_or(true, |families| families.contains(&tag))
    }
}

/// Fluent builder for [`ExportConfig`].
///
/// # Example
///
/// ```
/// use sensorcsv::config::ExportConfig;
/// use sensorcsv::sensor::FamilyTag;
///
/// let config = ExportConfig::builder()
///     .output_dir("out")
///     .quote_text(true)
///     .families([FamilyTag::Wifi, FamilyTag::Ble])
///     .build();
/// assert!(config.allows(FamilyTag::Ble));
/// assert!(!config.allows(FamilyTag::Imu));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    /// Write outputs into `dir` instead of beside the input.
    pub fn output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Enable or disable quoting of text cells.
    pub fn quote_text(mut self, quote: bool) -> Self {
        self.config.quote_text = quote;
        self
    }

    /// Export only the listed families.
    pub fn families<I: IntoIterator<Item = FamilyTag>>(mut self, families: I) -> Self {
        self.config.families = Some(families.into_iter().collect());
        self
    }

    /// Finish the configuration.
    pub fn build(self) -> ExportConfig {
        self.config
    }
}
