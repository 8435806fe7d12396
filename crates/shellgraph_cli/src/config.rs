// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line configuration.
//!
//! Settings live in a RON file next to the graphs being compiled:
//! - Script indentation and an optional shebang line
//! - Layout spacing

use serde::{Deserialize, Serialize};
use shellgraph_core::emit::DEFAULT_INDENT_WIDTH;
use shellgraph_core::layout::{DEFAULT_X_SPACING, DEFAULT_Y_SPACING};
use std::path::Path;
use thiserror::Error;

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "shellgraph.ron";

/// Config errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON for this shape
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be encoded
    #[error("Could not encode config: {0}")]
    Encode(#[from] ron::Error),

    /// Written by a newer release
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },
}

/// Layout spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Distance between columns
    pub x_spacing: i64,
    /// Distance between rows
    pub y_spacing: i64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            x_spacing: DEFAULT_X_SPACING,
            y_spacing: DEFAULT_Y_SPACING,
        }
    }
}

/// Settings for the `shellgraph` binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellgraphConfig {
    /// Format version
    pub version: u32,
    /// Spaces per nesting level in generated scripts
    pub indent_width: usize,
    /// Line written before the script, e.g. `#!/bin/sh`
    pub shebang: Option<String>,
    /// Layout spacing
    pub layout: LayoutConfig,
}

impl Default for ShellgraphConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            indent_width: DEFAULT_INDENT_WIDTH,
            shebang: None,
            layout: LayoutConfig::default(),
        }
    }
}

impl ShellgraphConfig {
    /// Load settings from `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load settings from `path`, falling back to defaults if the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: ShellgraphConfig = ron::from_str(content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        Ok(config)
    }

    /// Encode settings as pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}
