//! `rescomp.toml` project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rescomp_analysis::CheckOptions;
use rescomp_syntax::FormatConfig;
use serde::Deserialize;

/// File name searched for when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "rescomp.toml";

/// Project configuration; every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Formatter settings.
    pub format: FormatSection,
    /// Checker settings.
    pub check: CheckSection,
}

/// `[format]` table.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FormatSection {
    /// Align resource paths into one column.
    pub align: bool,
    /// Rewrite compression spellings to their canonical keyword.
    pub normalize_compression: bool,
}

/// `[check]` table.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CheckSection {
    /// Image extensions accepted for bitmaps, with or without the dot.
    pub image_extensions: Vec<String>,
    /// Warn about numeric compression codes.
    pub warn_numeric_compression: bool,
    /// Report resource paths missing on disk.
    pub resolve_files: bool,
}

impl Default for CheckSection {
    fn default() -> Self {
        let options = CheckOptions::default();
        Self {
            image_extensions: options.image_extensions,
            warn_numeric_compression: options.warn_numeric_compression,
            resolve_files: false,
        }
    }
}

impl Config {
    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Find the nearest `rescomp.toml` in `start` or its ancestors.
    #[must_use]
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load the explicit config, else the discovered one, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir().ok().and_then(|cwd| Self::discover(&cwd)),
        };
        match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "using config");
                Self::load(&path)
            }
            None => {
                tracing::debug!("no config found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Formatter settings.
    #[must_use]
    pub fn format_config(&self) -> FormatConfig {
        FormatConfig {
            align: self.format.align,
            normalize_compression: self.format.normalize_compression,
            ..FormatConfig::default()
        }
    }

    /// Diagnostic settings.
    #[must_use]
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            image_extensions: self
                .check
                .image_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            warn_numeric_compression: self.check.warn_numeric_compression,
        }
    }
}
