use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::archive::Compression;
use crate::download::{DownloadOptions, DEFAULT_ARCHIVE_NAME};
use crate::error::{FencepackError, Result};

/// User configuration, read from `~/.fencepack/config.toml`.
///
/// Every field is optional in the file. Environment variables override the
/// file, and CLI flags override both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FencepackConfig {
    /// Default file name for the generated archive
    pub archive_name: String,
    /// Directory the archive is written to (current directory when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    pub compression: Compression,
}

impl Default for FencepackConfig {
    fn default() -> Self {
        Self {
            archive_name: DEFAULT_ARCHIVE_NAME.to_owned(),
            output_dir: None,
            compression: Compression::Deflate,
        }
    }
}

impl FencepackConfig {
    /// Load config from disk, falling back to defaults when the file is absent,
    /// then apply `FENCEPACK_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let config_path = Self::config_path();
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content =
            fs::read_to_string(&config_path).map_err(|err| FencepackError::io(&config_path, err))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|err| FencepackError::config(format!("invalid TOML: {err}")))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| FencepackError::config(err.to_string()))
    }

    /// Get config file path: `$FENCEPACK_CONFIG` or `~/.fencepack/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var("FENCEPACK_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fencepack/config.toml")
    }

    /// Apply overrides from a key lookup (the environment, in practice).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("FENCEPACK_ARCHIVE_NAME").filter(|v| !v.trim().is_empty()) {
            self.archive_name = name;
        }
        if let Some(dir) = lookup("FENCEPACK_OUTPUT_DIR").filter(|v| !v.trim().is_empty()) {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(compression) = lookup("FENCEPACK_COMPRESSION") {
            self.compression = compression.parse()?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        let name = self.archive_name.trim();
        if name.is_empty() {
            return Err(FencepackError::config("archive_name must not be empty"));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(FencepackError::config(format!(
                "archive_name '{name}' must be a file name, not a path"
            )));
        }
        Ok(())
    }

    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            archive_name: self.archive_name.clone(),
            compression: self.compression,
        }
    }
}
