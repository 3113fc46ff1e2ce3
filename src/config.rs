//! Configuration file for classloc.
//!
//! The config only tunes traversal; the `.php` extension filter and the
//! declaration rules are fixed.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::locator::{IoErrorPolicy, LocatorOptions};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["classloc.yaml", ".classloc.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Glob patterns for paths to skip (e.g., "vendor", "**/cache/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Follow symbolic links while walking (default: false)
    #[serde(default)]
    pub follow_links: Option<bool>,
    /// Skip dot-files and dot-directories (default: false)
    #[serde(default)]
    pub skip_hidden: Option<bool>,
    /// "abort" (default) or "skip"
    #[serde(default)]
    pub on_io_error: Option<IoErrorPolicy>,
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Look for a default config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    pub fn should_follow_links(&self) -> bool {
        self.follow_links.unwrap_or(false)
    }

    pub fn should_skip_hidden(&self) -> bool {
        self.skip_hidden.unwrap_or(false)
    }

    pub fn io_error_policy(&self) -> IoErrorPolicy {
        self.on_io_error.unwrap_or_default()
    }

    /// Build locator options from this config.
    pub fn locator_options(&self) -> anyhow::Result<LocatorOptions> {
        let options = LocatorOptions::new()
            .follow_links(self.should_follow_links())
            .skip_hidden(self.should_skip_hidden())
            .on_io_error(self.io_error_policy())
            .exclude(self.excluded_paths.as_slice())
            .context("compiling excluded_paths")?;
        Ok(options)
    }
}

/// Validate a config before use.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }
    Ok(())
}
