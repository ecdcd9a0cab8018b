// ABOUTME: Configuration file loading, validation, and hierarchical merging for kitty-img
// ABOUTME: Supports TOML config files with XDG Base Directory specification compliance

use anyhow::{Context, Result};
use kitty_graphics::TransferOptions;
use kitty_graphics::constants::chunking::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default, deserialize_with = "validate_chunk_size")]
    pub chunk_size: Option<usize>,
    /// Default placement keys (`image_id`, `columns`, `rows`, `z_index`, ...)
    #[serde(flatten)]
    pub placement: TransferOptions,
    #[serde(default)]
    pub loop_count: Option<u32>,
    #[serde(default)]
    pub force: Option<bool>,
}

impl Config {
    /// Load configuration from standard XDG-compliant locations
    pub fn load() -> Result<Self> {
        let paths = Self::get_config_paths();
        Self::load_from_paths(&paths)
    }

    /// Load configuration from specific file paths; later paths override earlier ones
    pub fn load_from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut config = Config::default();

        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            let file_config = Self::load_from_file(path)?;
            log::debug!("loaded config from {}", path.display());
            config = config.merge(file_config);
        }

        Ok(config)
    }

    /// Load configuration from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })?;

        Ok(config)
    }

    /// Get standard config file paths in order of precedence (lowest first)
    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. User config directory fallback
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(
                home_dir
                    .join(".config")
                    .join("kitty-img")
                    .join("config.toml"),
            );
        }

        // 2. XDG config home
        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            paths.push(
                PathBuf::from(config_home)
                    .join("kitty-img")
                    .join("config.toml"),
            );
        }

        // 3. Project-specific config (highest precedence)
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join("kitty-img.toml"));
        }

        paths
    }

    /// Merge this config with another, giving precedence to the other config
    pub fn merge(self, other: Config) -> Config {
        Config {
            chunk_size: other.chunk_size.or(self.chunk_size),
            placement: self.placement.overlay(&other.placement),
            loop_count: other.loop_count.or(self.loop_count),
            force: other.force.or(self.force),
        }
    }

    pub fn chunk_size_or_default(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }
}

// Chunks must stay base64-aligned so that every envelope decodes on its own.
fn validate_chunk_size<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<usize> = Option::deserialize(deserializer)?;

    match value {
        Some(0) => Err(D::Error::custom("Invalid chunk_size 0. Must be greater than zero")),
        Some(size) if size % 4 != 0 => Err(D::Error::custom(format!(
            "Invalid chunk_size {}. Must be a multiple of 4",
            size
        ))),
        other => Ok(other),
    }
}
