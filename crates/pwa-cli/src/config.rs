use anyhow::Result;
use pwa_bundle::BundleConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The main configuration file structure (pwa.toml)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PwaConfig {
    /// Directory and artifact names
    pub bundle: BundleConfig,

    /// Where the shop and its extensions live
    pub host: HostConfig,
}

/// Shop installation settings
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HostConfig {
    /// Project root of the shop
    pub project_dir: Option<PathBuf>,

    /// Extension manifest, relative to the project root
    pub manifest: Option<PathBuf>,

    /// Public storage root
    pub public_dir: Option<PathBuf>,

    /// Work directory for the temporary archive
    pub cache_dir: Option<PathBuf>,

    /// Scan custom/apps and custom/plugins instead of reading a manifest
    pub scan: Option<bool>,
}

impl PwaConfig {
    /// Load configuration from pwa.toml, searching upward from the given directory
    pub fn load(start_dir: &Path) -> Result<Option<Self>> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join("pwa.toml");

            if config_path.exists() {
                log::debug!("Using {}", config_path.display());
                let content = std::fs::read_to_string(&config_path)?;
                let config: PwaConfig = toml::from_str(&content)?;
                return Ok(Some(config));
            }

            if !current.pop() {
                return Ok(None);
            }
        }
    }

    /// Load configuration by searching upward from the current working directory
    pub fn load_from_cwd() -> Result<Option<Self>> {
        let cwd = std::env::current_dir()?;
        Self::load(&cwd)
    }
}
