//! Bundler configuration.
//!
//! The directory names the bundler relies on are plain configuration
//! values with built-in defaults. They can be overridden from a config
//! file (see the CLI's `pwa.toml`) or from `PWA_BUNDLE_*` environment
//! variables.
//!
//! # Example
//!
//! ```rust
//! use pwa_bundle::config::{BundleConfig, ConfigLoader};
//!
//! let mut config = BundleConfig::default();
//! ConfigLoader::new(false).apply_env(&mut config);
//!
//! assert_eq!(config.resources_directory, "src/Resources/app/pwa");
//! assert_eq!(config.public_directory, "pwa");
//! ```

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{BundleError, Result};

/// Directory and artifact names used by the bundler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Asset directory inside each extension, relative to its root
    #[serde(rename = "resources-directory", default = "default_resources_directory")]
    pub resources_directory: String,

    /// Base name of the temporary archive in the work directory
    #[serde(rename = "asset-artifact-directory", default = "default_asset_artifact_directory")]
    pub asset_artifact_directory: String,

    /// Directory in public storage the artifact is published to
    #[serde(rename = "public-directory", default = "default_public_directory")]
    pub public_directory: String,

    /// Artifact base name used when no checksum is supplied
    #[serde(rename = "default-artifact-name", default = "default_artifact_name")]
    pub default_artifact_name: String,
}

fn default_resources_directory() -> String {
    "src/Resources/app/pwa".to_string()
}

fn default_asset_artifact_directory() -> String {
    "pwa-bundles-assets".to_string()
}

fn default_public_directory() -> String {
    "pwa".to_string()
}

fn default_artifact_name() -> String {
    "pwa_assets".to_string()
}

impl Default for BundleConfig {
    fn default() -> Self {
        BundleConfig {
            resources_directory: default_resources_directory(),
            asset_artifact_directory: default_asset_artifact_directory(),
            public_directory: default_public_directory(),
            default_artifact_name: default_artifact_name(),
        }
    }
}

impl BundleConfig {
    /// File name of the temporary archive (`pwa-bundles-assets.zip`)
    pub fn archive_file_name(&self) -> String {
        format!("{}.zip", self.asset_artifact_directory)
    }

    /// Reject values that would escape their base directories.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("resources-directory", &self.resources_directory),
            ("asset-artifact-directory", &self.asset_artifact_directory),
            ("public-directory", &self.public_directory),
            ("default-artifact-name", &self.default_artifact_name),
        ];

        for (key, value) in values {
            if value.trim().is_empty() {
                return Err(BundleError::Config(format!("{} must not be empty", key)));
            }
            if value.split(['/', '\\']).any(|part| part == "..") {
                return Err(BundleError::Config(format!(
                    "{} must not contain '..': {}",
                    key, value
                )));
            }
        }

        for (key, value) in [
            ("asset-artifact-directory", &self.asset_artifact_directory),
            ("default-artifact-name", &self.default_artifact_name),
        ] {
            if value.contains(['/', '\\']) {
                return Err(BundleError::Config(format!(
                    "{} must be a plain file name: {}",
                    key, value
                )));
            }
        }

        Ok(())
    }
}

/// Reads `PWA_BUNDLE_*` environment overrides
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Get a non-empty environment variable
    pub fn get_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.is_empty())
    }

    /// Get the environment override for a config key (e.g. `public-directory`)
    pub fn get_env_config(&self, key: &str) -> Option<String> {
        let env_var = format!("PWA_BUNDLE_{}", key.replace('-', "_").to_uppercase());
        self.get_env(&env_var)
    }

    /// Apply environment overrides on top of `config`
    pub fn apply_env(&self, config: &mut BundleConfig) {
        if let Some(value) = self.get_env_config("resources-directory") {
            config.resources_directory = value;
        }
        if let Some(value) = self.get_env_config("asset-artifact-directory") {
            config.asset_artifact_directory = value;
        }
        if let Some(value) = self.get_env_config("public-directory") {
            config.public_directory = value;
        }
        if let Some(value) = self.get_env_config("default-artifact-name") {
            config.default_artifact_name = value;
        }
    }
}
