//! Extension host backed by a JSON manifest exported from the shop.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::{ExtensionHost, ExtensionKind, InstalledExtension};
use crate::error::{BundleError, Result};

/// Manifest location relative to the project root
pub const DEFAULT_MANIFEST_PATH: &str = "var/extensions.json";

/// Root of `extensions.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestJson {
    #[serde(default)]
    pub apps: Vec<ManifestEntry>,

    #[serde(default)]
    pub plugins: Vec<ManifestEntry>,
}

/// One extension in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub path: String,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ManifestJson {
    pub fn entries(&self, kind: ExtensionKind) -> &[ManifestEntry] {
        match kind {
            ExtensionKind::App => &self.apps,
            ExtensionKind::Plugin => &self.plugins,
        }
    }
}

/// Reads extension state from a manifest file.
///
/// The manifest is re-read on every query so each bundling run sees the
/// current state. [`ExtensionHost::all_active_extensions`] reads it once
/// for all categories.
#[derive(Debug, Clone)]
pub struct ManifestHost {
    project_dir: PathBuf,
    manifest_path: PathBuf,
    cache_dir: Option<PathBuf>,
}

impl ManifestHost {
    /// Create a host for `project_dir` using the default manifest location
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let manifest_path = project_dir.join(DEFAULT_MANIFEST_PATH);
        Self {
            project_dir,
            manifest_path,
            cache_dir: None,
        }
    }

    /// Use a different manifest; relative paths resolve against the project root
    pub fn with_manifest(mut self, manifest_path: impl AsRef<Path>) -> Self {
        self.manifest_path = self.project_dir.join(manifest_path);
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Load and parse the manifest
    pub fn load(&self) -> Result<ManifestJson> {
        if !self.manifest_path.exists() {
            return Err(BundleError::ManifestNotFound {
                path: self.manifest_path.clone(),
            });
        }

        let contents = fs::read_to_string(&self.manifest_path)?;
        serde_json::from_str(&contents).map_err(|e| BundleError::InvalidManifest {
            path: self.manifest_path.clone(),
            message: e.to_string(),
        })
    }
}

impl ManifestJson {
    fn active(&self, kind: ExtensionKind) -> Vec<InstalledExtension> {
        self.entries(kind)
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| InstalledExtension {
                name: entry.name.clone(),
                path: entry.path.clone(),
                active: true,
            })
            .collect()
    }
}

impl ExtensionHost for ManifestHost {
    fn active_extensions(&self, kind: ExtensionKind) -> Result<Vec<InstalledExtension>> {
        Ok(self.load()?.active(kind))
    }

    fn all_active_extensions(&self) -> Result<Vec<(ExtensionKind, Vec<InstalledExtension>)>> {
        let manifest = self.load()?;

        Ok(ExtensionKind::all()
            .iter()
            .map(|kind| (*kind, manifest.active(*kind)))
            .collect())
    }

    fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| self.project_dir.join("var"))
    }
}
