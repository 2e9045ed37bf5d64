//! Extension host that treats every installed extension directory as active.

use std::fs;
use std::path::{Path, PathBuf};

use super::{ExtensionHost, ExtensionKind, InstalledExtension};
use crate::Result;

/// Scans `custom/apps` and `custom/plugins` below the project root.
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    project_dir: PathBuf,
    cache_dir: Option<PathBuf>,
}

impl DirectoryHost {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            cache_dir: None,
        }
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    /// Install directory of a category, relative to the project root
    pub fn install_dir(kind: ExtensionKind) -> &'static str {
        match kind {
            ExtensionKind::App => "custom/apps",
            ExtensionKind::Plugin => "custom/plugins",
        }
    }
}

impl ExtensionHost for DirectoryHost {
    fn active_extensions(&self, kind: ExtensionKind) -> Result<Vec<InstalledExtension>> {
        let relative_dir = Self::install_dir(kind);
        let dir = self.project_dir.join(relative_dir);

        if !dir.is_dir() {
            log::debug!("No {} directory at {}", kind.as_str(), dir.display());
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            names.push(name);
        }

        // read_dir order is platform dependent
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| {
                let path = format!("{}/{}", relative_dir, name);
                InstalledExtension::new(name, path)
            })
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
