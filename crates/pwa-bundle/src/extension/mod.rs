//! Active extension lookup.
//!
//! The shop platform is only reached through [`ExtensionHost`], a query
//! interface returning plain records. [`collect_extensions`] turns those
//! records into the metadata list every other stage works on.

mod directory;
mod manifest;

pub use directory::DirectoryHost;
pub use manifest::{ManifestEntry, ManifestHost, ManifestJson, DEFAULT_MANIFEST_PATH};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::Result;

/// Extension categories known to the shop platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    App,
    Plugin,
}

impl ExtensionKind {
    /// Enumeration order of the categories
    pub fn all() -> &'static [ExtensionKind] {
        &[ExtensionKind::App, ExtensionKind::Plugin]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionKind::App => "app",
            ExtensionKind::Plugin => "plugin",
        }
    }
}

/// An installed extension as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledExtension {
    pub name: String,
    /// Installation path relative to the project root
    pub path: String,
    pub active: bool,
}

impl InstalledExtension {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            active: true,
        }
    }
}

/// Name and absolute path of an active extension.
///
/// Field order matters: it is the key order of the serialized form the
/// checksum is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    pub name: String,
    pub path: String,
}

impl ExtensionMetadata {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Queries the shop platform for extension state and its directories.
pub trait ExtensionHost {
    /// Active extensions of one category, in the host's order
    fn active_extensions(&self, kind: ExtensionKind) -> Result<Vec<InstalledExtension>>;

    /// Project root every extension path is relative to
    fn project_dir(&self) -> &Path;

    /// Local work directory for temporary build output
    fn cache_dir(&self) -> PathBuf;

    /// Active extensions of every category, in [`ExtensionKind::all`] order.
    ///
    /// Hosts backed by a single source override this to read it once, so
    /// all categories come from the same state.
    fn all_active_extensions(&self) -> Result<Vec<(ExtensionKind, Vec<InstalledExtension>)>> {
        ExtensionKind::all()
            .iter()
            .map(|kind| -> Result<_> { Ok((*kind, self.active_extensions(*kind)?)) })
            .collect()
    }
}

/// Collect all active extensions, apps first, then plugins.
///
/// Paths are resolved by joining the project root and the extension's
/// relative path with the platform separator.
pub fn collect_extensions<H: ExtensionHost + ?Sized>(host: &H) -> Result<Vec<ExtensionMetadata>> {
    let project_dir = host.project_dir().to_string_lossy().into_owned();
    let mut extensions = Vec::new();

    for (kind, installed) in host.all_active_extensions()? {
        log::debug!("Found {} active {}(s)", installed.len(), kind.as_str());

        for extension in installed.into_iter().filter(|e| e.active) {
            let path = format!("{}{}{}", project_dir, MAIN_SEPARATOR, extension.path);
            extensions.push(ExtensionMetadata::new(extension.name, path));
        }
    }

    Ok(extensions)
}
