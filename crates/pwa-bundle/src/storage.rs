//! Public storage backends.
//!
//! Paths handed to a [`PublicStorage`] are relative, `/`-separated keys
//! such as `pwa/<checksum>.zip`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::{BundleError, Result};

/// Filesystem abstraction of the public storage the artifact is published to
pub trait PublicStorage {
    /// Create a directory and its parents; existing directories are fine
    fn create_dir(&self, path: &str) -> Result<()>;

    /// Delete a file. Returns `Ok(false)` when there was nothing to delete.
    fn delete(&self, path: &str) -> Result<bool>;

    /// Write everything `reader` yields to `path`, returning the byte count
    fn write_stream(&self, path: &str, reader: &mut dyn Read) -> Result<u64>;

    fn exists(&self, path: &str) -> bool;
}

/// Storage rooted at a local directory (usually the project's `public/`)
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a storage key below the root, rejecting anything that could escape it
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let mut resolved = self.root.clone();

        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(BundleError::InvalidStoragePath(path.to_string())),
            }
        }

        if resolved == self.root {
            return Err(BundleError::InvalidStoragePath(path.to_string()));
        }

        Ok(resolved)
    }

    fn storage_error(path: &str, err: io::Error) -> BundleError {
        BundleError::Storage {
            path: path.to_string(),
            reason: err.to_string(),
        }
    }
}

impl PublicStorage for LocalStorage {
    fn create_dir(&self, path: &str) -> Result<()> {
        let dir = self.resolve(path)?;
        fs::create_dir_all(&dir).map_err(|e| Self::storage_error(path, e))
    }

    fn delete(&self, path: &str) -> Result<bool> {
        let file = self.resolve(path)?;

        match fs::remove_file(&file) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::storage_error(path, e)),
        }
    }

    fn write_stream(&self, path: &str, reader: &mut dyn Read) -> Result<u64> {
        let file = self.resolve(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::storage_error(path, e))?;
        }

        let output = File::create(&file).map_err(|e| Self::storage_error(path, e))?;
        let mut writer = BufWriter::new(output);
        let written = io::copy(reader, &mut writer).map_err(|e| Self::storage_error(path, e))?;
        writer.flush().map_err(|e| Self::storage_error(path, e))?;

        Ok(written)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }
}
