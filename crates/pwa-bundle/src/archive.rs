//! Asset archive creation.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::config::BundleConfig;
use crate::extension::ExtensionMetadata;
use crate::util::convert_to_dash_case;
use crate::Result;

/// Entry written when no extension contributed any file
pub const PLACEHOLDER_ENTRY: &str = "_placeholder_";

/// What ended up in an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Number of asset files added
    pub entries: usize,
    /// Whether the placeholder entry was written instead
    pub placeholder: bool,
}

/// Writes the asset directories of extensions into one zip archive
pub struct AssetArchiver<'a> {
    config: &'a BundleConfig,
}

impl<'a> AssetArchiver<'a> {
    pub fn new(config: &'a BundleConfig) -> Self {
        Self { config }
    }

    /// Create the archive at `archive_path`, replacing any existing file.
    ///
    /// Extensions without an asset directory are skipped. Files are stored
    /// as `<dash-cased name>/<path below the asset directory>`. When two
    /// extensions map to the same entry name, the later one wins.
    pub fn create(
        &self,
        archive_path: &Path,
        extensions: &[ExtensionMetadata],
    ) -> Result<ArchiveSummary> {
        if let Some(parent) = archive_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // File::create truncates an existing archive
        let file = File::create(archive_path)?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        let mut entries = ArchiveEntries::default();

        for extension in extensions {
            let asset_dir = Path::new(&extension.path).join(&self.config.resources_directory);

            if !asset_dir.is_dir() {
                log::debug!("Skipping {}: no assets at {}", extension.name, asset_dir.display());
                continue;
            }

            let namespace = convert_to_dash_case(&extension.name);
            let added = entries.add_directory(&asset_dir, &namespace)?;
            log::debug!("Added {} file(s) from {}", added, extension.name);
        }

        let mut summary = ArchiveSummary::default();

        for (local_path, source_path) in &entries.files {
            log::trace!("Adding {} as {}", source_path.display(), local_path);

            let mut source = File::open(source_path)?;
            zip.start_file(local_path.as_str(), options)?;
            io::copy(&mut source, &mut zip)?;
            summary.entries += 1;
        }

        if summary.entries == 0 {
            zip.start_file(PLACEHOLDER_ENTRY, options)?;
            summary.placeholder = true;
        }

        let mut writer = zip.finish()?;
        writer.flush()?;

        Ok(summary)
    }
}

/// Archive entry names mapped to the files they are read from.
///
/// A name claimed twice keeps its first position and takes the later source.
#[derive(Debug, Default)]
struct ArchiveEntries {
    files: Vec<(String, PathBuf)>,
    index: HashMap<String, usize>,
}

impl ArchiveEntries {
    /// Add every regular file below `dir`, sorted for reproducible output
    fn add_directory(&mut self, dir: &Path, namespace: &str) -> Result<usize> {
        let mut added = 0;

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path();

            // Directory entries are implied by the file paths
            if !path.is_file() {
                continue;
            }

            let relative = path
                .strip_prefix(dir)
                .map_err(|e| io::Error::other(format!("{}: {}", path.display(), e)))?;

            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            self.insert(format!("{}/{}", namespace, relative), path.to_path_buf());
            added += 1;
        }

        Ok(added)
    }

    fn insert(&mut self, local_path: String, source: PathBuf) {
        match self.index.get(&local_path) {
            Some(&position) => {
                log::warn!(
                    "Duplicate archive entry {}: {} replaces {}",
                    local_path,
                    source.display(),
                    self.files[position].1.display()
                );
                self.files[position].1 = source;
            }
            None => {
                self.index.insert(local_path.clone(), self.files.len());
                self.files.push((local_path, source));
            }
        }
    }
}

/// Create the asset archive for `extensions` at `archive_path`
pub fn create_assets_archive(
    archive_path: &Path,
    extensions: &[ExtensionMetadata],
    config: &BundleConfig,
) -> Result<ArchiveSummary> {
    AssetArchiver::new(config).create(archive_path, extensions)
}
