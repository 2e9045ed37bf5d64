//! The bundling pipeline: list extensions, archive their assets, publish.

use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::{ArchiveSummary, AssetArchiver};
use crate::checksum::compute_checksum;
use crate::config::BundleConfig;
use crate::extension::{collect_extensions, ExtensionHost, ExtensionMetadata};
use crate::publisher::Publisher;
use crate::storage::PublicStorage;
use crate::Result;

/// How the published artifact is named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtifactNaming {
    /// `<checksum>.zip`, changes whenever the extension set changes
    #[default]
    Checksum,
    /// The configured fixed name (`pwa_assets.zip`)
    Default,
}

/// Outcome of one bundling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleReport {
    /// Path of the artifact relative to public storage
    pub published_path: String,
    pub checksum: String,
    pub extensions: Vec<ExtensionMetadata>,
    pub archive: ArchiveSummary,
}

/// Bundles the PWA assets of all active extensions and publishes them.
pub struct AssetBundler<H, S> {
    host: H,
    storage: S,
    config: BundleConfig,
}

impl<H: ExtensionHost, S: PublicStorage> AssetBundler<H, S> {
    pub fn new(host: H, storage: S) -> Self {
        Self::with_config(host, storage, BundleConfig::default())
    }

    pub fn with_config(host: H, storage: S, config: BundleConfig) -> Self {
        Self { host, storage, config }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Location of the temporary archive in the host's work directory
    pub fn archive_path(&self) -> PathBuf {
        self.host.cache_dir().join(self.config.archive_file_name())
    }

    /// Current active extensions and their checksum, without building anything
    pub fn inspect(&self) -> Result<(Vec<ExtensionMetadata>, String)> {
        let extensions = collect_extensions(&self.host)?;
        let checksum = compute_checksum(&extensions)?;
        Ok((extensions, checksum))
    }

    /// Build and publish the bundle, returning the published path.
    pub fn dump_bundles(&self) -> Result<String> {
        self.dump_bundles_with(ArtifactNaming::Checksum)
            .map(|report| report.published_path)
    }

    /// Build and publish the bundle with an explicit naming scheme.
    ///
    /// Any failure aborts the run. The temporary archive is removed
    /// afterwards, whether or not the run succeeded.
    pub fn dump_bundles_with(&self, naming: ArtifactNaming) -> Result<BundleReport> {
        let archive_path = self.archive_path();

        let (extensions, checksum) = self.inspect()?;
        log::debug!(
            "Bundling {} extension(s), checksum {}",
            extensions.len(),
            checksum
        );

        let result = self.archive_and_publish(&archive_path, &extensions, &checksum, naming);

        if archive_path.is_file() {
            if let Err(e) = fs::remove_file(&archive_path) {
                log::warn!("Could not remove {}: {}", archive_path.display(), e);
            }
        }

        let (archive, published_path) = result?;

        Ok(BundleReport {
            published_path,
            checksum,
            extensions,
            archive,
        })
    }

    fn archive_and_publish(
        &self,
        archive_path: &Path,
        extensions: &[ExtensionMetadata],
        checksum: &str,
        naming: ArtifactNaming,
    ) -> Result<(ArchiveSummary, String)> {
        let archive = AssetArchiver::new(&self.config).create(archive_path, extensions)?;

        let publisher = Publisher::new(&self.storage, &self.config);
        let published = match naming {
            ArtifactNaming::Checksum => publisher.publish(archive_path, Some(checksum))?,
            ArtifactNaming::Default => publisher.publish(archive_path, None)?,
        };

        Ok((archive, published))
    }
}
