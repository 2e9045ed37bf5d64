//! Publishing of a built archive to public storage.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::config::BundleConfig;
use crate::storage::PublicStorage;
use crate::Result;

/// Writes archives to `<public-directory>/<name>.zip` in a [`PublicStorage`]
pub struct Publisher<'a, S: PublicStorage + ?Sized> {
    storage: &'a S,
    config: &'a BundleConfig,
}

impl<'a, S: PublicStorage + ?Sized> Publisher<'a, S> {
    pub fn new(storage: &'a S, config: &'a BundleConfig) -> Self {
        Self { storage, config }
    }

    /// Relative path an artifact is published under.
    ///
    /// Without a checksum the configured default name (`pwa_assets`) is used.
    pub fn output_path(&self, checksum: Option<&str>) -> String {
        let output = checksum.unwrap_or(self.config.default_artifact_name.as_str());
        format!("{}/{}.zip", self.config.public_directory, output)
    }

    /// Publish `source_archive`, replacing a previous artifact at the same path.
    ///
    /// Not transactional: the old artifact is deleted before the new one is
    /// written.
    pub fn publish(&self, source_archive: &Path, checksum: Option<&str>) -> Result<String> {
        self.storage.create_dir(&self.config.public_directory)?;

        let output_path = self.output_path(checksum);

        if self.storage.delete(&output_path)? {
            log::debug!("Removed previous artifact {}", output_path);
        }

        let mut reader = BufReader::new(File::open(source_archive)?);
        let written = self.storage.write_stream(&output_path, &mut reader)?;

        log::info!("Published {} ({} bytes)", output_path, written);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_output_path() {
        let storage = LocalStorage::new("/srv/shop/public");
        let config = BundleConfig::default();
        let publisher = Publisher::new(&storage, &config);

        assert_eq!(publisher.output_path(Some("abc123")), "pwa/abc123.zip");
        assert_eq!(publisher.output_path(None), "pwa/pwa_assets.zip");
    }

    #[test]
    fn test_publish_with_checksum() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.zip");
        fs::write(&source, b"zip bytes").unwrap();

        let storage = LocalStorage::new(temp.path().join("public"));
        let config = BundleConfig::default();
        let publisher = Publisher::new(&storage, &config);

        let path = publisher.publish(&source, Some("0123abcd")).unwrap();

        assert_eq!(path, "pwa/0123abcd.zip");
        assert_eq!(
            fs::read(temp.path().join("public/pwa/0123abcd.zip")).unwrap(),
            b"zip bytes"
        );
    }

    #[test]
    fn test_publish_without_checksum_uses_default_name() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.zip");
        fs::write(&source, b"zip bytes").unwrap();

        let storage = LocalStorage::new(temp.path().join("public"));
        let config = BundleConfig::default();

        let path = Publisher::new(&storage, &config).publish(&source, None).unwrap();

        assert_eq!(path, "pwa/pwa_assets.zip");
        assert!(storage.exists("pwa/pwa_assets.zip"));
    }

    #[test]
    fn test_republish_overwrites() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.zip");
        let storage = LocalStorage::new(temp.path().join("public"));
        let config = BundleConfig::default();
        let publisher = Publisher::new(&storage, &config);

        fs::write(&source, b"first build, longer content").unwrap();
        publisher.publish(&source, Some("same")).unwrap();

        fs::write(&source, b"second").unwrap();
        publisher.publish(&source, Some("same")).unwrap();

        let published: Vec<_> = fs::read_dir(temp.path().join("public/pwa"))
            .unwrap()
            .collect();
        assert_eq!(published.len(), 1);
        assert_eq!(
            fs::read(temp.path().join("public/pwa/same.zip")).unwrap(),
            b"second"
        );
    }

    #[test]
    fn test_missing_source_archive_fails() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path().join("public"));
        let config = BundleConfig::default();

        let result = Publisher::new(&storage, &config).publish(&temp.path().join("nope.zip"), None);
        assert!(result.is_err());
    }
}
