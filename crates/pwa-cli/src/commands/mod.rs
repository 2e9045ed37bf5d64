//! Bundling subcommands.

mod dump;
mod list;
mod watch;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use pwa_bundle::{
    AssetBundler, BundleConfig, ConfigLoader, DirectoryHost, ExtensionHost, ExtensionKind,
    InstalledExtension, LocalStorage, ManifestHost,
};

use crate::config::PwaConfig;

pub use dump::DumpArgs;
pub use list::ListArgs;
pub use watch::WatchArgs;

/// Bundling subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bundle the PWA assets of all active extensions and publish the archive
    Dump(DumpArgs),

    /// Show the active extensions and the checksum of the current set
    #[command(alias = "ls")]
    List(ListArgs),

    /// Rebuild the bundle whenever extensions or their assets change
    Watch(WatchArgs),
}

/// Execute a bundling command
pub fn execute(command: Commands, config: Option<&PwaConfig>) -> Result<i32> {
    match command {
        Commands::Dump(args) => dump::execute(args, config),
        Commands::List(args) => list::execute(args, config),
        Commands::Watch(args) => watch::execute(args, config),
    }
}

/// Options locating the shop installation, shared by all commands
#[derive(Args, Debug, Clone, Default)]
pub struct HostArgs {
    /// Project root of the shop (default: current directory)
    #[arg(short = 'd', long)]
    pub project_dir: Option<PathBuf>,

    /// Extension manifest, relative to the project root (default: var/extensions.json)
    #[arg(short, long, conflicts_with = "scan")]
    pub manifest: Option<PathBuf>,

    /// Treat every directory in custom/apps and custom/plugins as an active extension
    #[arg(long)]
    pub scan: bool,

    /// Public storage root (default: <project-dir>/public)
    #[arg(long)]
    pub public_dir: Option<PathBuf>,

    /// Work directory for the temporary archive (default: <project-dir>/var)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Extension host selected on the command line
#[derive(Debug, Clone)]
pub enum CliHost {
    Manifest(ManifestHost),
    Directory(DirectoryHost),
}

impl ExtensionHost for CliHost {
    fn active_extensions(&self, kind: ExtensionKind) -> pwa_bundle::Result<Vec<InstalledExtension>> {
        match self {
            CliHost::Manifest(host) => host.active_extensions(kind),
            CliHost::Directory(host) => host.active_extensions(kind),
        }
    }

    fn project_dir(&self) -> &Path {
        match self {
            CliHost::Manifest(host) => host.project_dir(),
            CliHost::Directory(host) => host.project_dir(),
        }
    }

    fn cache_dir(&self) -> PathBuf {
        match self {
            CliHost::Manifest(host) => host.cache_dir(),
            CliHost::Directory(host) => host.cache_dir(),
        }
    }

    fn all_active_extensions(
        &self,
    ) -> pwa_bundle::Result<Vec<(ExtensionKind, Vec<InstalledExtension>)>> {
        match self {
            CliHost::Manifest(host) => host.all_active_extensions(),
            CliHost::Directory(host) => host.all_active_extensions(),
        }
    }
}

/// Effective settings after merging CLI flags, pwa.toml and the environment
#[derive(Debug, Clone)]
pub struct Settings {
    pub project_dir: PathBuf,
    pub manifest: Option<PathBuf>,
    pub public_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub bundle: BundleConfig,
}

impl Settings {
    /// Merge CLI args with config file settings (CLI takes precedence)
    pub fn resolve(args: &HostArgs, config: Option<&PwaConfig>) -> Result<Self> {
        let host_config = config.map(|c| &c.host);

        let project_dir = match args
            .project_dir
            .clone()
            .or_else(|| host_config.and_then(|h| h.project_dir.clone()))
        {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };
        let project_dir = project_dir
            .canonicalize()
            .with_context(|| format!("Project directory not found: {}", project_dir.display()))?;

        let scan = args.scan || host_config.and_then(|h| h.scan).unwrap_or(false);
        let manifest = if scan {
            None
        } else {
            Some(
                args.manifest
                    .clone()
                    .or_else(|| host_config.and_then(|h| h.manifest.clone()))
                    .unwrap_or_else(|| PathBuf::from(pwa_bundle::extension::DEFAULT_MANIFEST_PATH)),
            )
        };

        let public_dir = args
            .public_dir
            .clone()
            .or_else(|| host_config.and_then(|h| h.public_dir.clone()))
            .unwrap_or_else(|| project_dir.join("public"));

        let cache_dir = args
            .cache_dir
            .clone()
            .or_else(|| host_config.and_then(|h| h.cache_dir.clone()))
            .unwrap_or_else(|| project_dir.join("var"));

        let mut bundle = config.map(|c| c.bundle.clone()).unwrap_or_default();
        ConfigLoader::new(true).apply_env(&mut bundle);
        bundle.validate()?;

        Ok(Self {
            project_dir,
            manifest,
            public_dir,
            cache_dir,
            bundle,
        })
    }

    pub fn host(&self) -> CliHost {
        match &self.manifest {
            Some(manifest) => CliHost::Manifest(
                ManifestHost::new(&self.project_dir)
                    .with_manifest(manifest)
                    .with_cache_dir(&self.cache_dir),
            ),
            None => CliHost::Directory(
                DirectoryHost::new(&self.project_dir).with_cache_dir(&self.cache_dir),
            ),
        }
    }

    pub fn bundler(&self) -> AssetBundler<CliHost, LocalStorage> {
        AssetBundler::with_config(
            self.host(),
            LocalStorage::new(&self.public_dir),
            self.bundle.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostConfig;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_defaults() {
        let temp = TempDir::new().unwrap();
        let args = HostArgs {
            project_dir: Some(temp.path().to_path_buf()),
            ..HostArgs::default()
        };

        let settings = Settings::resolve(&args, None).unwrap();
        let root = temp.path().canonicalize().unwrap();

        assert_eq!(settings.project_dir, root);
        assert_eq!(settings.manifest, Some(PathBuf::from("var/extensions.json")));
        assert_eq!(settings.public_dir, root.join("public"));
        assert_eq!(settings.cache_dir, root.join("var"));
        assert!(matches!(settings.host(), CliHost::Manifest(_)));
    }

    #[test]
    fn test_cli_flags_override_config() {
        let temp = TempDir::new().unwrap();
        let config = PwaConfig {
            bundle: BundleConfig::default(),
            host: HostConfig {
                project_dir: Some(temp.path().to_path_buf()),
                manifest: Some(PathBuf::from("from-config.json")),
                public_dir: Some(PathBuf::from("/from/config")),
                cache_dir: None,
                scan: None,
            },
        };
        let args = HostArgs {
            manifest: Some(PathBuf::from("from-cli.json")),
            ..HostArgs::default()
        };

        let settings = Settings::resolve(&args, Some(&config)).unwrap();

        assert_eq!(settings.manifest, Some(PathBuf::from("from-cli.json")));
        assert_eq!(settings.public_dir, PathBuf::from("/from/config"));
    }

    #[test]
    fn test_scan_selects_directory_host() {
        let temp = TempDir::new().unwrap();
        let args = HostArgs {
            project_dir: Some(temp.path().to_path_buf()),
            scan: true,
            ..HostArgs::default()
        };

        let settings = Settings::resolve(&args, None).unwrap();

        assert!(settings.manifest.is_none());
        assert!(matches!(settings.host(), CliHost::Directory(_)));
    }

    #[test]
    fn test_missing_project_dir() {
        let args = HostArgs {
            project_dir: Some(PathBuf::from("/definitely/not/a/shop")),
            ..HostArgs::default()
        };

        assert!(Settings::resolve(&args, None).is_err());
    }
}
