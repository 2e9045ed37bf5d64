pub mod archive;
pub mod bundler;
pub mod checksum;
pub mod config;
pub mod error;
pub mod event;
pub mod extension;
pub mod publisher;
pub mod storage;
pub mod util;

pub use error::{BundleError, Result};
pub use archive::{create_assets_archive, ArchiveSummary, AssetArchiver, PLACEHOLDER_ENTRY};
pub use bundler::{ArtifactNaming, AssetBundler, BundleReport};
pub use checksum::compute_checksum;
pub use config::{BundleConfig, ConfigLoader};
pub use event::{
    AssetBundleListener, EventDispatcher, EventListener, EventType, ExtensionLifecycleEvent,
};
pub use extension::{
    collect_extensions, DirectoryHost, ExtensionHost, ExtensionKind, ExtensionMetadata,
    InstalledExtension, ManifestHost,
};
pub use publisher::Publisher;
pub use storage::{LocalStorage, PublicStorage};
pub use util::convert_to_dash_case;
