/// Integration tests for the bundling pipeline
///
/// These tests run the full pipeline against a project directory with a
/// manifest and real extension directories, publishing into a local
/// public directory.

use pwa_bundle::{
    compute_checksum, ArtifactNaming, AssetBundler, BundleConfig, ExtensionMetadata,
    LocalStorage, ManifestHost, PLACEHOLDER_ENTRY,
};
use std::fs::{self, File};
use std::path::{Path, MAIN_SEPARATOR};
use tempfile::TempDir;

fn write_manifest(project: &Path, content: &str) {
    let path = project.join("var/extensions.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn write_asset(project: &Path, extension_path: &str, relative: &str, content: &str) {
    let path = project
        .join(extension_path)
        .join("src/Resources/app/pwa")
        .join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn bundler(project: &Path) -> AssetBundler<ManifestHost, LocalStorage> {
    AssetBundler::new(
        ManifestHost::new(project),
        LocalStorage::new(project.join("public")),
    )
}

fn published_entries(project: &Path, published_path: &str) -> Vec<String> {
    let file = File::open(project.join("public").join(published_path)).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

#[test]
fn test_bundles_apps_and_plugins() {
    let temp = TempDir::new().unwrap();
    let project = temp.path();
    write_manifest(
        project,
        r#"{
            "apps": [{"name": "SwagApp", "path": "custom/apps/SwagApp"}],
            "plugins": [
                {"name": "SwagCustomizedProducts", "path": "custom/plugins/SwagCustomizedProducts"},
                {"name": "NoAssets", "path": "custom/plugins/NoAssets"}
            ]
        }"#,
    );
    write_asset(project, "custom/apps/SwagApp", "index.js", "app");
    write_asset(project, "custom/plugins/SwagCustomizedProducts", "components/Option.vue", "plugin");
    fs::create_dir_all(project.join("custom/plugins/NoAssets")).unwrap();

    let report = bundler(project)
        .dump_bundles_with(ArtifactNaming::Checksum)
        .unwrap();

    let names: Vec<_> = report.extensions.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["SwagApp", "SwagCustomizedProducts", "NoAssets"]);
    assert_eq!(report.published_path, format!("pwa/{}.zip", report.checksum));
    assert_eq!(report.archive.entries, 2);
    assert_eq!(
        published_entries(project, &report.published_path),
        vec![
            "swag-app/index.js",
            "swag-customized-products/components/Option.vue",
        ]
    );
}

#[test]
fn test_single_extension_example() {
    let temp = TempDir::new().unwrap();
    let project = temp.path();
    write_manifest(
        project,
        r#"{"plugins": [{"name": "Foo Bar", "path": "ext/foobar"}]}"#,
    );
    write_asset(project, "ext/foobar", "main.js", "export default {}");

    let published = bundler(project).dump_bundles().unwrap();

    assert_eq!(published_entries(project, &published), vec!["foo-bar/main.js"]);
}

#[test]
fn test_checksum_matches_resolved_metadata() {
    let temp = TempDir::new().unwrap();
    let project = temp.path();
    write_manifest(
        project,
        r#"{"plugins": [{"name": "SwagPwa", "path": "custom/plugins/SwagPwa"}]}"#,
    );

    let (extensions, checksum) = bundler(project).inspect().unwrap();

    let expected_path = format!(
        "{}{}custom/plugins/SwagPwa",
        project.to_string_lossy(),
        MAIN_SEPARATOR
    );
    assert_eq!(extensions, vec![ExtensionMetadata::new("SwagPwa", expected_path)]);
    assert_eq!(checksum, compute_checksum(&extensions).unwrap());
}

#[test]
fn test_consecutive_runs_are_idempotent() {
    let temp = TempDir::new().unwrap();
    let project = temp.path();
    write_manifest(
        project,
        r#"{"plugins": [{"name": "SwagPwa", "path": "custom/plugins/SwagPwa"}]}"#,
    );
    write_asset(project, "custom/plugins/SwagPwa", "main.js", "x");

    let bundler = bundler(project);
    let first = bundler.dump_bundles().unwrap();
    let second = bundler.dump_bundles().unwrap();

    assert_eq!(first, second);
    let artifacts: Vec<_> = fs::read_dir(project.join("public/pwa")).unwrap().collect();
    assert_eq!(artifacts.len(), 1);
}

#[test]
fn test_activation_change_changes_artifact_path() {
    let temp = TempDir::new().unwrap();
    let project = temp.path();
    write_manifest(
        project,
        r#"{"plugins": [{"name": "SwagPwa", "path": "custom/plugins/SwagPwa"}]}"#,
    );

    let bundler = bundler(project);
    let before = bundler.dump_bundles().unwrap();

    write_manifest(
        project,
        r#"{"plugins": [
            {"name": "SwagPwa", "path": "custom/plugins/SwagPwa"},
            {"name": "SwagPayPal", "path": "custom/plugins/SwagPayPal"}
        ]}"#,
    );
    let after = bundler.dump_bundles().unwrap();

    assert_ne!(before, after);
    assert!(project.join("public").join(&before).is_file());
    assert!(project.join("public").join(&after).is_file());
}

#[test]
fn test_empty_extension_set_publishes_placeholder() {
    let temp = TempDir::new().unwrap();
    let project = temp.path();
    write_manifest(project, r#"{"apps": [], "plugins": []}"#);

    let report = bundler(project)
        .dump_bundles_with(ArtifactNaming::Checksum)
        .unwrap();

    assert!(report.extensions.is_empty());
    assert!(report.archive.placeholder);
    assert_eq!(
        published_entries(project, &report.published_path),
        vec![PLACEHOLDER_ENTRY]
    );
}

#[test]
fn test_fallback_artifact_name() {
    let temp = TempDir::new().unwrap();
    let project = temp.path();
    write_manifest(project, "{}");

    let report = bundler(project)
        .dump_bundles_with(ArtifactNaming::Default)
        .unwrap();

    assert_eq!(report.published_path, "pwa/pwa_assets.zip");
    assert!(project.join("public/pwa/pwa_assets.zip").is_file());
}

#[test]
fn test_custom_config() {
    let temp = TempDir::new().unwrap();
    let project = temp.path();
    write_manifest(project, r#"{"plugins": [{"name": "Theme", "path": "themes/theme"}]}"#);
    fs::create_dir_all(project.join("themes/theme/pwa")).unwrap();
    fs::write(project.join("themes/theme/pwa/theme.css"), "body {}").unwrap();

    let config = BundleConfig {
        resources_directory: "pwa".to_string(),
        public_directory: "bundles".to_string(),
        ..BundleConfig::default()
    };
    let bundler = AssetBundler::with_config(
        ManifestHost::new(project),
        LocalStorage::new(project.join("public")),
        config,
    );

    let published = bundler.dump_bundles().unwrap();

    assert!(published.starts_with("bundles/"));
    assert_eq!(published_entries(project, &published), vec!["theme/theme.css"]);
}

#[test]
fn test_missing_manifest_is_fatal() {
    let temp = TempDir::new().unwrap();

    let result = bundler(temp.path()).dump_bundles();

    assert!(result.is_err());
    assert!(!temp.path().join("public/pwa").exists());
}

#[test]
fn test_same_named_app_and_plugin_are_bundled() {
    let temp = TempDir::new().unwrap();
    let project = temp.path();
    write_manifest(
        project,
        r#"{
            "apps": [{"name": "SwagPwa", "path": "custom/apps/SwagPwa"}],
            "plugins": [{"name": "SwagPwa", "path": "custom/plugins/SwagPwa"}]
        }"#,
    );
    write_asset(project, "custom/apps/SwagPwa", "main.js", "app");
    write_asset(project, "custom/plugins/SwagPwa", "main.js", "plugin");

    let published = bundler(project).dump_bundles().unwrap();

    assert_eq!(published_entries(project, &published), vec!["swag-pwa/main.js"]);

    let file = File::open(project.join("public").join(&published)).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut content = String::new();
    std::io::Read::read_to_string(&mut archive.by_name("swag-pwa/main.js").unwrap(), &mut content)
        .unwrap();
    assert_eq!(content, "plugin");
}

#[test]
fn test_unwritable_cache_dir_is_fatal() {
    let temp = TempDir::new().unwrap();
    let project = temp.path();
    write_manifest(project, r#"{"plugins": []}"#);

    let bundler = AssetBundler::new(
        ManifestHost::new(project).with_cache_dir(project.join("var/extensions.json")),
        LocalStorage::new(project.join("public")),
    );

    let result = bundler.dump_bundles();

    assert!(matches!(result, Err(pwa_bundle::BundleError::Io(_))));
    assert!(!project.join("public/pwa").exists());
}
