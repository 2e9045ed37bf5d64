//! Watch command - rebuild the bundle when extensions or their assets change.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebouncedEvent};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pwa_bundle::{
    AssetBundleListener, AssetBundler, DirectoryHost, EventDispatcher, EventType,
    ExtensionKind, ExtensionLifecycleEvent, LocalStorage,
};

use super::{CliHost, HostArgs, Settings};
use crate::config::PwaConfig;

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// Debounce delay in milliseconds
    #[arg(long, default_value = "500")]
    pub debounce: u64,
}

pub fn execute(args: WatchArgs, config: Option<&PwaConfig>) -> Result<i32> {
    let settings = Settings::resolve(&args.host, config)?;
    let glob_set = build_glob_set(&watch_patterns(&settings))?;
    let manifest_path = settings.manifest.as_ref().map(|m| settings.project_dir.join(m));

    let listener = Arc::new(AssetBundleListener::new(settings.bundler()));
    let mut dispatcher = EventDispatcher::new();
    listener.clone().subscribe(&mut dispatcher);

    rebuild(&dispatcher);

    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(
        Duration::from_millis(args.debounce),
        None,
        move |result: std::result::Result<Vec<DebouncedEvent>, Vec<notify::Error>>| {
            match result {
                Ok(events) => {
                    let _ = tx.send(events);
                }
                Err(errors) => {
                    for error in errors {
                        log::warn!("Watch error: {}", error);
                    }
                }
            }
        },
    ).map_err(|e| anyhow::anyhow!("Failed to create file watcher: {}", e))?;

    for root in watch_roots(&settings, manifest_path.as_deref()) {
        debouncer.watch(&root, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", root.display()))?;
        log::debug!("Watching {}", root.display());
    }

    let mut asset_dirs = HashSet::new();
    sync_asset_watches(&mut asset_dirs, asset_dirs_of(listener.bundler()), |dir, watch| {
        if watch {
            debouncer.watch(dir, RecursiveMode::Recursive)
        } else {
            debouncer.unwatch(dir)
        }
    });

    println!("{} Watching {} for extension changes. Press Ctrl-C to quit.",
        style("Info:").cyan(),
        settings.project_dir.display()
    );

    while let Ok(events) = rx.recv() {
        let changed: Vec<&PathBuf> = events
            .iter()
            .flat_map(|event| event.paths.iter())
            .filter(|path| {
                manifest_path.as_deref() == Some(path.as_path())
                    || matches_patterns(&glob_set, &settings.project_dir, path)
            })
            .collect();

        if changed.is_empty() {
            continue;
        }

        for path in &changed {
            log::debug!("Changed: {}", path.display());
        }
        eprintln!("{} {} change(s) detected, rebuilding",
            style("Info:").cyan(),
            changed.len()
        );

        rebuild(&dispatcher);

        sync_asset_watches(&mut asset_dirs, asset_dirs_of(listener.bundler()), |dir, watch| {
            if watch {
                debouncer.watch(dir, RecursiveMode::Recursive)
            } else {
                debouncer.unwatch(dir)
            }
        });
    }

    Ok(0)
}

/// Treat a change batch as an activation event and report the outcome
fn rebuild(dispatcher: &EventDispatcher) {
    let event = ExtensionLifecycleEvent::anonymous(EventType::PluginPostActivate);

    match dispatcher.dispatch(&event) {
        Ok(()) => println!("{} PWA assets rebuilt", style("Success:").green().bold()),
        Err(e) => eprintln!("{} {:#}", style("Error:").red().bold(), e),
    }
}

/// Glob patterns, relative to the project root, that trigger a rebuild
fn watch_patterns(settings: &Settings) -> Vec<String> {
    let resources = settings.bundle.resources_directory.trim_matches('/');
    let mut patterns = vec![format!("**/{}/**", resources)];

    if settings.manifest.is_none() {
        for kind in ExtensionKind::all() {
            patterns.push(format!("{}/*", DirectoryHost::install_dir(*kind)));
        }
    }

    patterns
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut glob_builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("Invalid glob pattern '{}'", pattern))?;
        glob_builder.add(glob);
    }
    glob_builder.build().context("Failed to build glob set")
}

fn matches_patterns(glob_set: &GlobSet, project_dir: &Path, path: &Path) -> bool {
    match path.strip_prefix(project_dir) {
        Ok(rel_path) => glob_set.is_match(rel_path),
        Err(_) => glob_set.is_match(path),
    }
}

/// Directories watched for the whole session
fn watch_roots(settings: &Settings, manifest_path: Option<&Path>) -> Vec<PathBuf> {
    let roots: Vec<PathBuf> = match manifest_path {
        Some(manifest) => manifest.parent().map(Path::to_path_buf).into_iter().collect(),
        None => ExtensionKind::all()
            .iter()
            .map(|kind| settings.project_dir.join(DirectoryHost::install_dir(*kind)))
            .collect(),
    };

    roots.into_iter().filter(|root| root.is_dir()).collect()
}

/// Asset directories of the currently active extensions
fn asset_dirs_of(bundler: &AssetBundler<CliHost, LocalStorage>) -> HashSet<PathBuf> {
    let resources = &bundler.config().resources_directory;

    match bundler.inspect() {
        Ok((extensions, _)) => extensions
            .iter()
            .map(|e| Path::new(&e.path).join(resources))
            .filter(|dir| dir.is_dir())
            .collect(),
        Err(e) => {
            log::warn!("Could not list extensions: {}", e);
            HashSet::new()
        }
    }
}

/// Watch new asset directories and drop the ones that went away
fn sync_asset_watches<F>(watched: &mut HashSet<PathBuf>, current: HashSet<PathBuf>, mut apply: F)
where
    F: FnMut(&Path, bool) -> notify::Result<()>,
{
    for dir in watched.difference(&current) {
        if let Err(e) = apply(dir, false) {
            log::debug!("Could not unwatch {}: {}", dir.display(), e);
        }
    }

    for dir in current.difference(watched) {
        match apply(dir, true) {
            Ok(()) => log::debug!("Watching {}", dir.display()),
            Err(e) => log::warn!("Could not watch {}: {}", dir.display(), e),
        }
    }

    *watched = current;
}
