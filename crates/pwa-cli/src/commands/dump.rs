//! Dump command - build and publish the PWA asset bundle.

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use pwa_bundle::ArtifactNaming;

use super::{HostArgs, Settings};
use crate::config::PwaConfig;

#[derive(Args, Debug)]
pub struct DumpArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// Publish under the fixed default name instead of the checksum
    #[arg(long)]
    pub no_checksum: bool,
}

pub fn execute(args: DumpArgs, config: Option<&PwaConfig>) -> Result<i32> {
    let settings = Settings::resolve(&args.host, config)?;
    let bundler = settings.bundler();

    let naming = if args.no_checksum {
        ArtifactNaming::Default
    } else {
        ArtifactNaming::Checksum
    };

    let report = bundler
        .dump_bundles_with(naming)
        .context("Failed to bundle PWA assets")?;

    println!("{} Bundled {} file(s) from {} extension(s)",
        style("Info:").cyan(),
        report.archive.entries,
        report.extensions.len()
    );
    if report.archive.placeholder {
        println!("{} No extension ships PWA assets, published a placeholder archive",
            style("Warning:").yellow()
        );
    }

    println!("{} Published {}",
        style("Success:").green().bold(),
        settings.public_dir.join(&report.published_path).display()
    );

    Ok(0)
}
