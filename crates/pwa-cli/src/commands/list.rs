//! List command - show the active extensions and their checksum.

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::Path;

use super::{HostArgs, Settings};
use crate::config::PwaConfig;

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ListArgs, config: Option<&PwaConfig>) -> Result<i32> {
    let settings = Settings::resolve(&args.host, config)?;
    let bundler = settings.bundler();
    let (extensions, checksum) = bundler.inspect()?;
    let resources = &settings.bundle.resources_directory;

    if args.json {
        let items: Vec<_> = extensions
            .iter()
            .map(|e| {
                serde_json::json!({
                    "name": e.name,
                    "path": e.path,
                    "hasAssets": Path::new(&e.path).join(resources).is_dir(),
                })
            })
            .collect();

        let output = serde_json::json!({
            "checksum": checksum,
            "artifact": format!("{}/{}.zip", settings.bundle.public_directory, checksum),
            "extensions": items,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(0);
    }

    if extensions.is_empty() {
        println!("{} No active extensions", style("Info:").cyan());
    }

    for extension in &extensions {
        let has_assets = Path::new(&extension.path).join(resources).is_dir();
        let marker = if has_assets {
            style("assets").green()
        } else {
            style("no assets").dim()
        };

        println!("{} [{}]", style(&extension.name).bold(), marker);
        println!("  {}", extension.path);
    }

    println!();
    println!("Checksum: {}", style(&checksum).cyan());
    println!("Artifact: {}/{}.zip", settings.bundle.public_directory, checksum);

    Ok(0)
}
