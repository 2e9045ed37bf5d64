mod commands;
mod config;

use config::PwaConfig;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pwa")]
#[command(about = "Bundle and publish the PWA assets of active shop extensions")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: commands::Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logger(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    // RUST_LOG takes precedence over the flags
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run() -> Result<i32> {
    let args = Args::parse();
    init_logger(args.verbose, args.quiet);

    // Load pwa.toml config if present
    let config = PwaConfig::load_from_cwd()?;

    commands::execute(args.command, config.as_ref())
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            // Print the error chain for debugging
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
