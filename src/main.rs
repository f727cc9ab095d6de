//! Sizelock - Target-Size Media Re-Encoder
//!
//! This is the main entry point for the sizelock CLI, which re-encodes a
//! media file to hit a target output size using ffmpeg and ffprobe.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sizelock::cli::Args;
use sizelock::config::Config;
use sizelock::workflow::{Outcome, Workflow};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = Args::parse();

    if let Err(e) = setup_logging(args.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    // Load configuration
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match run(args, config).await {
        Ok(Outcome::Encoded(path)) => {
            info!("Encode finished: {}", path.display());
        }
        Ok(Outcome::Declined) => {
            info!("Aborted by user, output left untouched");
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: Args, config: Config) -> Result<Outcome> {
    let workflow = Workflow::new(config)?;
    Ok(workflow.run(&args).await?)
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(config_path) => Ok(Config::from_file(config_path)?),
        None => {
            // Try sizelock.toml from the current directory first
            if std::path::Path::new("sizelock.toml").exists() {
                info!("Found sizelock.toml in current directory, loading...");
                Ok(Config::from_file("sizelock.toml")?)
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".sizelock").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "sizelock.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
