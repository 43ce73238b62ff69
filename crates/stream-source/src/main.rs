//! Streaming-source lookup CLI.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::Config;
use std::path::PathBuf;
use std::time::Duration;
use stream_source::{LibriaClient, SourceMatcher};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find a streaming release for a title
    Find {
        /// Title variants to try, most specific first
        #[arg(required = true)]
        titles: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    shared::logging::init_for_component(
        "stream-source",
        &config.log_dir().to_string_lossy(),
        log_level,
    )?;

    info!(config_file = %args.config.display(), "Stream source starting");

    let client = LibriaClient::new(
        config.source.base_url.clone(),
        config.source.search_limit,
        Duration::from_secs(config.source.request_timeout_secs),
    )?;
    let matcher = SourceMatcher::new(client, config.source.cdn_host.clone());

    match args.command {
        Command::Find { titles } => {
            match matcher.find_source(&titles).await? {
                Some(found) => {
                    println!(
                        "Release {} (matched via \"{}\"), {} episodes",
                        found.source_id,
                        found.matched_title_variant,
                        found.episodes.len()
                    );
                    for episode in &found.episodes {
                        let tiers: Vec<&str> = episode
                            .qualities
                            .available_tiers()
                            .iter()
                            .map(|t| t.as_str())
                            .collect();
                        println!("  {:>4}  [{}]", episode.number, tiers.join(", "));
                    }
                }
                None => println!("Источник не найден"),
            }
        }
    }

    Ok(())
}
