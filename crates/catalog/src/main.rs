//! Catalog CLI application.

use anyhow::{Context, Result};
use catalog::{CacheStore, CatalogClient, MetadataResolver, RequestScheduler};
use clap::{Parser, Subcommand};
use shared::models::{NormalizedTitle, Season};
use shared::translations::format_season_year;
use shared::Config;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
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
    /// Top-rated titles
    Top {
        #[arg(short, long, default_value = "9")]
        limit: u32,
    },
    /// Best-rated titles of a season
    Seasonal {
        /// Season name (winter, spring, summer, fall); defaults to the current one
        #[arg(short, long)]
        season: Option<Season>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(short, long, default_value = "9")]
        limit: usize,
    },
    /// Search titles by free text
    Search {
        query: String,

        #[arg(short, long, default_value = "1")]
        page: u32,
    },
    /// Full details for one title
    Details { id: u32 },
    /// Recommendations related to one title
    Recommendations { id: u32 },
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
        "catalog",
        &config.log_dir().to_string_lossy(),
        log_level,
    )?;

    info!(config_file = %args.config.display(), "Catalog starting");

    let cache = Arc::new(CacheStore::new(
        Duration::from_secs(config.catalog.cache.ttl_seconds),
        config.catalog.cache.schema_version,
        config.cache_snapshot_path(),
    ));
    let warmed = cache
        .load_from_durable()
        .context("Failed to load cache snapshot")?;
    info!(entries = warmed, "Cache ready");
    let _sweeper = cache.spawn_sweeper();

    let scheduler = Arc::new(RequestScheduler::new(
        Arc::clone(&cache),
        config.catalog.pacing.clone(),
    ));
    let client = CatalogClient::new(
        config.catalog.base_url.clone(),
        Duration::from_secs(config.catalog.request_timeout_secs),
    )?;
    let resolver = MetadataResolver::new(scheduler, client);

    match args.command {
        Command::Top { limit } => {
            let titles = resolver.top_titles(limit).await?;
            print_titles(&titles);
        }
        Command::Seasonal { season, year, limit } => {
            let window = catalog::current_seasons();
            let season = season.unwrap_or(window.current.0);
            let year = year.unwrap_or(window.current.1);
            let titles = resolver.seasonal_titles(season, year, limit).await?;
            print_titles(&titles);
        }
        Command::Search { query, page } => {
            let titles = resolver.search(&query, page).await?;
            print_titles(&titles);
        }
        Command::Details { id } => {
            let title = resolver.title_by_id(id).await?;
            print_details(&title);
        }
        Command::Recommendations { id } => {
            let titles = resolver.recommendations(id).await?;
            print_titles(&titles);
        }
    }

    cache.persist().context("Failed to persist cache snapshot")?;

    Ok(())
}

fn print_titles(titles: &[NormalizedTitle]) {
    if titles.is_empty() {
        println!("Ничего не найдено");
        return;
    }

    for title in titles {
        let score = title
            .score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "—".to_string());
        println!(
            "{:>8}  {:>5}  {}  ({})",
            title.id,
            score,
            title.title,
            format_season_year(title.season, title.year)
        );
    }
}

fn print_details(title: &NormalizedTitle) {
    println!("{} (id {})", title.title, title.id);
    if let Some(ref english) = title.title_english {
        println!("  English: {}", english);
    }
    println!("  Сезон: {}", format_season_year(title.season, title.year));
    if let Some(ref status) = title.status {
        println!("  Статус: {}", shared::translations::translate_status(status));
    }
    if let Some(episodes) = title.episode_count {
        println!("  Эпизоды: {}", episodes);
    } else {
        println!("  Эпизоды: TBA");
    }
    if !title.genres.is_empty() {
        println!(
            "  Жанры: {}",
            shared::translations::translate_genres(&title.genres).join(", ")
        );
    }
    if !title.studios.is_empty() {
        println!("  Студии: {}", title.studios.join(", "));
    }
    if let Some(ref synopsis) = title.synopsis {
        println!("\n{}", synopsis);
    }
}
