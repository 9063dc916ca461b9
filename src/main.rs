//! Catalog crawler entry point
//!
//! This is the command-line interface for the Alkoteka catalog crawler.

use alkoteka_catalog::config::{load_config_with_hash, Config};
use alkoteka_catalog::crawler::{load_seeds, Coordinator};
use alkoteka_catalog::output::print_statistics;
use alkoteka_catalog::url::{
    category_listing_url, city_binding_url, product_detail_url, Locality,
};
use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Alkoteka catalog crawler
///
/// Binds a city to the session, walks the seeded product categories and
/// exports one normalized record per product as a JSON feed.
#[derive(Parser, Debug)]
#[command(name = "alkoteka-catalog")]
#[command(version = "1.0.0")]
#[command(about = "Crawls the Alkoteka product catalog into a JSON feed", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Read category seeds from this file instead of the configured one
    #[arg(long, value_name = "PATH")]
    seeds: Option<PathBuf>,

    /// Write the feed to this file instead of the configured one
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be requested without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(seeds) = &cli.seeds {
        config.input.seed_path = seeds.display().to_string();
    }
    if let Some(output) = &cli.output {
        config.output.items_path = output.display().to_string();
    }

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_crawl(config, config_hash, cli.quiet).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("alkoteka_catalog=info,warn"),
            1 => EnvFilter::new("alkoteka_catalog=debug,info"),
            2 => EnvFilter::new("alkoteka_catalog=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be requested
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let locality = Locality::from_config(&config.site).context("invalid [site] configuration")?;

    println!("=== Catalog Crawler Dry Run ===\n");

    println!("Site:");
    println!("  API root: {}", locality.base());
    println!("  City: {}", locality.city_uuid());
    println!("  City binding: {}", city_binding_url(&locality));

    println!("\nCrawler Configuration:");
    println!("  Per page: {}", config.crawler.per_page);
    println!("  Max pages per category: {}", config.crawler.max_pages);
    println!("  Download delay: {}ms", config.crawler.download_delay);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Feed: {}", config.output.items_path);

    let seeds = load_seeds(Path::new(&config.input.seed_path))?;
    println!("\nCategories ({}):", seeds.len());
    for seed in &seeds {
        println!(
            "  - {} -> {}",
            seed.slug,
            category_listing_url(&locality, &seed.slug, 1, config.crawler.per_page)
        );
    }
    println!(
        "\nProduct details are fetched from e.g. {}",
        product_detail_url(&locality, "<slug>")
    );

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} categories", seeds.len());

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling city {} from {} into {}",
        config.site.city_uuid,
        config.input.seed_path,
        config.output.items_path
    );

    let mut coordinator = Coordinator::new(config)?.with_config_hash(config_hash);

    match coordinator.run().await {
        Ok(stats) => {
            if !quiet {
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
