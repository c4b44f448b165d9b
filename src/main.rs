//! Feed Locator main entry point
//!
//! This is the command-line interface for the Feed Locator.

use anyhow::{Context, Result};
use clap::Parser;
use feed_locator::config::{load_config_with_hash, validate, Config};
use feed_locator::crawler::{HttpTransport, Scheduler};
use feed_locator::output::{render, write_report, OutputFormat};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Feed Locator: an ultraliberal syndication feed locator
///
/// Starting from a web address, Feed Locator finds the RSS, Atom, RDF and
/// JSON feeds it links to, through autodiscovery markers and feed-looking
/// links on the same site.
#[derive(Parser, Debug)]
#[command(name = "feed-locator")]
#[command(version)]
#[command(about = "An ultraliberal syndication feed locator", long_about = None)]
struct Cli {
    /// Web address to start from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of concurrent fetches (overrides the config file)
    #[arg(short, long, value_name = "N")]
    concurrency: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Validate the configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let source = Url::parse(&cli.url).with_context(|| format!("Invalid URL: {}", cli.url))?;
    let config = load_effective_config(&cli)?;

    if cli.dry_run {
        print_dry_run(&config, &source);
        return Ok(());
    }

    let transport = HttpTransport::new(&config.http, &config.user_agent)
        .context("Failed to build HTTP client")?;
    let scheduler = Scheduler::from_config(Arc::new(transport), &config);

    // Stop admitting new fetches on Ctrl-C and report what was found so far
    let token = scheduler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing up");
            token.cancel();
        }
    });

    let report = scheduler.run(source.as_str()).await;

    let rendered = render(&report, cli.format);
    write_report(&rendered, cli.output.as_deref()).context("Failed to write report")?;

    if let Some(path) = &cli.output {
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("feed_locator=info,warn"),
            1 => EnvFilter::new("feed_locator=debug,info"),
            2 => EnvFilter::new("feed_locator=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file, if any, and applies command-line overrides
fn load_effective_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
        validate(&config).context("Invalid --concurrency")?;
    }

    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config, source: &Url) {
    println!("=== Feed Locator Dry Run ===\n");

    println!("Source: {}", source);

    println!("\nCrawler:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Known hosts: {}", config.crawler.known_hosts);

    println!("\nRetry:");
    println!("  Max retries: {}", config.retry.max_retries);
    println!(
        "  Backoff: {}ms base, {}ms ceiling",
        config.retry.base_delay_ms, config.retry.max_delay_ms
    );

    println!("\nHTTP:");
    println!(
        "  Timeouts: {}s connect, {}s total",
        config.http.connect_timeout_secs, config.http.timeout_secs
    );
    println!("  Max redirects: {}", config.http.max_redirects);
    println!("  Cookies: {}", config.http.cookies);
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}
