//! CLI entry point for the listing-mirror tool.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use listing_mirror::{
    CrawlConfig, CrawlStats, Crawler, CsvSkipLedger, MemorySkipLedger, SkipLedger,
    read_skip_ledger, remove_skip_ledger, resolve_default_config_path,
};
use tracing::{debug, info};

mod cli;
mod exit;

use cli::Args;
use exit::determine_exit_outcome;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = load_config(&args)?;
    debug!(?config, "configuration resolved");

    let retry_entries = if args.retry_skipped {
        let entries = read_skip_ledger(&config.skip_ledger).with_context(|| {
            format!("failed to read skip ledger {}", config.skip_ledger.display())
        })?;
        if !args.dry_run {
            remove_skip_ledger(&config.skip_ledger).with_context(|| {
                format!("failed to reset skip ledger {}", config.skip_ledger.display())
            })?;
        }
        Some(entries)
    } else {
        None
    };

    // A dry-run retry keeps the old ledger, so new failures must not land in it.
    let csv_ledger = (!(args.retry_skipped && args.dry_run))
        .then(|| Arc::new(CsvSkipLedger::new(config.skip_ledger.clone())));
    let ledger: Arc<dyn SkipLedger> = match &csv_ledger {
        Some(csv) => Arc::clone(csv) as Arc<dyn SkipLedger>,
        None => Arc::new(MemorySkipLedger::new()),
    };
    let mut crawler = Crawler::from_config(&config, ledger)
        .context("failed to initialize crawler")?
        .with_dry_run(args.dry_run);

    info!("Listing mirror starting");
    let stats = match retry_entries {
        Some(entries) => crawler.retry_skipped(entries).await.clone(),
        None => crawler.run().await.clone(),
    };

    info!(
        directories = stats.directories_visited,
        downloaded = stats.files_downloaded,
        failed = stats.failed(),
        "Crawl complete"
    );
    if !args.quiet {
        let ledger_path = csv_ledger.as_deref().map(CsvSkipLedger::path);
        print_summary(&stats, ledger_path, args.dry_run);
    }

    Ok(determine_exit_outcome(stats.completed(), stats.failed()).into())
}

/// Resolves defaults, then the config file, then CLI flags, and validates the result.
fn load_config(args: &Args) -> Result<CrawlConfig> {
    let mut config = if let Some(path) = &args.config {
        CrawlConfig::load(path).context("failed to load --config file")?
    } else if let Some(path) = resolve_default_config_path().filter(|path| path.is_file()) {
        debug!(path = %path.display(), "using default config file");
        CrawlConfig::load(&path).context("failed to load default config file")?
    } else {
        CrawlConfig::default()
    };

    args.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn print_summary(stats: &CrawlStats, ledger_path: Option<&Path>, dry_run: bool) {
    println!("Directories visited: {}", stats.directories_visited);
    println!("Directories failed:  {}", stats.directories_failed);
    if dry_run {
        println!("Files planned:       {}", stats.files_planned);
    } else {
        println!("Files downloaded:    {}", stats.files_downloaded);
        println!("Files failed:        {}", stats.files_failed);
    }
    println!("Cycles skipped:      {}", stats.cycles_skipped);
    println!("Manifests written:   {}", stats.manifests_written);
    if stats.failed() > 0 {
        match ledger_path {
            Some(path) => println!("Skipped entries recorded in {}", path.display()),
            None => println!("Skipped entries not recorded (dry run)"),
        }
    }
}
