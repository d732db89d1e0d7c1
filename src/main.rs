//! Linkledger main entry point
//!
//! Command-line interface for the site audit crawler.

use clap::Parser;
use linkledger::classify::{Classifier, HttpClassifier};
use linkledger::config::load_config_with_hash;
use linkledger::crawler::run_audit_with_classifier;
use linkledger::output::{
    load_stats, print_stats, write_json_artifact, write_markdown_report, ReportData, RunMeta,
};
use linkledger::storage::SqliteStorage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Linkledger: crawl a site, map its internal links, and audit the result
///
/// Crawls one origin breadth-first, builds the internal link graph, and
/// evaluates a fixed rule set over the pages and the graph to surface
/// broken pages, redirect pathologies, orphaned content, and missing
/// metadata.
#[derive(Parser, Debug)]
#[command(name = "linkledger")]
#[command(version)]
#[command(about = "Site audit crawler", long_about = None)]
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

    /// Validate config and show the audit plan without crawling
    #[arg(long, conflicts_with_all = ["stats", "export_report"])]
    dry_run: bool,

    /// Show statistics for the latest stored run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_report"])]
    stats: bool,

    /// Regenerate the markdown report from the latest stored run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_report: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_report {
        handle_export_report(&config)?;
    } else {
        handle_audit(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkledger=info,warn"),
            1 => EnvFilter::new("linkledger=debug,info"),
            2 => EnvFilter::new("linkledger=trace,debug"),
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

/// Handles --dry-run: validates config and shows what would be audited
fn handle_dry_run(config: &linkledger::Config) {
    println!("=== Linkledger Dry Run ===\n");

    println!("Site:");
    println!("  URL: {}", config.site.url);

    println!("\nCrawler:");
    println!("  Page budget: {}", config.crawler.page_budget);
    println!("  Max redirect hops: {}", config.crawler.max_redirect_hops);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!("  Sitemap depth: {}", config.crawler.sitemap_depth);

    println!("\nUser agent: {}", config.user_agent.format());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Report: {}", config.output.report_path);
    if let Some(json_path) = &config.output.json_path {
        println!("  JSON artifact: {}", json_path);
    }

    println!(
        "\nClassifier: {}",
        if config.classifier.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    println!("\n✓ Configuration is valid");
}

/// Handles --stats: prints statistics for the latest stored run
fn handle_stats(config: &linkledger::Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_stats(&storage)?;
    print_stats(&stats);

    Ok(())
}

/// Handles --export-report: regenerates the markdown report from storage
fn handle_export_report(config: &linkledger::Config) -> anyhow::Result<()> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let run = storage.latest_run()?;
    let pages = storage.run_pages(run.id)?;
    let issues = storage.run_issues(run.id)?;
    let edge_count = storage.link_count(run.id)?;

    let data = ReportData::from_stored(&run, pages, issues, edge_count);
    write_markdown_report(Path::new(&config.output.report_path), &data)?;

    println!("✓ Report exported to: {}", config.output.report_path);
    Ok(())
}

/// Handles the main audit operation
async fn handle_audit(config: linkledger::Config, config_hash: String) -> anyhow::Result<()> {
    let started_at = chrono::Utc::now().to_rfc3339();

    let classifier: Option<Arc<dyn Classifier>> = match (
        config.classifier.enabled,
        config.classifier.endpoint.clone(),
    ) {
        (true, Some(endpoint)) => {
            tracing::info!("Classification stage enabled against {}", endpoint);
            Some(Arc::new(HttpClassifier::new(
                reqwest::Client::new(),
                endpoint,
            )))
        }
        _ => None,
    };

    let outcome = run_audit_with_classifier(&config, classifier).await?;
    let finished_at = chrono::Utc::now().to_rfc3339();

    let meta = RunMeta {
        config_hash: config_hash.clone(),
        started_at: started_at.clone(),
        finished_at: finished_at.clone(),
    };

    // Persist the run.
    let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let run_id = storage.save_run(
        &outcome.seed_url,
        &config_hash,
        &started_at,
        &finished_at,
        &outcome.store,
        &outcome.graph,
        &outcome.issues,
    )?;
    tracing::info!("Audit stored as run {}", run_id);

    // Write the reports.
    let data = ReportData::from_outcome(&outcome, meta.clone());
    write_markdown_report(Path::new(&config.output.report_path), &data)?;
    if let Some(json_path) = &config.output.json_path {
        write_json_artifact(Path::new(json_path), &outcome, &meta)?;
    }

    println!(
        "✓ Audited {} ({} records, {} issues)",
        outcome.seed_url,
        outcome.store.len(),
        outcome.issues.len()
    );
    println!("✓ Report written to: {}", config.output.report_path);

    Ok(())
}
