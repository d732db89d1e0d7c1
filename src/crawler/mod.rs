//! Crawl orchestration
//!
//! Wires one audit run end-to-end: robots and sitemap up front, then the
//! breadth-first traversal, the incoming-link pass, the deterministic rule
//! checks, and finally the optional classification stage.

mod engine;
mod fetcher;
mod parser;
mod transport;

pub use engine::{CrawlEngine, CrawlOutcome};
pub use fetcher::{fetch_with_redirects, FetchOutcome};
pub use parser::{parse_document, ExtractedLink, ParsedDocument};
pub use transport::build_http_client;

use crate::classify::{classify_content_links, Classifier};
use crate::config::Config;
use crate::graph::{apply_incoming_counts, LinkGraph};
use crate::record::PageStore;
use crate::robots::{fetch_robots, RobotsRuleset};
use crate::rules::{evaluate, AuditArtifacts, Issue};
use crate::sitemap::fetch_sitemap_urls;
use crate::url::Canonicalizer;
use crate::{AuditError, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Everything a completed audit produced.
#[derive(Debug)]
pub struct AuditOutcome {
    pub seed_url: String,
    pub store: PageStore,
    pub graph: LinkGraph,
    pub sitemap_urls: HashSet<String>,
    pub robots: RobotsRuleset,
    pub issues: Vec<Issue>,
}

/// Runs a full audit per the configuration.
///
/// Per-URL failures are represented as data on the page records; the only
/// errors this function returns are unrecoverable ones (bad seed, client
/// construction), which abort the whole audit.
pub async fn run_audit(config: &Config) -> Result<AuditOutcome> {
    run_audit_with_classifier(config, None).await
}

/// Like [`run_audit`], with an explicit classifier for the supplementary
/// stage. `None` disables classification entirely; no core issue kind
/// changes either way.
pub async fn run_audit_with_classifier(
    config: &Config,
    classifier: Option<Arc<dyn Classifier>>,
) -> Result<AuditOutcome> {
    let seed = config.site.url.clone();
    let canonicalizer = Canonicalizer::new(&seed)?;
    let client = build_http_client(
        &config.user_agent.format(),
        config.crawler.request_timeout_secs,
    )?;

    let robots = fetch_robots(&client, canonicalizer.origin()).await;
    if robots.is_empty() {
        tracing::info!("No robots.txt rules for the wildcard agent");
    } else {
        tracing::info!(
            "robots.txt loaded with {} disallow rules",
            robots.disallow_rules().len()
        );
    }

    let sitemap_urls =
        fetch_sitemap_urls(&client, canonicalizer.origin(), config.crawler.sitemap_depth).await;
    tracing::info!("Sitemap listed {} URLs", sitemap_urls.len());

    let engine = CrawlEngine::new(client, canonicalizer, robots.clone(), &config.crawler);
    let CrawlOutcome { mut store, graph } = engine.run(&seed).await?;
    tracing::info!(
        "Crawl finished: {} records, {} graph edges",
        store.len(),
        graph.edge_count()
    );

    apply_incoming_counts(&graph, &mut store);

    let seed_canonical = crate::url::canonicalize(&seed, None)
        .ok_or_else(|| AuditError::InvalidSeed(seed.clone()))?;

    let artifacts = AuditArtifacts {
        store: &store,
        graph: &graph,
        sitemap_urls: &sitemap_urls,
        robots: &robots,
        seed_url: &seed_canonical,
    };
    let mut issues = evaluate(&artifacts);
    tracing::info!("Rule evaluation produced {} issues", issues.len());

    if let Some(classifier) = classifier {
        let supplementary = classify_content_links(
            classifier,
            &store,
            config.classifier.batch_size,
            config.classifier.workers,
        )
        .await;
        tracing::info!(
            "Classification stage produced {} issues",
            supplementary.len()
        );
        issues.extend(supplementary);
    }

    Ok(AuditOutcome {
        seed_url: seed_canonical,
        store,
        graph,
        sitemap_urls,
        robots,
        issues,
    })
}
