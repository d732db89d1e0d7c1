//! Crawl engine - the breadth-first traversal state machine
//!
//! Owns the frontier queue, visited set, page record store, and link graph
//! for one audit run. Traversal is single-threaded and sequential: exactly
//! one fetch is in flight at a time, and record creation order is BFS
//! discovery order. The queue and visited set have no other writer, which
//! is why no locking exists here; that single-writer invariant must hold
//! for any change to this module.

use crate::config::{CrawlerConfig, PageBudget};
use crate::crawler::fetcher::{fetch_with_redirects, FetchOutcome};
use crate::crawler::parser::parse_document;
use crate::graph::LinkGraph;
use crate::record::{PageRecord, PageStore, ResourceType};
use crate::robots::RobotsRuleset;
use crate::url::Canonicalizer;
use crate::AuditError;
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Artifacts of a completed traversal.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub store: PageStore,
    pub graph: LinkGraph,
}

/// The crawl engine. One instance per audit run, owning all traversal
/// state end-to-end.
pub struct CrawlEngine {
    client: Client,
    canonicalizer: Canonicalizer,
    robots: RobotsRuleset,
    page_budget: PageBudget,
    max_redirects: u32,

    queue: VecDeque<String>,
    /// Set-based index of what sits in the queue, so enqueue checks do not
    /// scan the queue linearly.
    queued: HashSet<String>,
    visited: HashSet<String>,
    store: PageStore,
    graph: LinkGraph,
    pages_crawled: u64,
}

impl CrawlEngine {
    pub fn new(
        client: Client,
        canonicalizer: Canonicalizer,
        robots: RobotsRuleset,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            client,
            canonicalizer,
            robots,
            page_budget: config.page_budget,
            max_redirects: config.max_redirect_hops,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            store: PageStore::new(),
            graph: LinkGraph::new(),
            pages_crawled: 0,
        }
    }

    /// Runs the traversal from `seed` until the queue drains or the page
    /// budget is reached.
    ///
    /// The seed is canonicalized like every discovered link, so the store,
    /// visited set, and graph all speak canonical URLs.
    pub async fn run(mut self, seed: &str) -> Result<CrawlOutcome, AuditError> {
        let seed_canonical = self
            .canonicalizer
            .canonicalize(seed)
            .ok_or_else(|| AuditError::InvalidSeed(seed.to_string()))?;

        tracing::info!("Starting crawl from {}", seed_canonical);
        self.enqueue(seed_canonical);

        loop {
            if self.page_budget.is_reached(self.pages_crawled) {
                tracing::info!(
                    "Page budget reached after {} pages, stopping",
                    self.pages_crawled
                );
                break;
            }

            let Some(url) = self.queue.pop_front() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };
            self.queued.remove(&url);

            // Mark visited before any processing so a URL re-queued through
            // another path is skipped, never fetched twice.
            if !self.visited.insert(url.clone()) {
                continue;
            }

            self.process_url(&url).await;

            if self.store.len() % 25 == 0 {
                tracing::debug!(
                    "Progress: {} records, {} pages, {} in frontier",
                    self.store.len(),
                    self.pages_crawled,
                    self.queue.len()
                );
            }
        }

        Ok(CrawlOutcome {
            store: self.store,
            graph: self.graph,
        })
    }

    /// Processes a single dequeued URL: robots gate, fetch with redirects,
    /// classification, parsing, and edge recording.
    async fn process_url(&mut self, url: &str) {
        let mut record = PageRecord::new(url);

        // Robots-denied URLs are recorded as pages, count toward the
        // budget, and are never fetched or parsed: no outgoing edges can
        // originate from a blocked page.
        if !self.robots.is_allowed(url) {
            tracing::debug!("URL {} disallowed by robots.txt", url);
            record.blocked_by_robots = true;
            record.blocked_by_robots_rule = self.robots.disallow_rule(url);
            record.resource_type = Some(ResourceType::Page);
            self.pages_crawled += 1;
            self.store.insert(record);
            return;
        }

        match fetch_with_redirects(&self.client, url, self.max_redirects).await {
            FetchOutcome::Failed {
                error,
                final_url,
                redirect_chain,
            } => {
                tracing::debug!("Fetch failed for {}: {}", url, error);
                record.fetch_error = Some(error);
                record.final_url = final_url;
                record.redirect_chain = redirect_chain;
                record.resource_type = Some(ResourceType::Page);
                self.pages_crawled += 1;
                self.store.insert(record);
            }

            FetchOutcome::Response {
                final_url,
                status,
                headers,
                body,
                redirect_chain,
            } => {
                record.final_url = final_url;
                record.http_status = Some(status);
                record.redirect_chain = redirect_chain;
                record.x_robots_tag = headers.get("x-robots-tag").map(|v| v.to_lowercase());

                let is_html = headers
                    .get("content-type")
                    .map(|ct| ct.contains("text/html"))
                    .unwrap_or(false);
                record.headers = headers;

                if is_html {
                    record.resource_type = Some(ResourceType::Page);
                    self.pages_crawled += 1;
                    if let Some(body) = body {
                        self.parse_into_record(&mut record, &body);
                    }
                } else {
                    // Non-HTML responses are recorded but free: they do not
                    // count toward the page budget and are never parsed.
                    record.resource_type = Some(ResourceType::Resource);
                }

                self.store.insert(record);
            }
        }
    }

    /// Parses an HTML body, fills in the record's metadata and link lists,
    /// and records graph edges / frontier entries for internal targets.
    fn parse_into_record(&mut self, record: &mut PageRecord, body: &str) {
        let base = match Url::parse(&record.final_url) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Unparseable final URL {}: {}", record.final_url, e);
                return;
            }
        };

        let parsed = parse_document(body, &base, &self.canonicalizer);
        record.title = parsed.title;
        record.h1s = parsed.h1s;
        record.meta_robots = parsed.meta_robots;
        record.meta_description = parsed.meta_description;
        record.content_internal_links = parsed.content_links;
        for link in &mut record.content_internal_links {
            link.source_url = record.url.clone();
        }

        for link in parsed.links {
            match (link.is_internal, link.normalized) {
                (true, Some(target)) => {
                    if !record.internal_outgoing_links.contains(&target) {
                        record.internal_outgoing_links.push(target.clone());
                    }
                    self.graph.add_edge(&record.url, &target);
                    self.enqueue(target);
                }
                _ => {
                    record.external_outgoing_links.push(link.original);
                }
            }
        }
    }

    /// Adds a canonical URL to the frontier unless it was already visited,
    /// queued, or recorded.
    fn enqueue(&mut self, url: String) {
        if self.visited.contains(&url) || self.queued.contains(&url) || self.store.contains(&url) {
            return;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
    }
}
