//! Rule evaluation engine
//!
//! A fixed, ordered list of independent checks over the completed crawl
//! artifacts. Every check is total and side-effect-free: it reads the page
//! store, link graph, sitemap set, and robots ruleset, and appends zero or
//! more typed issues. All checks always run; the aggregate list is ordered
//! by check declaration order, then discovery order within a check.

mod checks;
mod issue;

pub use issue::{Issue, NoindexSource};

use crate::graph::LinkGraph;
use crate::record::PageStore;
use crate::robots::RobotsRuleset;
use std::collections::HashSet;

/// Read-only inputs shared by every check.
pub struct AuditArtifacts<'a> {
    pub store: &'a PageStore,
    pub graph: &'a LinkGraph,
    pub sitemap_urls: &'a HashSet<String>,
    pub robots: &'a RobotsRuleset,
    /// Canonical seed URL; the seed is exempt from the zero-incoming check.
    pub seed_url: &'a str,
}

type Check = fn(&AuditArtifacts) -> Vec<Issue>;

/// The battery, in declaration order. Order here is output order.
const CHECKS: &[(&str, Check)] = &[
    ("broken_page", checks::broken_pages),
    ("broken_internal_link", checks::broken_internal_links),
    ("redirect_chain", checks::redirect_chains),
    ("redirect_loop", checks::redirect_loops),
    ("blocked_by_robots", checks::blocked_by_robots),
    ("noindex_page", checks::noindex_pages),
    ("sitemap_orphan", checks::sitemap_orphans),
    ("zero_incoming_links", checks::zero_incoming_links),
    ("zero_outgoing_links", checks::zero_outgoing_links),
    ("missing_title", checks::missing_titles),
    ("missing_h1", checks::missing_h1s),
    ("duplicate_title", checks::duplicate_titles),
    ("duplicate_meta_description", checks::duplicate_meta_descriptions),
    ("multiple_h1", checks::multiple_h1s),
];

/// Runs every check and aggregates the issues into one ordered list.
pub fn evaluate(artifacts: &AuditArtifacts) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (name, check) in CHECKS {
        let found = check(artifacts);
        if !found.is_empty() {
            tracing::debug!("Check {} found {} issue(s)", name, found.len());
        }
        issues.extend(found);
    }
    issues
}
