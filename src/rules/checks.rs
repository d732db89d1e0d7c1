//! The deterministic checks
//!
//! Each function is one predicate from the audit battery. Discovery order
//! within a check follows page store order (BFS discovery order); the
//! sitemap check sorts its set for a stable order.

use crate::rules::issue::{Issue, NoindexSource};
use crate::rules::AuditArtifacts;
use std::collections::{HashMap, HashSet};

/// Any record whose terminal status is an HTTP error. Resources included:
/// a broken stylesheet is still a broken fetch.
pub fn broken_pages(artifacts: &AuditArtifacts) -> Vec<Issue> {
    artifacts
        .store
        .iter()
        .filter_map(|record| match record.http_status {
            Some(status) if status >= 400 => Some(Issue::BrokenPage {
                url: record.url.clone(),
                http_status: status,
            }),
            _ => None,
        })
        .collect()
}

/// A page links to a target whose own record came back as an HTTP error.
pub fn broken_internal_links(artifacts: &AuditArtifacts) -> Vec<Issue> {
    let mut issues = Vec::new();
    for record in artifacts.store.iter() {
        for target in &record.internal_outgoing_links {
            let Some(target_record) = artifacts.store.get(target) else {
                continue;
            };
            if let Some(status) = target_record.http_status {
                if status >= 400 {
                    issues.push(Issue::BrokenInternalLink {
                        source_url: record.url.clone(),
                        target_url: target.clone(),
                        target_status: status,
                    });
                }
            }
        }
    }
    issues
}

/// More than one redirect hop before the terminal response.
pub fn redirect_chains(artifacts: &AuditArtifacts) -> Vec<Issue> {
    artifacts
        .store
        .iter()
        .filter(|record| record.redirect_chain.len() > 1)
        .map(|record| Issue::RedirectChain {
            url: record.url.clone(),
            redirect_chain: record.redirect_chain.clone(),
            final_url: record.final_url.clone(),
        })
        .collect()
}

/// The chain revisits a URL, or ends where it already passed through.
/// The crawler itself never looks for loops; this is where they surface.
pub fn redirect_loops(artifacts: &AuditArtifacts) -> Vec<Issue> {
    artifacts
        .store
        .iter()
        .filter(|record| {
            let chain = &record.redirect_chain;
            if chain.is_empty() {
                return false;
            }
            let mut seen = HashSet::new();
            let repeats = chain.iter().any(|hop| !seen.insert(hop.as_str()));
            repeats || chain.contains(&record.final_url)
        })
        .map(|record| Issue::RedirectLoop {
            url: record.url.clone(),
            redirect_chain: record.redirect_chain.clone(),
            final_url: record.final_url.clone(),
        })
        .collect()
}

pub fn blocked_by_robots(artifacts: &AuditArtifacts) -> Vec<Issue> {
    artifacts
        .store
        .iter()
        .filter(|record| record.blocked_by_robots)
        .map(|record| Issue::BlockedByRobots {
            url: record.url.clone(),
            rule: record.blocked_by_robots_rule.clone(),
        })
        .collect()
}

/// A noindex directive in either the robots meta tag or the X-Robots-Tag
/// header. The meta tag wins for evidence when both carry it.
pub fn noindex_pages(artifacts: &AuditArtifacts) -> Vec<Issue> {
    let mut issues = Vec::new();
    for record in artifacts.store.iter() {
        let meta = record
            .meta_robots
            .as_deref()
            .filter(|v| v.to_lowercase().contains("noindex"));
        let header = record
            .x_robots_tag
            .as_deref()
            .filter(|v| v.contains("noindex"));

        let (source, directive) = match (meta, header) {
            (Some(directive), _) => (NoindexSource::MetaRobots, directive),
            (None, Some(directive)) => (NoindexSource::XRobotsTag, directive),
            (None, None) => continue,
        };
        issues.push(Issue::NoindexPage {
            url: record.url.clone(),
            source,
            directive: directive.to_string(),
        });
    }
    issues
}

/// Listed in the sitemap, absent from the crawl.
pub fn sitemap_orphans(artifacts: &AuditArtifacts) -> Vec<Issue> {
    let mut orphans: Vec<&String> = artifacts
        .sitemap_urls
        .iter()
        .filter(|url| !artifacts.store.contains(url))
        .collect();
    orphans.sort();
    orphans
        .into_iter()
        .map(|url| Issue::SitemapOrphan { url: url.clone() })
        .collect()
}

/// A reachable page nothing links to. The seed is exempt (it was reached
/// by definition, not by a link), as are robots-blocked records (they were
/// never parsed, so their absence from the graph proves nothing).
pub fn zero_incoming_links(artifacts: &AuditArtifacts) -> Vec<Issue> {
    artifacts
        .store
        .iter()
        .filter(|record| {
            record.is_page()
                && record.url != artifacts.seed_url
                && !record.blocked_by_robots
                && record.incoming_internal_link_count == 0
        })
        .map(|record| Issue::ZeroIncomingLinks {
            url: record.url.clone(),
        })
        .collect()
}

/// A healthy page that links to nothing internally: a dead end.
pub fn zero_outgoing_links(artifacts: &AuditArtifacts) -> Vec<Issue> {
    artifacts
        .store
        .iter()
        .filter(|record| record.is_ok_page() && record.internal_outgoing_links.is_empty())
        .map(|record| Issue::ZeroOutgoingLinks {
            url: record.url.clone(),
        })
        .collect()
}

pub fn missing_titles(artifacts: &AuditArtifacts) -> Vec<Issue> {
    artifacts
        .store
        .iter()
        .filter(|record| {
            record.is_ok_page()
                && record
                    .title
                    .as_deref()
                    .map(|t| t.trim().is_empty())
                    .unwrap_or(true)
        })
        .map(|record| Issue::MissingTitle {
            url: record.url.clone(),
        })
        .collect()
}

pub fn missing_h1s(artifacts: &AuditArtifacts) -> Vec<Issue> {
    artifacts
        .store
        .iter()
        .filter(|record| record.is_ok_page() && record.h1s.is_empty())
        .map(|record| Issue::MissingH1 {
            url: record.url.clone(),
        })
        .collect()
}

/// Groups healthy pages by identical non-empty title. One issue per
/// affected URL, each carrying the whole group.
pub fn duplicate_titles(artifacts: &AuditArtifacts) -> Vec<Issue> {
    let groups = group_by_value(artifacts, |record| record.title.as_deref());

    artifacts
        .store
        .iter()
        .filter(|record| record.is_ok_page())
        .filter_map(|record| {
            let title = record.title.as_deref()?;
            let group = groups.get(title)?;
            if group.len() < 2 {
                return None;
            }
            Some(Issue::DuplicateTitle {
                url: record.url.clone(),
                title: title.to_string(),
                shared_with: group.clone(),
            })
        })
        .collect()
}

/// Groups healthy pages by identical non-empty meta description. One issue
/// per group, listing every member. The shape difference from
/// duplicate_titles is deliberate and kept.
pub fn duplicate_meta_descriptions(artifacts: &AuditArtifacts) -> Vec<Issue> {
    let groups = group_by_value(artifacts, |record| record.meta_description.as_deref());

    let mut emitted: HashSet<&str> = HashSet::new();
    let mut issues = Vec::new();
    for record in artifacts.store.iter() {
        if !record.is_ok_page() {
            continue;
        }
        let Some(description) = record.meta_description.as_deref() else {
            continue;
        };
        let Some(group) = groups.get(description) else {
            continue;
        };
        if group.len() < 2 || !emitted.insert(description) {
            continue;
        }
        issues.push(Issue::DuplicateMetaDescription {
            meta_description: description.to_string(),
            urls: group.clone(),
        });
    }
    issues
}

pub fn multiple_h1s(artifacts: &AuditArtifacts) -> Vec<Issue> {
    artifacts
        .store
        .iter()
        .filter(|record| record.is_page() && record.h1s.len() > 1)
        .map(|record| Issue::MultipleH1 {
            url: record.url.clone(),
            count: record.h1s.len(),
        })
        .collect()
}

/// Buckets healthy pages by a non-empty metadata value, keeping store
/// order within each bucket.
fn group_by_value<'a>(
    artifacts: &'a AuditArtifacts,
    value: impl Fn(&'a crate::record::PageRecord) -> Option<&'a str>,
) -> HashMap<&'a str, Vec<String>> {
    let mut groups: HashMap<&str, Vec<String>> = HashMap::new();
    for record in artifacts.store.iter() {
        if !record.is_ok_page() {
            continue;
        }
        if let Some(v) = value(record) {
            if !v.trim().is_empty() {
                groups.entry(v).or_default().push(record.url.clone());
            }
        }
    }
    groups
}
