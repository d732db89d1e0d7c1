//! JSON artifact export
//!
//! Writes the machine-readable audit artifact: the flat issue list, the
//! page record list, and the raw link graph as an adjacency map from
//! canonical source URL to its target list.

use crate::crawler::AuditOutcome;
use crate::output::{ReportError, RunMeta};
use crate::record::PageRecord;
use crate::rules::Issue;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Serialize)]
struct JsonArtifact<'a> {
    seed_url: &'a str,
    config_hash: &'a str,
    started_at: &'a str,
    finished_at: &'a str,
    issues: &'a [Issue],
    pages: Vec<&'a PageRecord>,
    link_graph: BTreeMap<&'a str, Vec<&'a str>>,
}

/// Serializes the audit outcome to `path` as pretty-printed JSON.
pub fn write_json_artifact(
    path: &Path,
    outcome: &AuditOutcome,
    meta: &RunMeta,
) -> Result<(), ReportError> {
    let link_graph: BTreeMap<&str, Vec<&str>> = outcome
        .graph
        .adjacency()
        .iter()
        .map(|(source, targets)| {
            (
                source.as_str(),
                targets.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    let artifact = JsonArtifact {
        seed_url: &outcome.seed_url,
        config_hash: &meta.config_hash,
        started_at: &meta.started_at,
        finished_at: &meta.finished_at,
        issues: &outcome.issues,
        pages: outcome.store.iter().collect(),
        link_graph,
    };

    let json = serde_json::to_string_pretty(&artifact)?;
    std::fs::write(path, json)?;
    Ok(())
}
