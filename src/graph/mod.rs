//! Directed internal-link graph
//!
//! Maps each source canonical URL to the set of distinct canonical URLs it
//! links to. Duplicate same-page links to one target collapse to a single
//! edge, so incoming counts reflect distinct linking pages rather than raw
//! anchor counts. Built edge by edge during traversal, read-only afterward.

use crate::record::PageStore;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a directed edge `source -> target`. Repeated edges collapse.
    pub fn add_edge(&mut self, source: &str, target: &str) {
        self.edges
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string());
    }

    /// Distinct targets linked from `source`.
    pub fn targets(&self, source: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(source)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .get(source)
            .map(|targets| targets.contains(target))
            .unwrap_or(false)
    }

    /// Adjacency map view: source URL to its distinct targets.
    pub fn adjacency(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|targets| targets.len()).sum()
    }

    /// Counts distinct linking sources per target.
    pub fn incoming_counts(&self) -> HashMap<String, u32> {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for targets in self.edges.values() {
            for target in targets {
                *counts.entry(target.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Post-traversal pass: sets `incoming_internal_link_count` on every page
/// record from the recorded edge list.
///
/// Operates purely on the immutable edges, never on the queue or visited
/// set, so the result is deterministic and independent of traversal order.
/// Non-page records always get 0.
pub fn apply_incoming_counts(graph: &LinkGraph, store: &mut PageStore) {
    let counts = graph.incoming_counts();
    for record in store.iter_mut() {
        record.incoming_internal_link_count = if record.is_page() {
            counts.get(&record.url).copied().unwrap_or(0)
        } else {
            0
        };
    }
}
