//! Optional AI classification stage
//!
//! Entirely supplementary: it reads the content-region anchor/destination
//! pairs collected during the crawl and asks a classifier collaborator, in
//! fixed-size batches, whether each anchor matches its destination or the
//! destination reads like a soft error page. The stage only ever adds
//! issues; disabling it changes nothing else about an audit.

mod http;
mod pool;

pub use http::HttpClassifier;
pub use pool::{classify_content_links, run_batches};

use crate::record::ContentLink;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// One item sent to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorCandidate {
    pub source_url: String,
    pub destination_url: String,
    pub anchor_text: String,
}

impl From<&ContentLink> for AnchorCandidate {
    fn from(link: &ContentLink) -> Self {
        Self {
            source_url: link.source_url.clone(),
            destination_url: link.destination_url.clone(),
            anchor_text: link.anchor_text.clone(),
        }
    }
}

/// Per-item classifier verdict.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Verdict {
    #[serde(default)]
    pub is_mismatch: bool,
    #[serde(default)]
    pub is_soft_404: bool,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub explanation: String,
}

/// Future type returned by classifier calls.
pub type ClassifyFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<Vec<Verdict>, String>> + Send + 'a>>;

/// Batch classification collaborator.
///
/// A call receives one batch and must return one verdict per item, in
/// order. Any error (or a length mismatch, which the pool treats as an
/// error) degrades that batch to zero results; other batches are
/// unaffected.
pub trait Classifier: Send + Sync {
    fn classify<'a>(&'a self, batch: &'a [AnchorCandidate]) -> ClassifyFuture<'a>;
}
