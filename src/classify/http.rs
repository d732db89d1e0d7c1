//! HTTP JSON classifier
//!
//! Reference classifier implementation: POSTs each batch as JSON to a
//! configured endpoint and reads per-item verdicts back. The endpoint
//! contract is one verdict per item, in order.

use crate::classify::{AnchorCandidate, Classifier, ClassifyFuture, Verdict};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    items: &'a [AnchorCandidate],
}

#[derive(Deserialize)]
struct ClassifyResponse {
    results: Vec<Verdict>,
}

pub struct HttpClassifier {
    client: Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Classifier for HttpClassifier {
    fn classify<'a>(&'a self, batch: &'a [AnchorCandidate]) -> ClassifyFuture<'a> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&ClassifyRequest { items: batch })
                .send()
                .await
                .map_err(|e| format!("request failed: {}", e))?;

            if !response.status().is_success() {
                return Err(format!("endpoint returned HTTP {}", response.status()));
            }

            let parsed: ClassifyResponse = response
                .json()
                .await
                .map_err(|e| format!("malformed response: {}", e))?;

            Ok(parsed.results)
        })
    }
}
