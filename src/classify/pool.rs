//! Bounded worker pool for batch classification
//!
//! A fixed number of tokio tasks drain fixed-size batches from a shared
//! queue. Each worker owns its result vec; the vecs are concatenated after
//! the join, so no shared mutable append target exists. A failed batch
//! degrades to zero results without touching other workers.

use crate::classify::{AnchorCandidate, Classifier, Verdict};
use crate::record::PageStore;
use crate::rules::Issue;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Runs the classification stage over every content link in the store and
/// turns the verdicts into supplementary issues.
pub async fn classify_content_links(
    classifier: Arc<dyn Classifier>,
    store: &PageStore,
    batch_size: usize,
    workers: usize,
) -> Vec<Issue> {
    let candidates: Vec<AnchorCandidate> = store
        .iter()
        .flat_map(|record| record.content_internal_links.iter().map(AnchorCandidate::from))
        .collect();

    if candidates.is_empty() {
        return Vec::new();
    }

    let results = run_batches(classifier, candidates, batch_size, workers).await;

    let mut issues = Vec::new();
    for (candidate, verdict) in results {
        if verdict.is_mismatch {
            issues.push(Issue::AnchorMismatch {
                source_url: candidate.source_url.clone(),
                destination_url: candidate.destination_url.clone(),
                anchor_text: candidate.anchor_text.clone(),
                confidence: verdict.confidence,
                explanation: verdict.explanation.clone(),
            });
        }
        if verdict.is_soft_404 {
            issues.push(Issue::SoftErrorPage {
                url: candidate.destination_url.clone(),
                confidence: verdict.confidence,
                explanation: verdict.explanation,
            });
        }
    }
    issues
}

/// Drains `candidates` through the classifier with a bounded worker pool.
///
/// Returns each candidate paired with its verdict, in completion order.
/// Candidates from failed batches are absent from the result.
pub async fn run_batches(
    classifier: Arc<dyn Classifier>,
    candidates: Vec<AnchorCandidate>,
    batch_size: usize,
    workers: usize,
) -> Vec<(AnchorCandidate, Verdict)> {
    let batch_size = batch_size.max(1);
    let workers = workers.max(1);

    let batches: VecDeque<Vec<AnchorCandidate>> = candidates
        .chunks(batch_size)
        .map(|chunk| chunk.to_vec())
        .collect();
    let queue = Arc::new(Mutex::new(batches));

    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let queue = Arc::clone(&queue);
        let classifier = Arc::clone(&classifier);

        handles.push(tokio::spawn(async move {
            // Per-worker results; merged only after the join.
            let mut results: Vec<(AnchorCandidate, Verdict)> = Vec::new();

            loop {
                let batch = {
                    let mut queue = queue.lock().expect("classify queue poisoned");
                    queue.pop_front()
                };
                let Some(batch) = batch else { break };

                match classifier.classify(&batch).await {
                    Ok(verdicts) if verdicts.len() == batch.len() => {
                        results.extend(batch.into_iter().zip(verdicts));
                    }
                    Ok(verdicts) => {
                        tracing::warn!(
                            "Worker {}: classifier returned {} verdicts for {} items, dropping batch",
                            worker_id,
                            verdicts.len(),
                            batch.len()
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Worker {}: classification batch of {} failed: {}",
                            worker_id,
                            batch.len(),
                            e
                        );
                    }
                }
            }

            results
        }));
    }

    let mut merged = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(results) => merged.extend(results),
            Err(e) => tracing::warn!("Classification worker panicked: {}", e),
        }
    }
    merged
}
