//! Console statistics for stored runs

use crate::storage::{SqliteStorage, StorageResult};

/// Aggregate statistics of the most recent stored run.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub run_id: i64,
    pub seed_url: String,
    pub started_at: String,
    pub finished_at: String,
    pub record_count: u64,
    pub issue_count: u64,
    pub edge_count: u64,
    pub issues_by_kind: Vec<(String, u64)>,
}

/// Loads statistics for the latest run in the database.
pub fn load_stats(storage: &SqliteStorage) -> StorageResult<RunStats> {
    let run = storage.latest_run()?;
    let issues_by_kind = storage.issue_counts_by_kind(run.id)?;
    let edge_count = storage.link_count(run.id)?;

    Ok(RunStats {
        run_id: run.id,
        seed_url: run.seed_url,
        started_at: run.started_at,
        finished_at: run.finished_at,
        record_count: run.page_count,
        issue_count: run.issue_count,
        edge_count,
        issues_by_kind,
    })
}

/// Prints statistics to the console.
pub fn print_stats(stats: &RunStats) {
    println!("Run {} for {}", stats.run_id, stats.seed_url);
    println!("  Started:  {}", stats.started_at);
    println!("  Finished: {}", stats.finished_at);
    println!();
    println!("  Records: {}", stats.record_count);
    println!("  Link edges: {}", stats.edge_count);
    println!("  Issues: {}", stats.issue_count);

    if !stats.issues_by_kind.is_empty() {
        println!();
        println!("  Issues by kind:");
        for (kind, count) in &stats.issues_by_kind {
            println!("    {:<28} {}", kind, count);
        }
    }
}
