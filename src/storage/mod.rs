//! Storage module for persisting audit data
//!
//! Persists completed audits to SQLite: run metadata, page records, link
//! graph edges, and the issue list. The stats and export-report CLI modes
//! read back from here.

mod schema;
mod sqlite;

pub use sqlite::SqliteStorage;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No completed runs in the database")]
    NoRuns,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A persisted audit run
#[derive(Debug, Clone)]
pub struct StoredRun {
    pub id: i64,
    pub seed_url: String,
    pub config_hash: String,
    pub started_at: String,
    pub finished_at: String,
    pub page_count: u64,
    pub issue_count: u64,
}

/// A persisted page record row
#[derive(Debug, Clone)]
pub struct StoredPage {
    pub url: String,
    pub final_url: String,
    pub resource_type: Option<String>,
    pub http_status: Option<u16>,
    pub redirect_hops: u32,
    pub fetch_error: Option<String>,
    pub title: Option<String>,
    pub incoming_internal_link_count: u32,
    pub blocked_by_robots: bool,
}

/// A persisted issue row
#[derive(Debug, Clone)]
pub struct StoredIssue {
    pub kind: String,
    pub url: String,
    pub message: String,
    /// The issue's full typed payload, serialized as JSON.
    pub evidence: String,
}
