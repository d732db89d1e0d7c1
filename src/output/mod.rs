//! Report output
//!
//! Renders a completed audit (live or loaded from storage) as a markdown
//! report, a JSON artifact, and console statistics. The audit core only
//! produces data; everything user-facing lives here.

mod json;
mod report;
mod stats;

pub use json::write_json_artifact;
pub use report::{write_markdown_report, IssueLine, PageLine, ReportData, RunMeta};
pub use stats::{load_stats, print_stats, RunStats};

use thiserror::Error;

/// Errors that can occur while producing reports
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
