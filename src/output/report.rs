//! Markdown report rendering

use crate::crawler::AuditOutcome;
use crate::output::ReportError;
use crate::storage::{StoredIssue, StoredPage, StoredRun};
use std::fmt::Write as _;
use std::path::Path;

/// Run provenance carried into the report header.
#[derive(Debug, Clone)]
pub struct RunMeta {
    pub config_hash: String,
    pub started_at: String,
    pub finished_at: String,
}

/// One page row of the report table.
#[derive(Debug, Clone)]
pub struct PageLine {
    pub url: String,
    pub resource_type: Option<String>,
    pub http_status: Option<u16>,
    pub fetch_error: Option<String>,
    pub title: Option<String>,
    pub incoming_internal_link_count: u32,
    pub blocked_by_robots: bool,
}

/// One issue line of the report.
#[derive(Debug, Clone)]
pub struct IssueLine {
    pub kind: String,
    pub message: String,
}

/// Render-ready view of a completed audit, buildable from a live outcome
/// or from stored rows, so `--export-report` and a fresh run share one
/// renderer.
#[derive(Debug, Clone)]
pub struct ReportData {
    pub seed_url: String,
    pub meta: RunMeta,
    pub pages: Vec<PageLine>,
    pub issues: Vec<IssueLine>,
    pub edge_count: u64,
}

impl ReportData {
    pub fn from_outcome(outcome: &AuditOutcome, meta: RunMeta) -> Self {
        Self {
            seed_url: outcome.seed_url.clone(),
            meta,
            pages: outcome
                .store
                .iter()
                .map(|record| PageLine {
                    url: record.url.clone(),
                    resource_type: record.resource_type.map(|t| {
                        match t {
                            crate::record::ResourceType::Page => "page",
                            crate::record::ResourceType::Resource => "resource",
                        }
                        .to_string()
                    }),
                    http_status: record.http_status,
                    fetch_error: record.fetch_error.map(|e| e.as_str().to_string()),
                    title: record.title.clone(),
                    incoming_internal_link_count: record.incoming_internal_link_count,
                    blocked_by_robots: record.blocked_by_robots,
                })
                .collect(),
            issues: outcome
                .issues
                .iter()
                .map(|issue| IssueLine {
                    kind: issue.kind().to_string(),
                    message: issue.message(),
                })
                .collect(),
            edge_count: outcome.graph.edge_count() as u64,
        }
    }

    pub fn from_stored(
        run: &StoredRun,
        pages: Vec<StoredPage>,
        issues: Vec<StoredIssue>,
        edge_count: u64,
    ) -> Self {
        Self {
            seed_url: run.seed_url.clone(),
            meta: RunMeta {
                config_hash: run.config_hash.clone(),
                started_at: run.started_at.clone(),
                finished_at: run.finished_at.clone(),
            },
            pages: pages
                .into_iter()
                .map(|page| PageLine {
                    url: page.url,
                    resource_type: page.resource_type,
                    http_status: page.http_status,
                    fetch_error: page.fetch_error,
                    title: page.title,
                    incoming_internal_link_count: page.incoming_internal_link_count,
                    blocked_by_robots: page.blocked_by_robots,
                })
                .collect(),
            issues: issues
                .into_iter()
                .map(|issue| IssueLine {
                    kind: issue.kind,
                    message: issue.message,
                })
                .collect(),
            edge_count,
        }
    }

    fn page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| p.resource_type.as_deref() == Some("page"))
            .count()
    }
}

/// Renders the full markdown report.
pub fn render_markdown(data: &ReportData) -> String {
    let mut out = String::new();

    // Writing into a String never fails; the fmt::Result is dropped.
    let _ = writeln!(out, "# Site Audit Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "- Site: {}", data.seed_url);
    let _ = writeln!(out, "- Started: {}", data.meta.started_at);
    let _ = writeln!(out, "- Finished: {}", data.meta.finished_at);
    let _ = writeln!(out, "- Config hash: `{}`", data.meta.config_hash);
    let _ = writeln!(out);
    let _ = writeln!(out, "## Summary");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Metric | Value |");
    let _ = writeln!(out, "|---|---|");
    let _ = writeln!(out, "| Records | {} |", data.pages.len());
    let _ = writeln!(out, "| Pages | {} |", data.page_count());
    let _ = writeln!(out, "| Internal link edges | {} |", data.edge_count);
    let _ = writeln!(out, "| Issues | {} |", data.issues.len());
    let _ = writeln!(out);

    let _ = writeln!(out, "## Issues");
    let _ = writeln!(out);
    if data.issues.is_empty() {
        let _ = writeln!(out, "No issues found.");
    } else {
        // One section per kind, in first-appearance order (which is check
        // declaration order).
        let mut kinds: Vec<&str> = Vec::new();
        for issue in &data.issues {
            if !kinds.contains(&issue.kind.as_str()) {
                kinds.push(&issue.kind);
            }
        }
        for kind in kinds {
            let of_kind: Vec<&IssueLine> =
                data.issues.iter().filter(|i| i.kind == kind).collect();
            let _ = writeln!(out, "### {} ({})", kind, of_kind.len());
            let _ = writeln!(out);
            for issue in of_kind {
                let _ = writeln!(out, "- {}", issue.message);
            }
            let _ = writeln!(out);
        }
    }

    let _ = writeln!(out, "## Pages");
    let _ = writeln!(out);
    let _ = writeln!(out, "| URL | Type | Status | Incoming | Title |");
    let _ = writeln!(out, "|---|---|---|---|---|");
    for page in &data.pages {
        let status = match (&page.http_status, &page.fetch_error, page.blocked_by_robots) {
            (_, _, true) => "robots".to_string(),
            (Some(code), _, _) => code.to_string(),
            (None, Some(error), _) => error.clone(),
            (None, None, _) => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            page.url,
            page.resource_type.as_deref().unwrap_or("-"),
            status,
            page.incoming_internal_link_count,
            page.title.as_deref().unwrap_or(""),
        );
    }

    out
}

/// Writes the markdown report to `path`.
pub fn write_markdown_report(path: &Path, data: &ReportData) -> Result<(), ReportError> {
    std::fs::write(path, render_markdown(data))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> ReportData {
        ReportData {
            seed_url: "https://example.com/".to_string(),
            meta: RunMeta {
                config_hash: "abc123".to_string(),
                started_at: "2024-05-01T10:00:00Z".to_string(),
                finished_at: "2024-05-01T10:01:00Z".to_string(),
            },
            pages: vec![
                PageLine {
                    url: "https://example.com/".to_string(),
                    resource_type: Some("page".to_string()),
                    http_status: Some(200),
                    fetch_error: None,
                    title: Some("Home".to_string()),
                    incoming_internal_link_count: 1,
                    blocked_by_robots: false,
                },
                PageLine {
                    url: "https://example.com/a".to_string(),
                    resource_type: Some("page".to_string()),
                    http_status: Some(404),
                    fetch_error: None,
                    title: None,
                    incoming_internal_link_count: 1,
                    blocked_by_robots: false,
                },
                PageLine {
                    url: "https://example.com/style.css".to_string(),
                    resource_type: Some("resource".to_string()),
                    http_status: Some(200),
                    fetch_error: None,
                    title: None,
                    incoming_internal_link_count: 0,
                    blocked_by_robots: false,
                },
            ],
            issues: vec![
                IssueLine {
                    kind: "broken_page".to_string(),
                    message: "https://example.com/a returned HTTP 404".to_string(),
                },
                IssueLine {
                    kind: "broken_internal_link".to_string(),
                    message: "https://example.com/ links to https://example.com/a which returned HTTP 404"
                        .to_string(),
                },
            ],
            edge_count: 2,
        }
    }

    #[test]
    fn test_render_contains_header_and_counts() {
        let markdown = render_markdown(&sample_data());
        assert!(markdown.contains("# Site Audit Report"));
        assert!(markdown.contains("- Site: https://example.com/"));
        assert!(markdown.contains("| Records | 3 |"));
        assert!(markdown.contains("| Pages | 2 |"));
        assert!(markdown.contains("| Issues | 2 |"));
    }

    #[test]
    fn test_render_groups_issues_by_kind() {
        let markdown = render_markdown(&sample_data());
        assert!(markdown.contains("### broken_page (1)"));
        assert!(markdown.contains("### broken_internal_link (1)"));
        let broken = markdown.find("### broken_page").unwrap();
        let link = markdown.find("### broken_internal_link").unwrap();
        assert!(broken < link);
    }

    #[test]
    fn test_render_no_issues() {
        let mut data = sample_data();
        data.issues.clear();
        let markdown = render_markdown(&data);
        assert!(markdown.contains("No issues found."));
    }

    #[test]
    fn test_page_table_has_every_record() {
        let markdown = render_markdown(&sample_data());
        assert!(markdown.contains("| https://example.com/style.css | resource | 200 | 0 |"));
    }

    #[test]
    fn test_write_markdown_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        write_markdown_report(&path, &sample_data()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("# Site Audit Report"));
    }
}
