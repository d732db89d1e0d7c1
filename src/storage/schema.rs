//! Database schema definitions
//!
//! All SQL schema for the audit database lives here.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Completed audit runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL,
    page_count INTEGER NOT NULL,
    issue_count INTEGER NOT NULL
);

-- Page records, one row per distinct URL visited in a run
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    final_url TEXT NOT NULL,
    resource_type TEXT,
    http_status INTEGER,
    redirect_chain TEXT NOT NULL,
    fetch_error TEXT,
    x_robots_tag TEXT,
    title TEXT,
    h1s TEXT NOT NULL,
    meta_description TEXT,
    meta_robots TEXT,
    incoming_internal_link_count INTEGER NOT NULL,
    blocked_by_robots INTEGER NOT NULL,
    blocked_by_robots_rule TEXT,
    UNIQUE(run_id, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_run ON pages(run_id);
CREATE INDEX IF NOT EXISTS idx_pages_status ON pages(http_status);

-- Link graph edges
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    source_url TEXT NOT NULL,
    target_url TEXT NOT NULL,
    UNIQUE(run_id, source_url, target_url)
);

CREATE INDEX IF NOT EXISTS idx_links_run ON links(run_id);
CREATE INDEX IF NOT EXISTS idx_links_target ON links(target_url);

-- Issues found by the rule evaluation engine
CREATE TABLE IF NOT EXISTS issues (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    kind TEXT NOT NULL,
    url TEXT NOT NULL,
    message TEXT NOT NULL,
    evidence TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_issues_run ON issues(run_id);
CREATE INDEX IF NOT EXISTS idx_issues_kind ON issues(kind);
"#;
