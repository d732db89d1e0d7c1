//! SQLite storage implementation

use crate::graph::LinkGraph;
use crate::record::PageStore;
use crate::rules::Issue;
use crate::storage::schema::SCHEMA_SQL;
use crate::storage::{StorageError, StorageResult, StoredIssue, StoredPage, StoredRun};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path` and applies the schema.
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// In-memory database, for tests.
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Persists a completed audit in one transaction and returns its run id.
    pub fn save_run(
        &mut self,
        seed_url: &str,
        config_hash: &str,
        started_at: &str,
        finished_at: &str,
        store: &PageStore,
        graph: &LinkGraph,
        issues: &[Issue],
    ) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO runs (seed_url, config_hash, started_at, finished_at, page_count, issue_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                seed_url,
                config_hash,
                started_at,
                finished_at,
                store.len() as i64,
                issues.len() as i64
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut insert_page = tx.prepare(
                "INSERT INTO pages (run_id, position, url, final_url, resource_type, http_status,
                                    redirect_chain, fetch_error, x_robots_tag, title, h1s,
                                    meta_description, meta_robots, incoming_internal_link_count,
                                    blocked_by_robots, blocked_by_robots_rule)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            )?;
            for (position, record) in store.iter().enumerate() {
                let resource_type = record.resource_type.map(|t| match t {
                    crate::record::ResourceType::Page => "page",
                    crate::record::ResourceType::Resource => "resource",
                });
                insert_page.execute(params![
                    run_id,
                    position as i64,
                    record.url,
                    record.final_url,
                    resource_type,
                    record.http_status,
                    serde_json::to_string(&record.redirect_chain)?,
                    record.fetch_error.map(|e| e.as_str()),
                    record.x_robots_tag,
                    record.title,
                    serde_json::to_string(&record.h1s)?,
                    record.meta_description,
                    record.meta_robots,
                    record.incoming_internal_link_count,
                    record.blocked_by_robots,
                    record.blocked_by_robots_rule,
                ])?;
            }

            let mut insert_link = tx.prepare(
                "INSERT OR IGNORE INTO links (run_id, source_url, target_url) VALUES (?1, ?2, ?3)",
            )?;
            for (source, targets) in graph.adjacency() {
                for target in targets {
                    insert_link.execute(params![run_id, source, target])?;
                }
            }

            let mut insert_issue = tx.prepare(
                "INSERT INTO issues (run_id, position, kind, url, message, evidence)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, issue) in issues.iter().enumerate() {
                insert_issue.execute(params![
                    run_id,
                    position as i64,
                    issue.kind(),
                    issue.primary_url(),
                    issue.message(),
                    serde_json::to_string(issue)?,
                ])?;
            }
        }

        tx.commit()?;
        tracing::debug!("Saved run {} ({} pages)", run_id, store.len());
        Ok(run_id)
    }

    /// The most recently stored run.
    pub fn latest_run(&self) -> StorageResult<StoredRun> {
        self.conn
            .query_row(
                "SELECT id, seed_url, config_hash, started_at, finished_at, page_count, issue_count
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(StoredRun {
                        id: row.get(0)?,
                        seed_url: row.get(1)?,
                        config_hash: row.get(2)?,
                        started_at: row.get(3)?,
                        finished_at: row.get(4)?,
                        page_count: row.get::<_, i64>(5)? as u64,
                        issue_count: row.get::<_, i64>(6)? as u64,
                    })
                },
            )
            .optional()?
            .ok_or(StorageError::NoRuns)
    }

    /// Page rows of a run, in discovery order.
    pub fn run_pages(&self, run_id: i64) -> StorageResult<Vec<StoredPage>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, final_url, resource_type, http_status, redirect_chain, fetch_error,
                    title, incoming_internal_link_count, blocked_by_robots
             FROM pages WHERE run_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map([run_id], |row| {
            let chain_json: String = row.get(4)?;
            Ok(StoredPage {
                url: row.get(0)?,
                final_url: row.get(1)?,
                resource_type: row.get(2)?,
                http_status: row.get(3)?,
                redirect_hops: serde_json::from_str::<Vec<String>>(&chain_json)
                    .map(|chain| chain.len() as u32)
                    .unwrap_or(0),
                fetch_error: row.get(5)?,
                title: row.get(6)?,
                incoming_internal_link_count: row.get(7)?,
                blocked_by_robots: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Issue rows of a run, in evaluation order.
    pub fn run_issues(&self, run_id: i64) -> StorageResult<Vec<StoredIssue>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, url, message, evidence FROM issues WHERE run_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map([run_id], |row| {
            Ok(StoredIssue {
                kind: row.get(0)?,
                url: row.get(1)?,
                message: row.get(2)?,
                evidence: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Issue counts per kind for a run, most frequent first.
    pub fn issue_counts_by_kind(&self, run_id: i64) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, COUNT(*) FROM issues WHERE run_id = ?1
             GROUP BY kind ORDER BY COUNT(*) DESC, kind",
        )?;
        let rows = stmt.query_map([run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Number of link graph edges stored for a run.
    pub fn link_count(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM links WHERE run_id = ?1",
            [run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
