//! SQLite run ledger.
//!
//! RULE: Only the store talks to the database.
//! The pipeline calls store methods and never executes SQL directly.

use crate::error::MetricResult;
use rusqlite::{params, Connection, OptionalExtension};

mod derived;
mod rollup;

pub struct MetricsStore {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub run_id: String,
    pub seed: u64,
    pub version: String,
    pub source: String,
    pub created_at: String,
}

impl MetricsStore {
    pub fn open(path: &str) -> MetricResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> MetricResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> MetricResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_metrics.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str, source: &str) -> MetricResult<()> {
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, source, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![run_id, seed as i64, version, source, created_at],
        )?;
        Ok(())
    }

    pub fn run(&self, run_id: &str) -> MetricResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT run_id, seed, version, source, created_at FROM run WHERE run_id = ?1",
                params![run_id],
                |row| {
                    Ok(RunRecord {
                        run_id: row.get(0)?,
                        seed: row.get::<_, i64>(1)? as u64,
                        version: row.get(2)?,
                        source: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(run)
    }

    pub fn run_count(&self) -> MetricResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM run", [], |row| row.get(0))?;
        Ok(n)
    }
}
