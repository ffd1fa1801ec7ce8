//! Embedded content store.
//!
//! One SQLite connection per run holds every entity the pipeline works on:
//!
//! ```text
//! source_type / resource_type   ordered (pattern, kind) bindings
//! source                        documents, text snapshot
//! resource                      assets, original + optimized bytes, depth
//! link1                         source   → resource edges
//! link2                         resource → resource edges
//! ```
//!
//! Every listing is ordered (path order for entities, insertion order for
//! edges), so runs are deterministic.

mod depth;
mod entity;
mod query;

pub use entity::{Counts, Dependency, Resource, Source};
#[cfg(test)]
pub use entity::Edge;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::analyzer::{ResourceKind, SourceKind};

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE source_type (
    id      INTEGER PRIMARY KEY,
    pattern TEXT NOT NULL,
    kind    TEXT NOT NULL
);

CREATE TABLE resource_type (
    id      INTEGER PRIMARY KEY,
    pattern TEXT NOT NULL,
    kind    TEXT NOT NULL
);

CREATE TABLE source (
    id      INTEGER PRIMARY KEY,
    path    TEXT NOT NULL UNIQUE,
    mtime   INTEGER NOT NULL,
    content TEXT NOT NULL,
    kind    TEXT NOT NULL
);

CREATE TABLE resource (
    id                INTEGER PRIMARY KEY,
    path              TEXT NOT NULL UNIQUE,
    mtime             INTEGER NOT NULL,
    content           BLOB NOT NULL,
    content_optimized BLOB,
    uri_optimized     TEXT,
    depth             INTEGER,
    kind              TEXT NOT NULL
);

CREATE TABLE link1 (
    id          INTEGER PRIMARY KEY,
    from_id     INTEGER NOT NULL REFERENCES source(id),
    to_id       INTEGER NOT NULL REFERENCES resource(id),
    line        INTEGER NOT NULL,
    byte_offset INTEGER NOT NULL,
    matched     TEXT NOT NULL,
    method      TEXT NOT NULL,
    metadata    TEXT NOT NULL
);

CREATE TABLE link2 (
    id          INTEGER PRIMARY KEY,
    from_id     INTEGER NOT NULL REFERENCES resource(id),
    to_id       INTEGER NOT NULL REFERENCES resource(id),
    line        INTEGER NOT NULL,
    byte_offset INTEGER NOT NULL,
    matched     TEXT NOT NULL,
    method      TEXT NOT NULL,
    metadata    TEXT NOT NULL
);

CREATE INDEX link1_from ON link1(from_id);
CREATE INDEX link1_to   ON link1(to_id);
CREATE INDEX link2_from ON link2(from_id);
CREATE INDEX link2_to   ON link2(to_id);
CREATE INDEX resource_depth ON resource(depth);
";

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the store for one run.
    ///
    /// With a path, any existing database there is deleted first; without
    /// one the store lives in memory.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let conn = match path {
            Some(path) => {
                if path.exists() {
                    std::fs::remove_file(path).with_context(|| {
                        format!("Failed to remove stale store {}", path.display())
                    })?;
                }
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                Connection::open(path)
                    .with_context(|| format!("Failed to open store {}", path.display()))?
            }
            None => Connection::open_in_memory().context("Failed to open in-memory store")?,
        };
        conn.execute_batch(SCHEMA)
            .context("Failed to create store schema")?;
        Ok(Self { conn })
    }

    // ------------------------------------------------------------------------
    // Type bindings
    // ------------------------------------------------------------------------

    pub fn insert_source_type(&self, pattern: &str, kind: SourceKind) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO source_type (pattern, kind) VALUES (?1, ?2)",
            params![pattern, kind.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_resource_type(&self, pattern: &str, kind: ResourceKind) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO resource_type (pattern, kind) VALUES (?1, ?2)",
            params![pattern, kind.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Source bindings in insertion order.
    pub fn source_types(&self) -> Result<Vec<(String, SourceKind)>> {
        self.bindings("source_type")?
            .into_iter()
            .map(|(pattern, tag)| Ok((pattern, tag.parse()?)))
            .collect()
    }

    /// Resource bindings in insertion order.
    pub fn resource_types(&self) -> Result<Vec<(String, ResourceKind)>> {
        self.bindings("resource_type")?
            .into_iter()
            .map(|(pattern, tag)| Ok((pattern, tag.parse()?)))
            .collect()
    }

    fn bindings(&self, table: &str) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT pattern, kind FROM {table} ORDER BY id"))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn counts(&self) -> Result<Counts> {
        let count = |table: &str| -> Result<usize> {
            let n: usize =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                        row.get(0)
                    })?;
            Ok(n)
        };
        Ok(Counts {
            sources: count("source")?,
            resources: count("resource")?,
            link1: count("link1")?,
            link2: count("link2")?,
        })
    }
}
