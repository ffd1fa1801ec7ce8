//! Rows of the content store.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use rusqlite::Row;
use rusqlite::types::Type;
use serde_json::Value;

use crate::analyzer::{ResourceKind, SourceKind};
use crate::error::PackError;

/// A document that references resources. Its text is a snapshot taken at
/// discovery; only the file on disk is rewritten later.
#[derive(Debug, Clone)]
pub struct Source {
    pub id: i64,
    pub path: PathBuf,
    pub content: String,
    pub kind: SourceKind,
}

/// An optimizable asset, or a virtual one built from a combine group.
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: i64,
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub content_optimized: Option<Vec<u8>>,
    pub uri_optimized: Option<String>,
    /// `None` until layered; stays `None` for unused or blocked resources.
    pub depth: Option<i64>,
    pub kind: ResourceKind,
}

impl Resource {
    /// Original content as UTF-8.
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.content)
            .with_context(|| format!("`{}` is not valid UTF-8", self.path.display()))
    }

    /// Optimized content as UTF-8, empty when not optimized yet.
    pub fn optimized_text(&self) -> Result<&str> {
        let bytes = self.content_optimized.as_deref().unwrap_or_default();
        std::str::from_utf8(bytes)
            .with_context(|| format!("optimized `{}` is not valid UTF-8", self.path.display()))
    }
}

/// One recorded reference, Link1 (source → resource) or Link2
/// (resource → resource).
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: i64,
    pub from: i64,
    pub to: i64,
    pub line: usize,
    pub offset: usize,
    pub matched: String,
    pub method: String,
    pub metadata: Value,
}

/// An edge together with the resource it points at.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub edge: Edge,
    pub resource: Resource,
}

impl Dependency {
    /// Final URI of the target, which must already be optimized.
    pub fn uri(&self, user: &Path) -> Result<&str> {
        self.resource.uri_optimized.as_deref().ok_or_else(|| {
            PackError::NotOptimized {
                user: user.to_path_buf(),
                dependency: self.resource.path.clone(),
            }
            .into()
        })
    }
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub sources: usize,
    pub resources: usize,
    pub link1: usize,
    pub link2: usize,
}

// ============================================================================
// Row mapping
// ============================================================================

pub(super) const SOURCE_COLUMNS: &str = "s.id, s.path, s.content, s.kind";

pub(super) const RESOURCE_COLUMNS: &str =
    "r.id, r.path, r.content, r.content_optimized, r.uri_optimized, r.depth, r.kind";

pub(super) const EDGE_COLUMNS: &str =
    "l.id, l.from_id, l.to_id, l.line, l.byte_offset, l.matched, l.method, l.metadata";

/// Number of columns in [`EDGE_COLUMNS`].
pub(super) const EDGE_WIDTH: usize = 8;

pub(super) fn source_from_row(row: &Row<'_>) -> rusqlite::Result<Source> {
    Ok(Source {
        id: row.get(0)?,
        path: PathBuf::from(row.get::<_, String>(1)?),
        content: row.get(2)?,
        kind: parse_kind(row, 3)?,
    })
}

pub(super) fn resource_from_row(row: &Row<'_>, base: usize) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: row.get(base)?,
        path: PathBuf::from(row.get::<_, String>(base + 1)?),
        content: row.get(base + 2)?,
        content_optimized: row.get(base + 3)?,
        uri_optimized: row.get(base + 4)?,
        depth: row.get(base + 5)?,
        kind: parse_kind(row, base + 6)?,
    })
}

pub(super) fn edge_from_row(row: &Row<'_>) -> rusqlite::Result<Edge> {
    let metadata: String = row.get(7)?;
    let metadata = serde_json::from_str(&metadata)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;
    Ok(Edge {
        id: row.get(0)?,
        from: row.get(1)?,
        to: row.get(2)?,
        line: row.get(3)?,
        offset: row.get(4)?,
        matched: row.get(5)?,
        method: row.get(6)?,
        metadata,
    })
}

pub(super) fn dependency_from_row(row: &Row<'_>) -> rusqlite::Result<Dependency> {
    Ok(Dependency {
        edge: edge_from_row(row)?,
        resource: resource_from_row(row, EDGE_WIDTH)?,
    })
}

fn parse_kind<K>(row: &Row<'_>, idx: usize) -> rusqlite::Result<K>
where
    K: FromStr<Err = PackError>,
{
    let tag: String = row.get(idx)?;
    tag.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Path as stored in the `path` columns.
pub(super) fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
