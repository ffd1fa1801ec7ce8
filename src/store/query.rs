//! Entity and edge reads and writes.

use std::path::Path;

use anyhow::Result;
use rusqlite::{OptionalExtension, params};

use super::Store;
use super::entity::{
    Dependency, EDGE_COLUMNS, RESOURCE_COLUMNS, Resource, SOURCE_COLUMNS, Source,
    dependency_from_row, path_key, resource_from_row, source_from_row,
};
use crate::analyzer::{Reference, ResourceKind, SourceKind};

impl Store {
    pub fn insert_source(
        &self,
        path: &Path,
        mtime: i64,
        content: &str,
        kind: SourceKind,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO source (path, mtime, content, kind) VALUES (?1, ?2, ?3, ?4)",
            params![path_key(path), mtime, content, kind.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_resource(
        &self,
        path: &Path,
        mtime: i64,
        content: &[u8],
        kind: ResourceKind,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO resource (path, mtime, content, kind) VALUES (?1, ?2, ?3, ?4)",
            params![path_key(path), mtime, content, kind.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Record a source → resource reference.
    pub fn insert_link1(&self, from: i64, to: i64, reference: &Reference) -> Result<i64> {
        self.insert_link("link1", from, to, reference)
    }

    /// Record a resource → resource reference.
    pub fn insert_link2(&self, from: i64, to: i64, reference: &Reference) -> Result<i64> {
        self.insert_link("link2", from, to, reference)
    }

    fn insert_link(&self, table: &str, from: i64, to: i64, reference: &Reference) -> Result<i64> {
        self.conn.execute(
            &format!(
                "INSERT INTO {table} (from_id, to_id, line, byte_offset, matched, method, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
            ),
            params![
                from,
                to,
                reference.line,
                reference.offset,
                reference.matched,
                reference.method,
                reference.metadata.to_string(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn resource_by_path(&self, path: &Path) -> Result<Option<Resource>> {
        let resource = self
            .conn
            .query_row(
                &format!("SELECT {RESOURCE_COLUMNS} FROM resource r WHERE r.path = ?1"),
                params![path_key(path)],
                |row| resource_from_row(row, 0),
            )
            .optional()?;
        Ok(resource)
    }

    #[cfg(test)]
    pub fn resource(&self, id: i64) -> Result<Resource> {
        let resource = self.conn.query_row(
            &format!("SELECT {RESOURCE_COLUMNS} FROM resource r WHERE r.id = ?1"),
            params![id],
            |row| resource_from_row(row, 0),
        )?;
        Ok(resource)
    }

    /// All sources in path order.
    pub fn sources(&self) -> Result<Vec<Source>> {
        self.select_sources(&format!(
            "SELECT {SOURCE_COLUMNS} FROM source s ORDER BY s.path"
        ))
    }

    /// Sources with at least one Link1 edge, in path order.
    pub fn sources_with_references(&self) -> Result<Vec<Source>> {
        self.select_sources(&format!(
            "SELECT {SOURCE_COLUMNS} FROM source s
             WHERE EXISTS (SELECT 1 FROM link1 l WHERE l.from_id = s.id)
             ORDER BY s.path"
        ))
    }

    /// All resources in path order.
    pub fn resources(&self) -> Result<Vec<Resource>> {
        self.select_resources(
            &format!("SELECT {RESOURCE_COLUMNS} FROM resource r ORDER BY r.path"),
            [],
        )
    }

    /// Resources `source` references, in edge order.
    pub fn source_references(&self, source: i64) -> Result<Vec<Dependency>> {
        self.select_dependencies("link1", source)
    }

    /// Resources `resource` references, in edge order.
    pub fn resources_referenced_by(&self, resource: i64) -> Result<Vec<Dependency>> {
        self.select_dependencies("link2", resource)
    }

    /// Remove a resource row together with every edge touching it.
    pub fn delete_resource(&mut self, id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM link1 WHERE to_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM link2 WHERE from_id = ?1 OR to_id = ?1",
            params![id],
        )?;
        tx.execute("DELETE FROM resource WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }

    fn select_sources(&self, sql: &str) -> Result<Vec<Source>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], source_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub(super) fn select_resources<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Resource>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| resource_from_row(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn select_dependencies(&self, table: &str, from: i64) -> Result<Vec<Dependency>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EDGE_COLUMNS}, {RESOURCE_COLUMNS}
             FROM {table} l JOIN resource r ON r.id = l.to_id
             WHERE l.from_id = ?1
             ORDER BY l.id"
        ))?;
        let rows = stmt
            .query_map(params![from], dependency_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add_resource, reference};
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_resource_by_path() {
        let store = Store::open(None).unwrap();
        let id = add_resource(&store, "/www/css/a.css", ResourceKind::Css);

        let found = store
            .resource_by_path(Path::new("/www/css/a.css"))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.kind, ResourceKind::Css);
        assert_eq!(found.depth, None);
        assert!(
            store
                .resource_by_path(Path::new("/www/css/b.css"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let store = Store::open(None).unwrap();
        add_resource(&store, "/www/a.css", ResourceKind::Css);
        assert!(
            store
                .insert_resource(Path::new("/www/a.css"), 0, b"", ResourceKind::Css)
                .is_err()
        );
    }

    #[test]
    fn test_references_in_edge_order() {
        let store = Store::open(None).unwrap();
        let page = store
            .insert_source(Path::new("/src/index.html"), 7, "<html>", SourceKind::Html)
            .unwrap();
        // Inserted in path order z, a; edges must come back z, a.
        let z = add_resource(&store, "/www/z.css", ResourceKind::Css);
        let a = add_resource(&store, "/www/a.css", ResourceKind::Css);

        let mut first = reference(30, "z.css");
        first.metadata = json!({"quote": "\""});
        store.insert_link1(page, z, &first).unwrap();
        store.insert_link1(page, a, &reference(10, "a.css")).unwrap();

        let deps = store.source_references(page).unwrap();
        let paths: Vec<_> = deps.iter().map(|d| d.resource.path.clone()).collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("/www/z.css"), PathBuf::from("/www/a.css")]
        );
        assert_eq!(deps[0].edge.offset, 30);
        assert_eq!(deps[0].edge.metadata, json!({"quote": "\""}));
        assert_eq!(deps[1].edge.method, "test");

        assert_eq!(store.sources_with_references().unwrap().len(), 1);
    }

    #[test]
    fn test_sources_without_edges_are_skipped() {
        let store = Store::open(None).unwrap();
        store
            .insert_source(Path::new("/src/plain.html"), 0, "", SourceKind::Html)
            .unwrap();
        assert_eq!(store.sources().unwrap().len(), 1);
        assert!(store.sources_with_references().unwrap().is_empty());
    }

    #[test]
    fn test_delete_resource_drops_edges() {
        let mut store = Store::open(None).unwrap();
        let css = add_resource(&store, "/www/a.css", ResourceKind::Css);
        let img = add_resource(&store, "/www/a.png", ResourceKind::Image);
        store.insert_link2(css, img, &reference(4, "a.png")).unwrap();

        store.delete_resource(img).unwrap();
        let counts = store.counts().unwrap();
        assert_eq!(counts.resources, 1);
        assert_eq!(counts.link2, 0);
        assert!(store.resources_referenced_by(css).unwrap().is_empty());
    }
}
