//! Depth layering and optimization state.
//!
//! Depth 1 is a leaf. A resource gets depth `d` once everything it
//! references sits strictly below `d`; resources inside a cycle never do.

use std::path::PathBuf;

use anyhow::Result;
use rusqlite::params;

use super::Store;
use super::entity::{RESOURCE_COLUMNS, Resource};
use crate::analyzer::ResourceKind;
use crate::error::PackError;

impl Store {
    /// Assign `depth` to every unlayered resource whose Link2 targets all
    /// have a depth below it. Returns the number of resources assigned.
    pub fn mark_depth(&self, depth: i64) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE resource SET depth = ?1
             WHERE depth IS NULL
               AND NOT EXISTS (
                   SELECT 1 FROM link2 l JOIN resource t ON t.id = l.to_id
                   WHERE l.from_id = resource.id
                     AND (t.depth IS NULL OR t.depth >= ?1)
               )",
            params![depth],
        )?;
        Ok(changed)
    }

    /// Clear the depth of layered resources nothing uses: no source
    /// references them and no layered resource does either.
    pub fn mark_unused_depth_null(&self) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE resource SET depth = NULL
             WHERE depth IS NOT NULL
               AND NOT EXISTS (SELECT 1 FROM link1 l WHERE l.to_id = resource.id)
               AND NOT EXISTS (
                   SELECT 1 FROM link2 l JOIN resource p ON p.id = l.from_id
                   WHERE l.to_id = resource.id AND p.depth IS NOT NULL
               )",
            [],
        )?;
        Ok(changed)
    }

    pub fn max_depth(&self) -> Result<Option<i64>> {
        let depth = self
            .conn
            .query_row("SELECT MAX(depth) FROM resource", [], |row| row.get(0))?;
        Ok(depth)
    }

    /// Resources at `depth`, in path order.
    pub fn resources_at_depth(&self, depth: i64) -> Result<Vec<Resource>> {
        self.select_resources(
            &format!("SELECT {RESOURCE_COLUMNS} FROM resource r WHERE r.depth = ?1 ORDER BY r.path"),
            params![depth],
        )
    }

    /// Unlayered resources a source references directly.
    pub fn blocked_resources(&self) -> Result<Vec<PathBuf>> {
        let blocked = self.select_resources(
            &format!(
                "SELECT {RESOURCE_COLUMNS} FROM resource r
                 WHERE r.depth IS NULL
                   AND EXISTS (SELECT 1 FROM link1 l WHERE l.to_id = r.id)
                 ORDER BY r.path"
            ),
            [],
        )?;
        Ok(blocked.into_iter().map(|r| r.path).collect())
    }

    /// Resources without a depth, in path order.
    pub fn unused_resources(&self) -> Result<Vec<Resource>> {
        self.select_resources(
            &format!("SELECT {RESOURCE_COLUMNS} FROM resource r WHERE r.depth IS NULL ORDER BY r.path"),
            [],
        )
    }

    /// Optimized, used resources in path order.
    pub fn optimized_outputs(&self) -> Result<Vec<Resource>> {
        self.select_resources(
            &format!(
                "SELECT {RESOURCE_COLUMNS} FROM resource r
                 WHERE r.uri_optimized IS NOT NULL AND r.depth IS NOT NULL
                 ORDER BY r.path"
            ),
            [],
        )
    }

    /// Every layered referrer of `resource`: `None` for a source, else the
    /// referring resource's kind, each with the edge method.
    pub fn referrers(&self, resource: i64) -> Result<Vec<(Option<ResourceKind>, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT NULL, l.method FROM link1 l WHERE l.to_id = ?1
             UNION ALL
             SELECT p.kind, l.method FROM link2 l JOIN resource p ON p.id = l.from_id
             WHERE l.to_id = ?1 AND p.depth IS NOT NULL",
        )?;
        let rows = stmt
            .query_map(params![resource], |row| {
                Ok((row.get::<_, Option<String>>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|(kind, method)| -> Result<_> {
                let kind = kind.map(|tag| tag.parse::<ResourceKind>()).transpose()?;
                Ok((kind, method))
            })
            .collect()
    }

    /// Store the optimization result. Each resource is optimized once.
    pub fn set_optimized(&self, resource: &Resource, content: &[u8], uri: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE resource SET content_optimized = ?2, uri_optimized = ?3
             WHERE id = ?1 AND uri_optimized IS NULL",
            params![resource.id, content, uri],
        )?;
        if changed == 0 {
            return Err(PackError::AlreadyOptimized {
                path: resource.path.clone(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{add_resource, reference};
    use super::*;
    use crate::analyzer::{ResourceKind, SourceKind};
    use std::path::Path;

    fn layer(store: &Store) -> i64 {
        let mut depth = 0;
        loop {
            depth += 1;
            if store.mark_depth(depth).unwrap() == 0 {
                return depth - 1;
            }
        }
    }

    fn depth_of(store: &Store, path: &str) -> Option<i64> {
        store
            .resource_by_path(Path::new(path))
            .unwrap()
            .unwrap()
            .depth
    }

    #[test]
    fn test_chain_depths() {
        // main.js -> util.js -> logo.png
        let store = Store::open(None).unwrap();
        let main = add_resource(&store, "/www/main.js", ResourceKind::JsMain);
        let util = add_resource(&store, "/www/util.js", ResourceKind::Js);
        let logo = add_resource(&store, "/www/logo.png", ResourceKind::Image);
        store.insert_link2(main, util, &reference(0, "util")).unwrap();
        store.insert_link2(util, logo, &reference(0, "logo")).unwrap();

        assert_eq!(layer(&store), 3);
        assert_eq!(depth_of(&store, "/www/logo.png"), Some(1));
        assert_eq!(depth_of(&store, "/www/util.js"), Some(2));
        assert_eq!(depth_of(&store, "/www/main.js"), Some(3));
        assert_eq!(store.max_depth().unwrap(), Some(3));
    }

    #[test]
    fn test_diamond_takes_longest_path() {
        // a -> b -> d, a -> d
        let store = Store::open(None).unwrap();
        let a = add_resource(&store, "/a.css", ResourceKind::Css);
        let b = add_resource(&store, "/b.css", ResourceKind::Css);
        let d = add_resource(&store, "/d.png", ResourceKind::Image);
        store.insert_link2(a, d, &reference(0, "d")).unwrap();
        store.insert_link2(a, b, &reference(5, "b")).unwrap();
        store.insert_link2(b, d, &reference(0, "d")).unwrap();

        layer(&store);
        assert_eq!(depth_of(&store, "/a.css"), Some(3));
        assert_eq!(depth_of(&store, "/b.css"), Some(2));
        assert_eq!(store.resources_at_depth(1).unwrap()[0].id, d);
    }

    #[test]
    fn test_cycle_stays_unlayered() {
        let store = Store::open(None).unwrap();
        let page = store
            .insert_source(Path::new("/src/a.html"), 0, "", SourceKind::Html)
            .unwrap();
        let a = add_resource(&store, "/a.css", ResourceKind::Css);
        let b = add_resource(&store, "/b.css", ResourceKind::Css);
        store.insert_link2(a, b, &reference(0, "b")).unwrap();
        store.insert_link2(b, a, &reference(0, "a")).unwrap();
        store.insert_link1(page, a, &reference(0, "a")).unwrap();

        assert_eq!(layer(&store), 0);
        assert_eq!(store.blocked_resources().unwrap(), vec![PathBuf::from("/a.css")]);
    }

    #[test]
    fn test_unused_pruning_cascades() {
        // page -> used.css; orphan.css -> shared.png <- used.css; orphan.css -> lonely.png
        let store = Store::open(None).unwrap();
        let page = store
            .insert_source(Path::new("/src/index.html"), 0, "", SourceKind::Html)
            .unwrap();
        let used = add_resource(&store, "/used.css", ResourceKind::Css);
        let orphan = add_resource(&store, "/orphan.css", ResourceKind::Css);
        let shared = add_resource(&store, "/shared.png", ResourceKind::Image);
        let lonely = add_resource(&store, "/lonely.png", ResourceKind::Image);
        store.insert_link1(page, used, &reference(0, "used")).unwrap();
        store.insert_link2(used, shared, &reference(0, "s")).unwrap();
        store.insert_link2(orphan, shared, &reference(0, "s")).unwrap();
        store.insert_link2(orphan, lonely, &reference(9, "l")).unwrap();

        layer(&store);
        let mut pruned = 0;
        loop {
            let n = store.mark_unused_depth_null().unwrap();
            if n == 0 {
                break;
            }
            pruned += n;
        }
        assert_eq!(pruned, 2);

        let unused: Vec<_> = store
            .unused_resources()
            .unwrap()
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(
            unused,
            vec![PathBuf::from("/lonely.png"), PathBuf::from("/orphan.css")]
        );
        assert_eq!(depth_of(&store, "/shared.png"), Some(1));
    }

    #[test]
    fn test_referrers_skip_unlayered_resources() {
        let store = Store::open(None).unwrap();
        let page = store
            .insert_source(Path::new("/src/index.php"), 0, "", SourceKind::PhpLike)
            .unwrap();
        let list = add_resource(&store, "/src/.ab.csslist", ResourceKind::CssList);
        let orphan = add_resource(&store, "/orphan.css", ResourceKind::Css);
        let member = add_resource(&store, "/a.css", ResourceKind::Css);
        store.insert_link1(page, list, &reference(0, "group")).unwrap();
        let mut entry = reference(0, "/a.css");
        entry.method = "list-entry";
        store.insert_link2(list, member, &entry).unwrap();
        store.insert_link2(orphan, member, &reference(4, "a.css")).unwrap();
        layer(&store);
        while store.mark_unused_depth_null().unwrap() > 0 {}

        assert_eq!(
            store.referrers(member).unwrap(),
            vec![(Some(ResourceKind::CssList), "list-entry".to_string())]
        );
        assert_eq!(store.referrers(list).unwrap()[0].0, None);
    }

    #[test]
    fn test_set_optimized_is_write_once() {
        let store = Store::open(None).unwrap();
        let id = add_resource(&store, "/a.txt", ResourceKind::Text);
        store.mark_depth(1).unwrap();
        let resource = store.resource(id).unwrap();

        store.set_optimized(&resource, b"a", "/text/x.txt").unwrap();
        let err = store
            .set_optimized(&resource, b"b", "/text/y.txt")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PackError>(),
            Some(PackError::AlreadyOptimized { .. })
        ));

        let outputs = store.optimized_outputs().unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].uri_optimized.as_deref(), Some("/text/x.txt"));
        assert_eq!(outputs[0].content_optimized.as_deref(), Some(&b"a"[..]));
    }
}
