//! Depth layering over Link2, then cycle detection and unused pruning.

use anyhow::Result;

use crate::error::PackError;
use crate::store::Store;

/// Layer every reachable resource. Returns the maximum depth assigned.
///
/// A resource referenced by a source that never receives a depth sits on a
/// cycle and aborts the run. Everything else left without a depth, or only
/// used by unused resources, ends up depth-null and is pruned later.
pub fn resolve(store: &Store) -> Result<i64> {
    let mut depth = 0;
    loop {
        depth += 1;
        if store.mark_depth(depth)? == 0 {
            break;
        }
    }

    let blocked = store.blocked_resources()?;
    if !blocked.is_empty() {
        return Err(PackError::DependencyCycle { paths: blocked }.into());
    }

    while store.mark_unused_depth_null()? > 0 {}

    Ok(store.max_depth()?.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{ResourceKind, SourceKind};
    use crate::store::tests::{add_resource, reference};
    use std::path::{Path, PathBuf};

    fn page(store: &Store) -> i64 {
        store
            .insert_source(Path::new("/src/index.html"), 0, "", SourceKind::Html)
            .unwrap()
    }

    #[test]
    fn test_resolve_returns_max_depth() {
        let store = Store::open(None).unwrap();
        let src = page(&store);
        let css = add_resource(&store, "/www/site.css", ResourceKind::Css);
        let img = add_resource(&store, "/www/bg.png", ResourceKind::Image);
        store.insert_link1(src, css, &reference(0, "site.css")).unwrap();
        store.insert_link2(css, img, &reference(0, "bg.png")).unwrap();

        assert_eq!(resolve(&store).unwrap(), 2);
        assert!(store.unused_resources().unwrap().is_empty());
    }

    #[test]
    fn test_cycle_reached_from_source_is_fatal() {
        let store = Store::open(None).unwrap();
        let src = page(&store);
        let a = add_resource(&store, "/www/a.css", ResourceKind::Css);
        let b = add_resource(&store, "/www/b.css", ResourceKind::Css);
        store.insert_link1(src, a, &reference(0, "a.css")).unwrap();
        store.insert_link2(a, b, &reference(0, "b.css")).unwrap();
        store.insert_link2(b, a, &reference(0, "a.css")).unwrap();

        let err = resolve(&store).unwrap_err();
        match err.downcast_ref::<PackError>() {
            Some(PackError::DependencyCycle { paths }) => {
                assert_eq!(paths, &vec![PathBuf::from("/www/a.css")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unreferenced_cycle_is_pruned() {
        let store = Store::open(None).unwrap();
        let a = add_resource(&store, "/www/a.css", ResourceKind::Css);
        let b = add_resource(&store, "/www/b.css", ResourceKind::Css);
        let leaf = add_resource(&store, "/www/leaf.png", ResourceKind::Image);
        store.insert_link2(a, b, &reference(0, "b.css")).unwrap();
        store.insert_link2(b, a, &reference(0, "a.css")).unwrap();
        store.insert_link2(b, leaf, &reference(0, "leaf.png")).unwrap();

        assert_eq!(resolve(&store).unwrap(), 0);
        let unused: Vec<_> = store
            .unused_resources()
            .unwrap()
            .into_iter()
            .map(|r| r.path)
            .collect();
        assert_eq!(unused.len(), 3);
    }
}
