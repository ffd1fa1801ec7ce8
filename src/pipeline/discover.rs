//! Discovery: walk the configured directories and insert Source / Resource
//! rows for every file the registry can classify.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use jwalk::WalkDir;
use rustc_hash::FxHashSet;

use crate::analyzer::Registry;
use crate::config::PackConfig;
use crate::debug;
use crate::store::Store;
use crate::utils::path::normalize_path;

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// What discovery found.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Discovery {
    pub sources: usize,
    pub resources: usize,
    /// Files no binding accepted.
    pub skipped: usize,
}

/// Seed the type tables from configuration.
pub fn seed_types(config: &PackConfig, store: &Store) -> Result<()> {
    for (pattern, kind) in config.types.source_bindings()? {
        store.insert_source_type(&pattern, kind)?;
    }
    for (pattern, kind) in config.types.resource_bindings()? {
        store.insert_resource_type(&pattern, kind)?;
    }
    Ok(())
}

/// Insert every classifiable file. Sources are claimed first, so a file
/// under both a source directory and the resource root is a source.
pub fn discover(config: &PackConfig, store: &Store, registry: &Registry) -> Result<Discovery> {
    let mut found = Discovery::default();
    let mut claimed = FxHashSet::default();

    for dir in &config.paths.sources {
        for path in collect_all_files(dir) {
            let content = read(&path)?;
            let kind = registry.classify_source(&path, &content);
            let (Some(kind), Ok(text)) = (kind, String::from_utf8(content)) else {
                debug!("skip"; "{} is not a source", config.root_relative(&path).display());
                found.skipped += 1;
                continue;
            };
            store.insert_source(&path, mtime(&path), &text, kind)?;
            claimed.insert(path);
            found.sources += 1;
        }
    }

    for path in collect_all_files(&config.paths.resources) {
        if claimed.contains(&path) {
            continue;
        }
        let content = read(&path)?;
        let Some(kind) = registry.classify_resource(&path, &content) else {
            debug!("skip"; "{} has no resource type", config.root_relative(&path).display());
            found.skipped += 1;
            continue;
        };
        store.insert_resource(&path, mtime(&path), &content, kind)?;
        found.resources += 1;
    }

    Ok(found)
}

/// Collect all files below `dir`, normalized and in path order.
fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(|e| normalize_path(&e.path()))
        .collect();
    files.sort();
    files.dedup();
    files
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Modification time in unix seconds, 0 when unavailable.
fn mtime(path: &Path) -> i64 {
    path.metadata()
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{ResourceKind, SourceKind};
    use crate::config::test_config_at;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_discover_classifies_and_skips() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "src/index.html", b"<html></html>");
        write(root, "src/notes.md", b"# notes");
        write(root, "www/css/site.css", b"body{}");
        write(root, "www/js/app.main.js", b"require('./a');");
        write(root, "www/img/fake.png", b"not a png");
        write(root, "www/.DS_Store", b"\0");

        let config = test_config_at(root);
        let store = Store::open(None).unwrap();
        seed_types(&config, &store).unwrap();
        let registry = Registry::load(&store).unwrap();

        let found = discover(&config, &store, &registry).unwrap();
        assert_eq!(
            found,
            Discovery {
                sources: 1,
                resources: 2,
                skipped: 2,
            }
        );

        let sources = store.sources().unwrap();
        assert_eq!(sources[0].kind, SourceKind::Html);
        assert_eq!(sources[0].content, "<html></html>");
        let kinds: Vec<_> = store.resources().unwrap().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ResourceKind::Css, ResourceKind::JsMain]);
    }

    #[test]
    fn test_source_dir_inside_resource_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "www/index.html", b"<p>");
        write(root, "www/robots.txt", b"User-agent: *");

        let mut config = test_config_at(root);
        config.paths.sources = vec![config.paths.resources.clone()];
        let store = Store::open(None).unwrap();
        seed_types(&config, &store).unwrap();
        let registry = Registry::load(&store).unwrap();

        let found = discover(&config, &store, &registry).unwrap();
        assert_eq!(found.sources, 1);
        assert_eq!(found.resources, 1);
        assert_eq!(store.resources().unwrap()[0].kind, ResourceKind::Text);
    }
}
