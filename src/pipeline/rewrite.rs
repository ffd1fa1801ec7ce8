//! Reference rewriter: substitute final URIs into the source files.

use std::fs;

use anyhow::{Context, Result};

use crate::config::PackConfig;
use crate::debug;
use crate::store::Store;

/// Rewrite every source that has references. Returns the number of files
/// written; unchanged files are left alone.
pub fn run(config: &PackConfig, store: &Store) -> Result<usize> {
    let mut written = 0;
    for source in store.sources_with_references()? {
        let deps = store.source_references(source.id)?;
        let rewritten = source
            .kind
            .analyzer()
            .rewrite(&source, &deps)
            .with_context(|| format!("Failed to rewrite {}", source.path.display()))?;

        let on_disk = fs::read(&source.path)
            .with_context(|| format!("Failed to read {}", source.path.display()))?;
        if on_disk == rewritten.as_bytes() {
            continue;
        }
        fs::write(&source.path, &rewritten)
            .with_context(|| format!("Failed to write {}", source.path.display()))?;
        debug!("rewrite"; "{}", config.root_relative(&source.path).display());
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{ResourceKind, SourceKind};
    use crate::config::test_config_at;
    use crate::store::tests::reference;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_rewrites_only_changed_sources() {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path());
        let page = dir.path().join("index.html");
        let html = r#"<img src="/logo.png">"#;
        fs::write(&page, html).unwrap();

        let store = Store::open(None).unwrap();
        let source = store.insert_source(&page, 0, html, SourceKind::Html).unwrap();
        let logo = store
            .insert_resource(Path::new("/www/logo.png"), 0, b"", ResourceKind::Image)
            .unwrap();
        store.insert_link1(source, logo, &reference(10, "/logo.png")).unwrap();
        let resource = store.resource(logo).unwrap();
        store.set_optimized(&resource, b"", "/images/0.png").unwrap();

        assert_eq!(run(&config, &store).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(&page).unwrap(),
            r#"<img src="/images/0.png">"#
        );

        // The file already holds the rewritten text.
        fs::write(&page, r#"<img src="/images/0.png">"#).unwrap();
        assert_eq!(run(&config, &store).unwrap(), 0);
    }
}
