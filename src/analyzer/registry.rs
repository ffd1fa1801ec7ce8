//! Filename bindings: the first pattern that matches and whose analyzer
//! accepts the content decides the kind.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use super::{ResourceKind, SourceKind};
use crate::store::Store;

/// Built-in source bindings, in match order.
pub const DEFAULT_SOURCE_TYPES: &[(&str, SourceKind)] = &[
    (r"\.html?$", SourceKind::Html),
    (r"\.php$", SourceKind::PhpLike),
    (r"\.sdoc$", SourceKind::SDoc),
];

/// Built-in resource bindings, in match order. `*.main.js` must come
/// before `*.js`.
pub const DEFAULT_RESOURCE_TYPES: &[(&str, ResourceKind)] = &[
    (r"\.main\.js$", ResourceKind::JsMain),
    (r"\.js$", ResourceKind::Js),
    (r"\.css$", ResourceKind::Css),
    (r"\.(png|jpe?g|gif|webp|svg|ico)$", ResourceKind::Image),
    (r"\.(txt|json|xml|webmanifest)$", ResourceKind::Text),
];

pub struct Registry {
    sources: Vec<(Regex, SourceKind)>,
    resources: Vec<(Regex, ResourceKind)>,
}

impl Registry {
    /// Compile the bindings persisted in the store's type tables.
    pub fn load(store: &Store) -> Result<Self> {
        Ok(Self {
            sources: compile(store.source_types()?)?,
            resources: compile(store.resource_types()?)?,
        })
    }

    pub fn classify_source(&self, path: &Path, content: &[u8]) -> Option<SourceKind> {
        let name = path.to_string_lossy();
        self.sources
            .iter()
            .filter(|(re, _)| re.is_match(&name))
            .map(|(_, kind)| *kind)
            .find(|kind| kind.analyzer().sniff(content))
    }

    pub fn classify_resource(&self, path: &Path, content: &[u8]) -> Option<ResourceKind> {
        let name = path.to_string_lossy();
        self.resources
            .iter()
            .filter(|(re, _)| re.is_match(&name))
            .map(|(_, kind)| *kind)
            .find(|kind| kind.analyzer().sniff(content))
    }
}

fn compile<K>(bindings: Vec<(String, K)>) -> Result<Vec<(Regex, K)>> {
    bindings
        .into_iter()
        .map(|(pattern, kind)| {
            let re = Regex::new(&pattern)
                .with_context(|| format!("Invalid type pattern `{pattern}`"))?;
            Ok((re, kind))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_registry() -> Registry {
        let store = Store::open(None).unwrap();
        for (pattern, kind) in DEFAULT_SOURCE_TYPES {
            store.insert_source_type(pattern, *kind).unwrap();
        }
        for (pattern, kind) in DEFAULT_RESOURCE_TYPES {
            store.insert_resource_type(pattern, *kind).unwrap();
        }
        Registry::load(&store).unwrap()
    }

    #[test]
    fn test_main_js_needs_require() {
        let registry = default_registry();
        let path = Path::new("/www/js/app.main.js");
        assert_eq!(
            registry.classify_resource(path, b"var a = require('./a');"),
            Some(ResourceKind::JsMain)
        );
        // Falls through to the plain script binding.
        assert_eq!(
            registry.classify_resource(path, b"console.log(1);"),
            Some(ResourceKind::Js)
        );
    }

    #[test]
    fn test_image_needs_magic_bytes() {
        let registry = default_registry();
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        assert_eq!(
            registry.classify_resource(Path::new("/www/a.png"), png),
            Some(ResourceKind::Image)
        );
        assert_eq!(
            registry.classify_resource(Path::new("/www/a.png"), b"not an image"),
            None
        );
    }

    #[test]
    fn test_unknown_extension_is_skipped() {
        let registry = default_registry();
        assert_eq!(registry.classify_resource(Path::new("/www/a.woff2"), b"x"), None);
        assert_eq!(
            registry.classify_source(Path::new("/src/index.htm"), b"<p>"),
            Some(SourceKind::Html)
        );
        assert_eq!(registry.classify_source(Path::new("/src/a.md"), b"#"), None);
    }

    #[test]
    fn test_invalid_pattern() {
        let store = Store::open(None).unwrap();
        store.insert_source_type("(", SourceKind::Html).unwrap();
        assert!(Registry::load(&store).is_err());
    }
}
