//! Plain text assets, copied as-is under a content-addressed name.

use anyhow::Result;

use super::{extension, is_text};
use crate::analyzer::{Reference, ResourceAnalyzer};
use crate::config::PackConfig;
use crate::store::{Dependency, Resource};
use crate::utils::hash::content_uri;

pub struct Text;

impl ResourceAnalyzer for Text {
    fn sniff(&self, content: &[u8]) -> bool {
        is_text(content)
    }

    fn must_precompress(&self) -> bool {
        true
    }

    fn find_references(&self, _resource: &Resource) -> Result<Vec<Reference>> {
        Ok(Vec::new())
    }

    fn optimize(
        &self,
        resource: &Resource,
        _deps: &[Dependency],
        _config: &PackConfig,
    ) -> Result<Vec<u8>> {
        Ok(resource.content.clone())
    }

    fn output_uri(&self, resource: &Resource, optimized: &[u8], config: &PackConfig) -> String {
        content_uri(&config.output.text, &extension(&resource.path), optimized)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture::resource;
    use super::*;
    use crate::analyzer::ResourceKind;

    #[test]
    fn test_passthrough_keeps_extension() {
        let json = resource("/www/data/site.webmanifest", b"{\"name\":\"x\"}", ResourceKind::Text);
        let mut config = PackConfig::default();
        config.output.text = "/static/".into();
        let out = Text.optimize(&json, &[], &config).unwrap();
        assert_eq!(out, json.content);
        let uri = Text.output_uri(&json, &out, &config);
        assert!(uri.starts_with("/static/"));
        assert!(uri.ends_with(".webmanifest"));
    }

    #[test]
    fn test_sniff_requires_utf8() {
        assert!(Text.sniff(b"plain"));
        assert!(!Text.sniff(&[0xc3, 0x28]));
    }
}
