//! Plain scripts. Absolute image paths in string literals are references.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::is_text;
use crate::analyzer::minify::{filter, minify_js};
use crate::analyzer::{LineIndex, Reference, ResourceAnalyzer, rewrite_spans};
use crate::config::PackConfig;
use crate::store::{Dependency, Resource};
use crate::utils::hash::content_uri;

static LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#""(/[^"\s]*\.(?:png|jpe?g|gif|webp|svg|ico))"|'(/[^'\s]*\.(?:png|jpe?g|gif|webp|svg|ico))'"#,
    )
    .expect("valid literal regex")
});

pub struct Js;

/// Image literals in `content`, in order.
pub(super) fn literal_references(content: &str, index: &LineIndex) -> Vec<Reference> {
    LITERAL
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .filter(|value| !value.as_str().starts_with("//"))
        .map(|value| Reference::path(index, value.start(), value.as_str(), "js-literal"))
        .collect()
}

impl ResourceAnalyzer for Js {
    fn sniff(&self, content: &[u8]) -> bool {
        is_text(content)
    }

    fn must_precompress(&self) -> bool {
        true
    }

    fn find_references(&self, resource: &Resource) -> Result<Vec<Reference>> {
        let content = resource.text()?;
        Ok(literal_references(content, &LineIndex::new(content)))
    }

    fn optimize(
        &self,
        resource: &Resource,
        deps: &[Dependency],
        config: &PackConfig,
    ) -> Result<Vec<u8>> {
        let spliced = rewrite_spans(&resource.path, resource.text()?, deps)?;
        filter(&config.tools.js, &resource.path, &spliced, minify_js)
    }

    fn output_uri(&self, _resource: &Resource, optimized: &[u8], config: &PackConfig) -> String {
        content_uri(&config.output.js, "js", optimized)
    }
}
