//! HTML documents: `href` / `src` of asset-loading tags.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::is_text;
use crate::analyzer::{LineIndex, Reference, SourceAnalyzer};
use crate::store::Source;
use crate::utils::path::is_local_reference;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(?:link|script|img|source)\b[^>]*>").expect("valid tag regex")
});

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s(?:href|src)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid attr regex")
});

pub struct Html;

impl SourceAnalyzer for Html {
    fn sniff(&self, content: &[u8]) -> bool {
        is_text(content)
    }

    fn find_references(&self, source: &Source) -> Result<Vec<Reference>> {
        let index = LineIndex::new(&source.content);
        Ok(tag_references(&source.content, &index))
    }
}

/// References in asset-loading tags, in document order.
pub(super) fn tag_references(content: &str, index: &LineIndex) -> Vec<Reference> {
    let mut refs = Vec::new();
    for tag in TAG.find_iter(content) {
        for caps in ATTR.captures_iter(tag.as_str()) {
            let Some(value) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            if !is_local_reference(value.as_str()) {
                continue;
            }
            refs.push(Reference::path(
                index,
                tag.start() + value.start(),
                value.as_str(),
                "html-attr",
            ));
        }
    }
    refs
}
