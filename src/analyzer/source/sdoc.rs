//! SDoc markup: `[img: /path]`, `[css: /path]`, `[js: /path]`, `[file: /path]`.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::is_text;
use crate::analyzer::{LineIndex, Reference, SourceAnalyzer};
use crate::store::Source;
use crate::utils::path::is_local_reference;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:img|css|js|file)\s*:\s*([^\]\s]+)\s*\]").expect("valid sdoc regex")
});

pub struct SDoc;

impl SourceAnalyzer for SDoc {
    fn sniff(&self, content: &[u8]) -> bool {
        is_text(content)
    }

    fn find_references(&self, source: &Source) -> Result<Vec<Reference>> {
        let index = LineIndex::new(&source.content);
        let refs = TAG
            .captures_iter(&source.content)
            .filter_map(|caps| caps.get(1))
            .filter(|path| is_local_reference(path.as_str()))
            .map(|path| Reference::path(&index, path.start(), path.as_str(), "sdoc-tag"))
            .collect();
        Ok(refs)
    }
}
