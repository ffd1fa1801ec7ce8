//! Virtual stylesheet lists created from combine groups.
//!
//! Content is one member reference per line; the optimized form is the
//! members' optimized stylesheets joined in list order and minified again,
//! so that a later run over the output reproduces it byte for byte.

use anyhow::Result;

use super::is_text;
use crate::analyzer::minify::{filter, minify_css};
use crate::analyzer::{LineIndex, Reference, ResourceAnalyzer};
use crate::config::PackConfig;
use crate::store::{Dependency, Resource};
use crate::utils::hash::content_uri;

pub struct CssList;

impl ResourceAnalyzer for CssList {
    fn sniff(&self, content: &[u8]) -> bool {
        is_text(content)
    }

    fn must_precompress(&self) -> bool {
        true
    }

    fn find_references(&self, resource: &Resource) -> Result<Vec<Reference>> {
        let content = resource.text()?;
        let index = LineIndex::new(content);
        let mut refs = Vec::new();
        let mut line_start = 0;
        for line in content.split_inclusive('\n') {
            let entry = line.trim();
            if !entry.is_empty() {
                let offset = line_start + (line.len() - line.trim_start().len());
                refs.push(Reference::path(&index, offset, entry, "list-entry"));
            }
            line_start += line.len();
        }
        Ok(refs)
    }

    fn optimize(
        &self,
        resource: &Resource,
        deps: &[Dependency],
        config: &PackConfig,
    ) -> Result<Vec<u8>> {
        let mut joined = String::new();
        for dep in deps {
            dep.uri(&resource.path)?;
            joined.push_str(dep.resource.optimized_text()?);
            joined.push('\n');
        }
        filter(&config.tools.css, &resource.path, &joined, minify_css)
    }

    fn embeds(&self, _method: &str) -> bool {
        true
    }

    fn output_uri(&self, _resource: &Resource, optimized: &[u8], config: &PackConfig) -> String {
        content_uri(&config.output.css, "css", optimized)
    }
}
