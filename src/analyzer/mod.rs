//! Per-filetype analyzers.
//!
//! Every syntax gets the same treatment: sniff the file type, find the
//! embedded paths, and later substitute the resolved paths back into the
//! recorded spans. The graph, optimize and rewrite phases only talk to the
//! two traits below, never to a concrete syntax.
//!
//! ```text
//! analyzer/
//! ├── kind.rs       # SourceKind / ResourceKind + static dispatch table
//! ├── registry.rs   # (pattern, kind) bindings, first match wins
//! ├── minify.rs     # built-in CSS / JS minifiers
//! ├── source/       # html, php, sdoc
//! └── resource/     # css, css-list, js, js-main, image, text
//! ```

mod kind;
mod minify;
mod registry;
mod resource;
mod source;

pub use kind::{ResourceKind, SourceKind};
pub use registry::{DEFAULT_RESOURCE_TYPES, DEFAULT_SOURCE_TYPES, Registry};

use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use crate::config::PackConfig;
use crate::error::PackError;
use crate::store::{Dependency, Resource, Source};
use crate::utils::path::strip_query_fragment;

// ============================================================================
// Contracts
// ============================================================================

/// Capability set for documents that reference resources.
pub trait SourceAnalyzer: Sync {
    /// Content check run after the filename pattern matched.
    fn sniff(&self, content: &[u8]) -> bool;

    /// Textual references in document order.
    fn find_references(&self, source: &Source) -> Result<Vec<Reference>>;

    /// Source text with every reference replaced by its dependency's final URI.
    ///
    /// `deps` are in edge order and already optimized.
    fn rewrite(&self, source: &Source, deps: &[Dependency]) -> Result<String> {
        rewrite_spans(&source.path, &source.content, deps)
    }
}

/// Capability set for optimizable assets.
pub trait ResourceAnalyzer: Sync {
    fn sniff(&self, content: &[u8]) -> bool;

    /// Whether outputs of this kind get `.gz` / `.br` siblings.
    fn must_precompress(&self) -> bool;

    /// References to other resources, in content order.
    fn find_references(&self, resource: &Resource) -> Result<Vec<Reference>>;

    /// Optimized bytes for `resource`.
    ///
    /// Every entry of `deps` sits at a lower depth and already carries its
    /// final URI and optimized content.
    fn optimize(
        &self,
        resource: &Resource,
        deps: &[Dependency],
        config: &PackConfig,
    ) -> Result<Vec<u8>>;

    /// Content-addressed URI for the optimized bytes.
    fn output_uri(&self, resource: &Resource, optimized: &[u8], config: &PackConfig) -> String;

    /// Whether references made with `method` copy the target's content into
    /// this resource instead of naming its URI.
    fn embeds(&self, _method: &str) -> bool {
        false
    }
}

// ============================================================================
// References
// ============================================================================

/// One textual reference found by an analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// 1-based line of the span start.
    pub line: usize,
    /// Byte offset of the span in the referrer's content.
    pub offset: usize,
    /// Exact text of the span.
    pub matched: String,
    /// Syntax that produced the match.
    pub method: &'static str,
    pub target: Target,
    /// Analyzer-specific data needed again at rewrite time.
    pub metadata: Value,
}

/// What a reference points at.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A single path as written in the referrer.
    Path(String),
    /// Several paths to be combined into one virtual resource.
    Combine {
        kind: ResourceKind,
        members: Vec<Member>,
    },
}

/// One path of a combine group, with the line it was written on.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub path: String,
    pub line: usize,
}

impl Member {
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

impl Reference {
    /// Reference whose span is the path literal itself. A `?query` or
    /// `#fragment` suffix stays outside the span and survives rewriting.
    pub fn path(index: &LineIndex, offset: usize, raw: &str, method: &'static str) -> Self {
        Self {
            line: index.line_of(offset),
            offset,
            matched: strip_query_fragment(raw).to_string(),
            method,
            target: Target::Path(raw.to_string()),
            metadata: Value::Null,
        }
    }
}

// ============================================================================
// Span helpers
// ============================================================================

/// Newline positions for offset → line lookups.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

/// A replacement for one recorded span.
#[derive(Debug)]
pub struct Substitution<'a> {
    pub offset: usize,
    pub matched: &'a str,
    pub replacement: String,
}

/// Apply span substitutions to `content`.
///
/// Each span is checked against its recorded text; overlapping spans are
/// rejected. Identical literals at different offsets are replaced
/// independently.
pub fn splice(file: &Path, content: &str, mut subs: Vec<Substitution<'_>>) -> Result<String> {
    subs.sort_by_key(|s| s.offset);

    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for sub in subs {
        if sub.offset < cursor {
            return Err(PackError::OverlappingSpans {
                file: file.to_path_buf(),
                offset: sub.offset,
            }
            .into());
        }
        let end = sub.offset + sub.matched.len();
        if content.get(sub.offset..end) != Some(sub.matched) {
            return Err(PackError::SpanMismatch {
                file: file.to_path_buf(),
                offset: sub.offset,
                expected: sub.matched.to_string(),
            }
            .into());
        }
        out.push_str(&content[cursor..sub.offset]);
        out.push_str(&sub.replacement);
        cursor = end;
    }
    out.push_str(&content[cursor..]);
    Ok(out)
}

/// Replace every dependency's span with the dependency's final URI.
pub fn rewrite_spans(file: &Path, content: &str, deps: &[Dependency]) -> Result<String> {
    let subs = deps
        .iter()
        .map(|dep| {
            Ok(Substitution {
                offset: dep.edge.offset,
                matched: &dep.edge.matched,
                replacement: dep.uri(file)?.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    splice(file, content, subs)
}
