//! PHP-like templates.
//!
//! Stylesheets and scripts are registered with one call per line:
//!
//! ```text
//! $this->appendCssSource('/css/reset.css');
//! $this->appendCssSource('/css/site.css');
//! $this->appendJsSource("/js/app.main.js");
//! ```
//!
//! Two or more `appendCssSource` lines in a row on the same receiver form a
//! group that is served as one combined stylesheet; the rewrite collapses
//! the group into a single call. Asset tags in the template markup are
//! handled like HTML.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use serde_json::json;

use super::html::tag_references;
use super::is_text;
use crate::analyzer::{
    LineIndex, Member, Reference, ResourceKind, SourceAnalyzer, Substitution, Target, splice,
};
use crate::store::{Dependency, Source};
use crate::utils::path::is_local_reference;

static CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(\$?[A-Za-z_\\][A-Za-z0-9_\\]*)(->|::)(appendCssSource|appendJsSource)\(\s*(?:'([^']+)'|"([^"]+)")\s*\)\s*;"#,
    )
    .expect("valid call regex")
});

const CSS_CALL: &str = "appendCssSource";

pub struct PhpLike;

/// One matched call line.
struct Call<'a> {
    /// Byte offset of the receiver.
    start: usize,
    /// Byte offset just past the `;`.
    end: usize,
    receiver: &'a str,
    op: &'a str,
    method: &'a str,
    quote: char,
    /// Path literal and its byte offset.
    path: &'a str,
    path_offset: usize,
}

impl<'a> Call<'a> {
    fn parse(line: &'a str, line_start: usize) -> Option<Self> {
        let caps: Captures<'a> = CALL.captures(line)?;
        let whole = caps.get(0)?;
        let receiver = caps.get(1)?;
        let (path, quote) = match caps.get(4) {
            Some(single) => (single, '\''),
            None => (caps.get(5)?, '"'),
        };
        // Only whitespace may follow the call.
        if !line[whole.end()..].trim().is_empty() {
            return None;
        }
        Some(Self {
            start: line_start + receiver.start(),
            end: line_start + whole.end(),
            receiver: receiver.as_str(),
            op: caps.get(2)?.as_str(),
            method: caps.get(3)?.as_str(),
            quote,
            path: path.as_str(),
            path_offset: line_start + path.start(),
        })
    }

    fn joins(&self, previous: &Call<'_>) -> bool {
        self.method == CSS_CALL
            && previous.method == CSS_CALL
            && self.receiver == previous.receiver
            && self.op == previous.op
    }
}

impl SourceAnalyzer for PhpLike {
    fn sniff(&self, content: &[u8]) -> bool {
        is_text(content)
    }

    fn find_references(&self, source: &Source) -> Result<Vec<Reference>> {
        let content = source.content.as_str();
        let index = LineIndex::new(content);

        // Consecutive call lines, split into runs that can be combined.
        let mut runs: Vec<Vec<Call<'_>>> = Vec::new();
        let mut previous_line_was_call = false;
        let mut line_start = 0;
        for line in content.split_inclusive('\n') {
            let call = Call::parse(line.trim_end_matches(['\n', '\r']), line_start)
                .filter(|c| is_local_reference(c.path));
            line_start += line.len();

            let Some(call) = call else {
                previous_line_was_call = false;
                continue;
            };
            match runs.last_mut() {
                Some(run)
                    if previous_line_was_call
                        && run.last().is_some_and(|last| call.joins(last)) =>
                {
                    run.push(call)
                }
                _ => runs.push(vec![call]),
            }
            previous_line_was_call = true;
        }

        let mut refs: Vec<Reference> = runs
            .into_iter()
            .flat_map(|run| run_references(content, &index, run))
            .collect();
        refs.extend(tag_references(content, &index));
        refs.sort_by_key(|r| r.offset);
        Ok(refs)
    }

    fn rewrite(&self, source: &Source, deps: &[Dependency]) -> Result<String> {
        let subs = deps
            .iter()
            .map(|dep| {
                let uri = dep.uri(&source.path)?;
                let replacement = if dep.edge.method == "php-group" {
                    group_call(dep, uri).with_context(|| {
                        format!(
                            "{}:{}: malformed group reference",
                            source.path.display(),
                            dep.edge.line
                        )
                    })?
                } else {
                    uri.to_string()
                };
                Ok(Substitution {
                    offset: dep.edge.offset,
                    matched: &dep.edge.matched,
                    replacement,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        splice(&source.path, &source.content, subs)
    }
}

fn run_references(content: &str, index: &LineIndex, run: Vec<Call<'_>>) -> Vec<Reference> {
    if run.len() < 2 {
        return run
            .into_iter()
            .map(|call| Reference::path(index, call.path_offset, call.path, "php-call"))
            .collect();
    }

    let first = &run[0];
    let start = first.start;
    let end = run.last().map_or(first.end, |last| last.end);
    vec![Reference {
        line: index.line_of(start),
        offset: start,
        matched: content[start..end].to_string(),
        method: "php-group",
        target: Target::Combine {
            kind: ResourceKind::CssList,
            members: run
                .iter()
                .map(|call| Member::new(call.path, index.line_of(call.path_offset)))
                .collect(),
        },
        metadata: json!({
            "receiver": first.receiver,
            "op": first.op,
            "method": first.method,
            "quote": first.quote.to_string(),
        }),
    }]
}

/// Single call standing in for a whole group.
fn group_call(dep: &Dependency, uri: &str) -> Option<String> {
    let meta = &dep.edge.metadata;
    let field = |key: &str| meta.get(key).and_then(|v| v.as_str());
    let quote = field("quote")?;
    Some(format!(
        "{}{}{}({quote}{uri}{quote});",
        field("receiver")?,
        field("op")?,
        field("method")?,
    ))
}
