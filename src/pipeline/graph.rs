//! Reference graph builder.
//!
//! Sources first (Link1), then resources (Link2), both in path order. A
//! combine reference materializes a virtual css-list resource before the
//! resource pass, so its members are linked like any other resource's.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::analyzer::{Member, Reference, ResourceKind, Target};
use crate::config::PackConfig;
use crate::error::PackError;
use crate::store::Store;
use crate::utils::hash::md5_hex;
use crate::utils::path::resolve_reference;

/// Edge counts written by [`build`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GraphSummary {
    pub link1: usize,
    pub link2: usize,
    /// Virtual resources created for combine groups.
    pub virtual_resources: usize,
}

pub fn build(config: &PackConfig, store: &Store) -> Result<GraphSummary> {
    let mut summary = GraphSummary::default();

    for source in store.sources()? {
        let refs = source
            .kind
            .analyzer()
            .find_references(&source)
            .with_context(|| format!("Failed to analyze {}", source.path.display()))?;
        for reference in refs {
            let to = match &reference.target {
                Target::Path(raw) => resolve(config, store, &source.path, &reference, raw)?,
                Target::Combine { kind, members } => {
                    let (id, created) =
                        combine(config, store, &source.path, *kind, members)?;
                    summary.virtual_resources += usize::from(created);
                    id
                }
            };
            store.insert_link1(source.id, to, &reference)?;
            summary.link1 += 1;
        }
    }

    for resource in store.resources()? {
        let refs = resource
            .kind
            .analyzer()
            .find_references(&resource)
            .with_context(|| format!("Failed to analyze {}", resource.path.display()))?;
        for reference in refs {
            let Target::Path(raw) = &reference.target else {
                // Only sources combine.
                continue;
            };
            let to = resolve(config, store, &resource.path, &reference, raw)?;
            store.insert_link2(resource.id, to, &reference)?;
            summary.link2 += 1;
        }
    }

    Ok(summary)
}

/// Resource id for a raw reference, or `UnresolvedReference`.
fn resolve(
    config: &PackConfig,
    store: &Store,
    referrer: &Path,
    reference: &Reference,
    raw: &str,
) -> Result<i64> {
    let path = resolve_reference(raw, referrer, &config.paths.resources);
    match store.resource_by_path(&path)? {
        Some(resource) => Ok(resource.id),
        None => Err(unresolved(referrer, reference.line, &reference.matched, path).into()),
    }
}

fn unresolved(referrer: &Path, line: usize, matched: &str, path: PathBuf) -> PackError {
    PackError::UnresolvedReference {
        file: referrer.to_path_buf(),
        line,
        matched: matched.to_string(),
        path,
    }
}

/// Find or create the virtual resource for a combine group.
///
/// Every member must already be a resource. Identical groups in the same
/// directory share one row.
fn combine(
    config: &PackConfig,
    store: &Store,
    referrer: &Path,
    kind: ResourceKind,
    members: &[Member],
) -> Result<(i64, bool)> {
    let mut list = String::new();
    for member in members {
        let path = resolve_reference(&member.path, referrer, &config.paths.resources);
        if store.resource_by_path(&path)?.is_none() {
            return Err(unresolved(referrer, member.line, &member.path, path).into());
        }
        list.push_str(&member.path);
        list.push('\n');
    }

    let dir = referrer.parent().unwrap_or(Path::new("/"));
    let path = dir.join(format!(".{}.csslist", md5_hex(&list)));

    if let Some(existing) = store.resource_by_path(&path)? {
        return Ok((existing.id, false));
    }
    let id = store.insert_resource(&path, 0, list.as_bytes(), kind)?;
    Ok((id, true))
}
