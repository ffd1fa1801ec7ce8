//! Post-processing: materialize outputs, clean up originals and unused
//! resources, write pre-compressed siblings.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use rustc_hash::FxHashSet;

use crate::config::PackConfig;
use crate::debug;
use crate::store::{Resource, Store};
use crate::utils::exec::Cmd;

/// What post-processing did on disk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PostSummary {
    pub written: usize,
    /// Targets that already held identical bytes.
    pub unchanged: usize,
    /// Outputs only ever copied into other outputs, never written alone.
    pub embedded: usize,
    pub deleted_originals: usize,
    pub deleted_unused: usize,
    pub compressed: usize,
}

pub fn run(config: &PackConfig, store: &mut Store) -> Result<PostSummary> {
    let mut summary = PostSummary::default();
    let mut outputs = Vec::new();
    let mut published: Vec<(Resource, PathBuf)> = Vec::new();
    for resource in store.optimized_outputs()? {
        let Some(uri) = resource.uri_optimized.as_deref() else {
            continue;
        };
        let target = target_path(config, uri);
        if is_embedded_only(store, &resource)? {
            summary.embedded += 1;
            outputs.push(resource);
        } else {
            outputs.push(resource.clone());
            published.push((resource, target));
        }
    }
    let targets: FxHashSet<&Path> = published.iter().map(|(_, t)| t.as_path()).collect();

    if config.post.delete_originals {
        for resource in &outputs {
            if resource.kind.is_virtual() || targets.contains(resource.path.as_path()) {
                continue;
            }
            if remove(&resource.path)? {
                summary.deleted_originals += 1;
            }
        }
    }

    for (resource, target) in &published {
        let content = resource.content_optimized.as_deref().unwrap_or_default();
        if write_if_changed(target, content)? {
            debug!("write"; "{}", config.root_relative(target).display());
            summary.written += 1;
        } else {
            summary.unchanged += 1;
        }
    }

    if config.post.delete_unused {
        for resource in store.unused_resources()? {
            let path = resource.path.as_path();
            if !resource.kind.is_virtual() && !targets.contains(path) && remove(path)? {
                debug!("unused"; "{}", config.root_relative(path).display());
                summary.deleted_unused += 1;
                for suffix in [".gz", ".br"] {
                    remove(&sibling(path, suffix))?;
                }
            }
            store.delete_resource(resource.id)?;
        }
    }

    if config.post.gzip {
        let mut done = FxHashSet::default();
        for (resource, target) in &published {
            if !resource.kind.analyzer().must_precompress() || !done.insert(target.as_path()) {
                continue;
            }
            let content = resource.content_optimized.as_deref().unwrap_or_default();
            summary.compressed += precompress(config, target, content)?;
        }
    }

    Ok(summary)
}

/// Every layered referrer copies the content in; nothing names the URI.
fn is_embedded_only(store: &Store, resource: &Resource) -> Result<bool> {
    let referrers = store.referrers(resource.id)?;
    Ok(!referrers.is_empty()
        && referrers.iter().all(|(kind, method)| {
            kind.is_some_and(|kind| kind.analyzer().embeds(method))
        }))
}

/// Output location of a URI under the resource root.
fn target_path(config: &PackConfig, uri: &str) -> PathBuf {
    config.paths.resources.join(uri.trim_start_matches('/'))
}

/// Write `.gz` and `.br` siblings that are strictly smaller than `content`.
/// Returns the number of siblings written.
fn precompress(config: &PackConfig, target: &Path, content: &[u8]) -> Result<usize> {
    let mut written = 0;

    let gz = gzip(content).with_context(|| format!("Failed to gzip {}", target.display()))?;
    if gz.len() < content.len() {
        write_if_changed(&sibling(target, ".gz"), &gz)?;
        written += 1;
    }

    if !config.tools.brotli.is_empty() {
        let br = Cmd::from_slice(&config.tools.brotli)
            .stdin(content)
            .run()?;
        if br.len() < content.len() {
            write_if_changed(&sibling(target, ".br"), &br)?;
            written += 1;
        }
    }

    Ok(written)
}

fn gzip(input: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(input)?;
    encoder.finish()
}

/// `target` with `suffix` appended to its file name.
fn sibling(target: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Write `content` unless `path` already holds exactly these bytes.
fn write_if_changed(path: &Path, content: &[u8]) -> Result<bool> {
    if fs::read(path).is_ok_and(|existing| existing == content) {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

/// Remove a file if it exists. Returns whether anything was removed.
fn remove(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to delete {}", path.display())),
    }
}
