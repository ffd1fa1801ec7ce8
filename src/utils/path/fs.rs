//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `resolve_reference` - turn a raw reference into the path it names

use std::path::{Component, Path, PathBuf};

use super::route::strip_query_fragment;

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to a lexical cleanup of the absolute path, so a missing file
/// still produces a readable path for error messages.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        };
        clean(&absolute)
    })
}

/// Resolve a raw reference found in `referrer` to a filesystem path.
///
/// - `?query` / `#fragment` suffixes are dropped
/// - a leading `/` is rooted at `resource_root`
/// - anything else is relative to the referrer's directory
///
/// # Example
/// ```ignore
/// // www/css/site.css contains url(../img/a.png)
/// resolve_reference("../img/a.png", Path::new("/p/www/css/site.css"), Path::new("/p/www"));
/// // -> /p/www/img/a.png
/// ```
pub fn resolve_reference(raw: &str, referrer: &Path, resource_root: &Path) -> PathBuf {
    let raw = strip_query_fragment(raw.trim());
    let joined = match raw.strip_prefix('/') {
        Some(rooted) => resource_root.join(rooted),
        None => referrer
            .parent()
            .map_or_else(|| PathBuf::from(raw), |dir| dir.join(raw)),
    };
    normalize_path(&joined)
}

/// Lexically remove `.` and `..` components.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
