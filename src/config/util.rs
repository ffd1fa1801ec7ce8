//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`.
///
/// Returns the path to the first `config_name` found in `start` or one of
/// its ancestors. An absolute `config_name` is used as-is when it exists.
///
/// # Example
/// ```text
/// /home/user/site/src/templates/  ← start
/// /home/user/site/hashpack.toml   ← found
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}
