//! `[paths]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! sources = ["src"]        # directories scanned for source documents
//! resources = "www"        # resource root (web root)
//! store = ".hashpack.db"   # optional; omitted = in-memory store
//! ```
//!
//! Relative paths resolve against the directory holding `hashpack.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::utils::path::normalize_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub sources: Vec<PathBuf>,
    pub resources: PathBuf,
    pub store: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sources: vec![PathBuf::from("src")],
            resources: PathBuf::from("www"),
            store: None,
        }
    }
}

impl PathsConfig {
    const SOURCES: FieldPath = FieldPath::new("paths.sources");
    const RESOURCES: FieldPath = FieldPath::new("paths.resources");

    /// Make every path absolute against `root`.
    pub fn normalize(&mut self, root: &Path) {
        self.sources = self
            .sources
            .iter()
            .map(|dir| normalize_path(&root.join(dir)))
            .collect();
        self.resources = normalize_path(&root.join(&self.resources));
        if let Some(store) = self.store.take() {
            self.store = Some(Self::normalize_store_path(&store, root));
        }
    }

    /// Store path with tilde expansion.
    fn normalize_store_path(path: &Path, root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);
        let full_path = if path.is_relative() {
            root.join(&path)
        } else {
            path
        };
        normalize_path(&full_path)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.sources.is_empty() {
            diag.error(Self::SOURCES, "at least one source directory is required");
        }
        for dir in &self.sources {
            if !dir.is_dir() {
                diag.error(
                    Self::SOURCES,
                    format!("directory `{}` not found", dir.display()),
                );
            }
        }
        if !self.resources.is_dir() {
            diag.error_with_hint(
                Self::RESOURCES,
                format!("directory `{}` not found", self.resources.display()),
                "point it at the web root holding css, js and images",
            );
        }
    }
}
