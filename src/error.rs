//! Typed pipeline failures.
//!
//! Phases propagate with `anyhow`; these variants are the failures callers
//! (and tests) care to tell apart via `downcast_ref::<PackError>()`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackError {
    /// A source or resource names a path that is not a known resource.
    #[error("{}:{line}: unresolved reference `{matched}` (no resource at `{}`)", file.display(), path.display())]
    UnresolvedReference {
        file: PathBuf,
        line: usize,
        matched: String,
        path: PathBuf,
    },

    /// Resources referenced by a source never received a depth.
    #[error("dependency cycle blocks {}", PathList(paths))]
    DependencyCycle { paths: Vec<PathBuf> },

    /// A dependency was handed to an optimizer or rewriter before it was optimized.
    #[error("`{}` is used by `{}` before it was optimized", dependency.display(), user.display())]
    NotOptimized { user: PathBuf, dependency: PathBuf },

    /// A resource row was optimized twice.
    #[error("`{}` was already optimized", path.display())]
    AlreadyOptimized { path: PathBuf },

    /// The recorded span no longer holds the recorded text.
    #[error("{}: expected `{expected}` at byte {offset}", file.display())]
    SpanMismatch {
        file: PathBuf,
        offset: usize,
        expected: String,
    },

    /// Two substitutions claim overlapping bytes.
    #[error("{}: overlapping references at byte {offset}", file.display())]
    OverlappingSpans { file: PathBuf, offset: usize },

    /// The built-in minifier rejected the input.
    #[error("cannot minify `{}`: {reason}", path.display())]
    Minify { path: PathBuf, reason: String },

    /// A kind tag read from the store or config is not part of the closed set.
    #[error("unknown {family} kind `{tag}`")]
    UnknownKind { family: &'static str, tag: String },
}

/// Display helper for a list of paths.
struct PathList<'a>(&'a [PathBuf]);

impl fmt::Display for PathList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}
