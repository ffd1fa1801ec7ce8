//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization and reference resolution
//! - [`route`]: Reference string classification (`is_local_reference`, `strip_query_fragment`)

pub mod fs;
pub mod route;

pub use fs::{normalize_path, resolve_reference};
pub use route::{is_local_reference, strip_query_fragment};
