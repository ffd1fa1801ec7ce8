//! `[post]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [post]
//! delete_originals = true   # remove source files of optimized resources
//! delete_unused = true      # remove resources nothing references
//! gzip = true               # write .gz (and .br with tools.brotli) siblings
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub delete_originals: bool,
    pub delete_unused: bool,
    pub gzip: bool,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            delete_originals: true,
            delete_unused: true,
            gzip: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config = test_parse_config("[post]\ndelete_unused = false\n");
        assert!(config.post.delete_originals);
        assert!(!config.post.delete_unused);
        assert!(config.post.gzip);
    }
}
