//! `[output]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [output]
//! css = "css"         # -> /css/<md5>.css
//! js = "js"
//! images = "images"
//! text = "text"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// URI directories of optimized outputs, relative to the resource root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub css: String,
    pub js: String,
    pub images: String,
    pub text: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            css: "css".into(),
            js: "js".into(),
            images: "images".into(),
            text: "text".into(),
        }
    }
}

impl OutputConfig {
    /// Output directories must stay inside the resource root.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let dirs = [
            (FieldPath::new("output.css"), &self.css),
            (FieldPath::new("output.js"), &self.js),
            (FieldPath::new("output.images"), &self.images),
            (FieldPath::new("output.text"), &self.text),
        ];
        for (field, dir) in dirs {
            if dir.split('/').any(|part| part == "..") {
                diag.error_with_hint(
                    field,
                    format!("`{dir}` leaves the resource root"),
                    "use a directory below the resource root",
                );
            }
        }
    }
}
