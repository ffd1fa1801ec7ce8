//! `[tools]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [tools]
//! css = ["cleancss"]            # replaces the built-in CSS minifier
//! js = ["terser", "--compress"] # replaces the built-in JS minifier
//! image = ["pngquant", "-"]     # images are copied unchanged without one
//! brotli = ["brotli", "-c"]     # enables .br siblings
//! ```
//!
//! Every command reads the input on stdin and writes the result to stdout.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub css: Vec<String>,
    pub js: Vec<String>,
    pub image: Vec<String>,
    pub brotli: Vec<String>,
}

impl ToolsConfig {
    /// Configured commands must be installed.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let tools = [
            (FieldPath::new("tools.css"), &self.css),
            (FieldPath::new("tools.js"), &self.js),
            (FieldPath::new("tools.image"), &self.image),
            (FieldPath::new("tools.brotli"), &self.brotli),
        ];
        for (field, command) in tools {
            let Some(program) = command.first() else {
                continue;
            };
            if which::which(program).is_err() {
                diag.error_with_hint(
                    field,
                    format!("`{program}` not found"),
                    format!("install the command or clear {field}"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_empty_means_builtin() {
        let config = test_parse_config("");
        assert!(config.tools.css.is_empty());
        let mut diag = ConfigDiagnostics::new();
        config.tools.validate(&mut diag);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_missing_command() {
        let config = test_parse_config(
            "[tools]\ncss = [\"hashpack-no-such-minifier\"]\nbrotli = [\"sh\", \"-c\", \"cat\"]\n",
        );
        let mut diag = ConfigDiagnostics::new();
        config.tools.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
        assert_eq!(diag.errors()[0].field.as_str(), "tools.css");
    }
}
