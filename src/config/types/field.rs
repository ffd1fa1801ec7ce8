//! Dotted TOML key that a diagnostic points at.

use owo_colors::OwoColorize;
use std::fmt;

/// `section.key`, e.g. `tools.css`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(&'static str);

impl FieldPath {
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[cfg(test)]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// Table the key lives in: `tools` for `tools.css`.
    pub fn section(self) -> &'static str {
        self.0.split_once('.').map_or(self.0, |(section, _)| section)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = format!("[{}] {}", self.section(), self.0);
        write!(f, "{}", shown.bright_blue())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_of_dotted_key() {
        assert_eq!(FieldPath::new("paths.resources").section(), "paths");
        assert_eq!(FieldPath::new("types").section(), "types");
    }
}
