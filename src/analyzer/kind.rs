//! Closed sets of file kinds and their analyzers.
//!
//! Kinds are persisted as short tags (`"css"`, `"js-main"`, ...) in the
//! store and in `[types]` config bindings.

use std::fmt;
use std::str::FromStr;

use super::resource::{CSS, CSS_LIST, IMAGE, JS, JS_MAIN, TEXT};
use super::source::{HTML, PHP, SDOC};
use super::{ResourceAnalyzer, SourceAnalyzer};
use crate::error::PackError;

/// Kind of source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Html,
    PhpLike,
    SDoc,
}

impl SourceKind {
    pub const ALL: [Self; 3] = [Self::Html, Self::PhpLike, Self::SDoc];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::PhpLike => "php",
            Self::SDoc => "sdoc",
        }
    }

    pub fn analyzer(self) -> &'static dyn SourceAnalyzer {
        match self {
            Self::Html => &HTML,
            Self::PhpLike => &PHP,
            Self::SDoc => &SDOC,
        }
    }
}

/// Kind of resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Css,
    /// Virtual list of stylesheets combined into one output.
    CssList,
    Js,
    /// Entry module bundled together with the modules it requires.
    JsMain,
    Image,
    Text,
}

impl ResourceKind {
    pub const ALL: [Self; 6] = [
        Self::Css,
        Self::CssList,
        Self::Js,
        Self::JsMain,
        Self::Image,
        Self::Text,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::CssList => "css-list",
            Self::Js => "js",
            Self::JsMain => "js-main",
            Self::Image => "image",
            Self::Text => "text",
        }
    }

    /// Virtual resources have no file on disk.
    pub const fn is_virtual(self) -> bool {
        matches!(self, Self::CssList)
    }

    pub fn analyzer(self) -> &'static dyn ResourceAnalyzer {
        match self {
            Self::Css => &CSS,
            Self::CssList => &CSS_LIST,
            Self::Js => &JS,
            Self::JsMain => &JS_MAIN,
            Self::Image => &IMAGE,
            Self::Text => &TEXT,
        }
    }
}

impl FromStr for SourceKind {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| PackError::UnknownKind {
                family: "source",
                tag: s.to_string(),
            })
    }
}

impl FromStr for ResourceKind {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| PackError::UnknownKind {
                family: "resource",
                tag: s.to_string(),
            })
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
