//! `[types]` section configuration.
//!
//! Bindings map filename patterns to kinds; the first binding whose
//! pattern matches and whose analyzer accepts the content wins. A
//! non-empty list replaces the built-in bindings of that family.
//!
//! # Example
//!
//! ```toml
//! [[types.sources]]
//! pattern = '\.tpl$'
//! kind = "html"
//!
//! [[types.resources]]
//! pattern = '\.bundle\.js$'
//! kind = "js-main"
//! ```

use std::str::FromStr;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analyzer::{DEFAULT_RESOURCE_TYPES, DEFAULT_SOURCE_TYPES, ResourceKind, SourceKind};
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::error::PackError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesConfig {
    pub sources: Vec<TypeBinding>,
    pub resources: Vec<TypeBinding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeBinding {
    pub pattern: String,
    pub kind: String,
}

impl TypesConfig {
    const SOURCES: FieldPath = FieldPath::new("types.sources");
    const RESOURCES: FieldPath = FieldPath::new("types.resources");

    /// Effective source bindings, in match order.
    pub fn source_bindings(&self) -> Result<Vec<(String, SourceKind)>> {
        resolve(&self.sources, DEFAULT_SOURCE_TYPES)
    }

    /// Effective resource bindings, in match order.
    pub fn resource_bindings(&self) -> Result<Vec<(String, ResourceKind)>> {
        resolve(&self.resources, DEFAULT_RESOURCE_TYPES)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        check::<SourceKind>(&self.sources, Self::SOURCES, diag);
        check::<ResourceKind>(&self.resources, Self::RESOURCES, diag);
    }
}

fn resolve<K>(bindings: &[TypeBinding], defaults: &[(&str, K)]) -> Result<Vec<(String, K)>>
where
    K: FromStr<Err = PackError> + Copy,
{
    if bindings.is_empty() {
        return Ok(defaults
            .iter()
            .map(|(pattern, kind)| ((*pattern).to_string(), *kind))
            .collect());
    }
    bindings
        .iter()
        .map(|b| Ok((b.pattern.clone(), b.kind.parse()?)))
        .collect()
}

fn check<K>(bindings: &[TypeBinding], field: FieldPath, diag: &mut ConfigDiagnostics)
where
    K: FromStr<Err = PackError>,
{
    for binding in bindings {
        if let Err(e) = Regex::new(&binding.pattern) {
            diag.error(field, format!("invalid pattern `{}`: {e}", binding.pattern));
        }
        if let Err(e) = binding.kind.parse::<K>() {
            diag.error(field, e.to_string());
        }
    }
}
