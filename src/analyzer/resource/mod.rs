//! Resource analyzers.

mod css;
mod css_list;
mod image;
mod js;
mod js_main;
mod text;

pub use css::Css;
pub use css_list::CssList;
pub use image::Image;
pub use js::Js;
pub use js_main::JsMain;
pub use text::Text;

use std::path::Path;

pub static CSS: Css = Css;
pub static CSS_LIST: CssList = CssList;
pub static JS: Js = Js;
pub static JS_MAIN: JsMain = JsMain;
pub static IMAGE: Image = Image;
pub static TEXT: Text = Text;

fn is_text(content: &[u8]) -> bool {
    std::str::from_utf8(content).is_ok()
}

/// Lowercased file extension, empty when there is none.
fn extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod fixture {
    use std::path::PathBuf;

    use serde_json::Value;

    use crate::analyzer::{Reference, ResourceKind};
    use crate::store::{Dependency, Edge, Resource};

    pub fn resource(path: &str, content: &[u8], kind: ResourceKind) -> Resource {
        Resource {
            id: 1,
            path: PathBuf::from(path),
            content: content.to_vec(),
            content_optimized: None,
            uri_optimized: None,
            depth: Some(1),
            kind,
        }
    }

    /// Optimized dependency for `reference`.
    pub fn dependency(reference: &Reference, uri: &str, optimized: &[u8]) -> Dependency {
        let mut target = resource("/www/dep", b"", ResourceKind::Text);
        target.content_optimized = Some(optimized.to_vec());
        target.uri_optimized = Some(uri.to_string());
        Dependency {
            edge: Edge {
                id: 1,
                from: 1,
                to: 2,
                line: reference.line,
                offset: reference.offset,
                matched: reference.matched.clone(),
                method: reference.method.to_string(),
                metadata: Value::Null,
            },
            resource: target,
        }
    }
}
