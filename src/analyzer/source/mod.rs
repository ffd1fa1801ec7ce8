//! Source document analyzers.

mod html;
mod php;
mod sdoc;

pub use html::Html;
pub use php::PhpLike;
pub use sdoc::SDoc;

pub static HTML: Html = Html;
pub static PHP: PhpLike = PhpLike;
pub static SDOC: SDoc = SDoc;

/// Sources are text documents.
fn is_text(content: &[u8]) -> bool {
    std::str::from_utf8(content).is_ok()
}

#[cfg(test)]
fn test_source(content: &str, kind: crate::analyzer::SourceKind) -> crate::store::Source {
    crate::store::Source {
        id: 1,
        path: std::path::PathBuf::from("/src/page"),
        content: content.to_string(),
        kind,
    }
}
