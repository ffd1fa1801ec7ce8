//! Built-in minifiers.
//!
//! oxc for JavaScript, lightningcss for CSS. A configured external command
//! replaces them per kind (see [`filter`]).

use std::path::Path;

use anyhow::Result;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, CompressOptionsUnused, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::error::PackError;
use crate::utils::exec::Cmd;

/// Minify a classic script.
///
/// Top-level declarations are globals: they keep their names and are never
/// dropped as unused.
pub fn minify_js(path: &Path, source: &str) -> Result<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::script()).parse();
    if let Some(first) = ret.errors.first() {
        return Err(PackError::Minify {
            path: path.to_path_buf(),
            reason: first.to_string(),
        }
        .into());
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: Some(false),
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions {
            unused: CompressOptionsUnused::Keep,
            ..CompressOptions::smallest()
        }),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify a stylesheet.
pub fn minify_css(path: &Path, source: &str) -> Result<String> {
    let fail = |reason: String| PackError::Minify {
        path: path.to_path_buf(),
        reason,
    };
    let stylesheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| fail(e.to_string()))?;
    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| fail(e.to_string()))?;
    Ok(printed.code)
}

/// Run `input` through `tool` when one is configured, else through `builtin`.
pub fn filter(
    tool: &[String],
    path: &Path,
    input: &str,
    builtin: fn(&Path, &str) -> Result<String>,
) -> Result<Vec<u8>> {
    if tool.is_empty() {
        return builtin(path, input).map(String::into_bytes);
    }
    Ok(Cmd::from_slice(tool).stdin(input).run()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let out = minify_css(Path::new("a.css"), "body {\n  color: red;\n}\n").unwrap();
        assert_eq!(out, "body{color:red}");
    }

    #[test]
    fn test_minify_js_strips_whitespace_and_comments() {
        let src = "// banner\nvar answer = 40 + 2;\nconsole.log(answer);\n";
        let out = minify_js(Path::new("a.js"), src).unwrap();
        assert!(!out.contains("banner"));
        assert!(out.len() < src.len());
        assert!(out.contains("console.log"));
    }

    #[test]
    fn test_minify_js_keeps_globals() {
        let src = "function greet() { alert('hi'); }\nvar counter = 0;\n";
        let out = minify_js(Path::new("lib.js"), src).unwrap();
        assert!(out.contains("greet"), "{out}");
        assert!(out.contains("counter"), "{out}");
        assert!(out.contains("alert"), "{out}");
    }

    #[test]
    fn test_minify_js_parse_error() {
        let err = minify_js(Path::new("broken.js"), "function (").unwrap_err();
        match err.downcast_ref::<PackError>() {
            Some(PackError::Minify { path, .. }) => assert_eq!(path, Path::new("broken.js")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_filter_uses_external_tool() {
        let tool = vec!["tr".to_string(), "a-z".to_string(), "A-Z".to_string()];
        let out = filter(&tool, Path::new("a.css"), "abc", minify_css).unwrap();
        assert_eq!(out, b"ABC");
    }

    #[test]
    fn test_filter_defaults_to_builtin() {
        let out = filter(&[], Path::new("a.css"), "a { margin: 0 }", minify_css).unwrap();
        assert_eq!(out, b"a{margin:0}");
    }
}
