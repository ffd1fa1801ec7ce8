//! Stylesheets: `url(...)` references, spliced then minified.

use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use super::is_text;
use crate::analyzer::minify::{filter, minify_css};
use crate::analyzer::{LineIndex, Reference, ResourceAnalyzer, rewrite_spans};
use crate::config::PackConfig;
use crate::store::{Dependency, Resource};
use crate::utils::hash::content_uri;
use crate::utils::path::is_local_reference;

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\burl\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]*))\s*\)"#)
        .expect("valid url regex")
});

pub struct Css;

impl ResourceAnalyzer for Css {
    fn sniff(&self, content: &[u8]) -> bool {
        is_text(content)
    }

    fn must_precompress(&self) -> bool {
        true
    }

    fn find_references(&self, resource: &Resource) -> Result<Vec<Reference>> {
        let content = resource.text()?;
        let index = LineIndex::new(content);
        let refs = URL
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
            .filter(|value| is_local_reference(value.as_str()))
            .map(|value| Reference::path(&index, value.start(), value.as_str(), "css-url"))
            .collect();
        Ok(refs)
    }

    fn optimize(
        &self,
        resource: &Resource,
        deps: &[Dependency],
        config: &PackConfig,
    ) -> Result<Vec<u8>> {
        let spliced = rewrite_spans(&resource.path, resource.text()?, deps)?;
        filter(&config.tools.css, &resource.path, &spliced, minify_css)
    }

    fn output_uri(&self, _resource: &Resource, optimized: &[u8], config: &PackConfig) -> String {
        content_uri(&config.output.css, "css", optimized)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture::{dependency, resource};
    use super::*;
    use crate::analyzer::{ResourceKind, Target};
    use crate::utils::hash::md5_hex;

    const SHEET: &str = r#"@font-face { src: url(data:font/woff2;base64,AAAA); }
.logo { background: url("../img/logo.png") no-repeat; }
.bg { background-image: url( /img/bg.jpg?v=2 ); }
.ext { background: url('https://example.com/a.png'); }
.hash { filter: url(#blur); }
"#;

    #[test]
    fn test_finds_local_urls() {
        let css = resource("/www/css/site.css", SHEET.as_bytes(), ResourceKind::Css);
        let refs = Css.find_references(&css).unwrap();
        let found: Vec<_> = refs.iter().map(|r| (r.line, r.matched.as_str())).collect();
        assert_eq!(found, vec![(2, "../img/logo.png"), (3, "/img/bg.jpg")]);
    }

    #[test]
    fn test_optimize_splices_then_minifies() {
        let css = resource(
            "/www/css/site.css",
            b".a { background: url(a.png); }\n.b { color: red; background-image: url(a.png); }\n",
            ResourceKind::Css,
        );
        let refs = Css.find_references(&css).unwrap();
        assert_eq!(refs.len(), 2);
        let deps: Vec<_> = refs
            .iter()
            .map(|r| dependency(r, "/images/0123.png", b""))
            .collect();

        let config = PackConfig::default();
        let out = Css.optimize(&css, &deps, &config).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("a.png"));
        assert_eq!(out.matches("/images/0123.png").count(), 2);
        assert!(!out.contains('\n'));

        let uri = Css.output_uri(&css, out.as_bytes(), &config);
        assert_eq!(uri, format!("/css/{}.css", md5_hex(out.as_bytes())));
    }

    #[test]
    fn test_fragment_survives_optimization() {
        let css = resource(
            "/www/css/icons.css",
            b".i { background: url(icons.svg#star); }\n",
            ResourceKind::Css,
        );
        let refs = Css.find_references(&css).unwrap();
        assert_eq!(refs[0].matched, "icons.svg");
        assert_eq!(refs[0].target, Target::Path("icons.svg#star".into()));

        let deps = vec![dependency(&refs[0], "/images/b97b.svg", b"<svg/>")];
        let out = Css.optimize(&css, &deps, &PackConfig::default()).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("/images/b97b.svg#star"), "{out}");
    }

    #[test]
    fn test_optimize_requires_optimized_dependencies() {
        let css = resource("/www/a.css", b"a{background:url(x.png)}", ResourceKind::Css);
        let refs = Css.find_references(&css).unwrap();
        let mut dep = dependency(&refs[0], "/x", b"");
        dep.resource.uri_optimized = None;
        let err = Css
            .optimize(&css, &[dep], &PackConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("before it was optimized"));
    }
}
