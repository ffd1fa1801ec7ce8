//! Entry scripts (`*.main.js`) bundled with the modules they `require`.
//!
//! The bundle is a small module runtime wrapped around the main code, fed
//! a table of the required modules keyed by their final URIs:
//!
//! ```text
//! (function(modules){ ...runtime...; <main code> })({
//!     "/js/<md5>.js": function(module, exports, require){ <module code> },
//! });
//! ```
//!
//! Modules are bundled one level deep: a module that requires others has
//! to be an entry script itself.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use rustc_hash::FxHashSet;

use super::is_text;
use super::js::literal_references;
use crate::analyzer::minify::{filter, minify_js};
use crate::analyzer::{LineIndex, Reference, ResourceAnalyzer, Target, rewrite_spans};
use crate::config::PackConfig;
use crate::store::{Dependency, Resource};
use crate::utils::hash::content_uri;

static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\(\s*(?:"([^"]+)"|'([^']+)')\s*\)"#).expect("valid require regex")
});

const METHOD: &str = "js-require";

const RUNTIME: &str = "var cache={};\
function require(name){\
if(!Object.prototype.hasOwnProperty.call(cache,name)){\
var module={exports:{}};cache[name]=module;\
modules[name].call(module.exports,module,module.exports,require);\
}\
return cache[name].exports;\
}\n";

pub struct JsMain;

impl ResourceAnalyzer for JsMain {
    fn sniff(&self, content: &[u8]) -> bool {
        is_text(content) && REQUIRE.is_match(&String::from_utf8_lossy(content))
    }

    fn must_precompress(&self) -> bool {
        true
    }

    fn find_references(&self, resource: &Resource) -> Result<Vec<Reference>> {
        let content = resource.text()?;
        let index = LineIndex::new(content);
        // An image literal inside `require(...)` is spliced as a plain URI,
        // not bundled.
        let mut refs = literal_references(content, &index);
        refs.extend(
            REQUIRE
                .captures_iter(content)
                .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
                .map(|name| {
                    let mut reference =
                        Reference::path(&index, name.start(), name.as_str(), METHOD);
                    reference.target = Target::Path(module_path(name.as_str()));
                    reference
                }),
        );
        refs.sort_by_key(|r| r.offset);
        refs.dedup_by_key(|r| r.offset);
        Ok(refs)
    }

    fn optimize(
        &self,
        resource: &Resource,
        deps: &[Dependency],
        config: &PackConfig,
    ) -> Result<Vec<u8>> {
        let main = rewrite_spans(&resource.path, resource.text()?, deps)?;

        let mut bundle = String::with_capacity(main.len() * 2);
        bundle.push_str("(function(modules){\n");
        bundle.push_str(RUNTIME);
        bundle.push_str(&main);
        bundle.push_str("\n})({");

        let mut seen = FxHashSet::default();
        for dep in deps.iter().filter(|d| d.edge.method == METHOD) {
            if !seen.insert(dep.resource.id) {
                continue;
            }
            let key = serde_json::to_string(dep.uri(&resource.path)?)?;
            bundle.push_str(&key);
            bundle.push_str(":function(module,exports,require){\n");
            bundle.push_str(dep.resource.optimized_text()?);
            bundle.push_str("\n},");
        }
        bundle.push_str("});\n");

        filter(&config.tools.js, &resource.path, &bundle, minify_js)
    }

    fn output_uri(&self, _resource: &Resource, optimized: &[u8], config: &PackConfig) -> String {
        content_uri(&config.output.js, "js", optimized)
    }

    fn embeds(&self, method: &str) -> bool {
        method == METHOD
    }
}

/// `./util` names `./util.js`.
fn module_path(name: &str) -> String {
    let has_extension = Path::new(name)
        .file_name()
        .is_some_and(|file| Path::new(file).extension().is_some());
    if has_extension {
        name.to_string()
    } else {
        format!("{name}.js")
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixture::{dependency, resource};
    use super::*;
    use crate::analyzer::ResourceKind;

    const MAIN: &str = r#"var util = require("./util");
var dom = require('./lib/dom.js');
var again = require("./util");
util.show(dom, "/img/spinner.gif");
"#;

    #[test]
    fn test_module_path() {
        assert_eq!(module_path("./util"), "./util.js");
        assert_eq!(module_path("./lib/dom.js"), "./lib/dom.js");
        assert_eq!(module_path("../v1.2/x"), "../v1.2/x.js");
    }

    #[test]
    fn test_sniff_needs_require() {
        assert!(JsMain.sniff(MAIN.as_bytes()));
        assert!(!JsMain.sniff(b"console.log(1)"));
    }

    #[test]
    fn test_finds_requires_and_literals() {
        let main = resource("/www/js/app.main.js", MAIN.as_bytes(), ResourceKind::JsMain);
        let refs = JsMain.find_references(&main).unwrap();
        let found: Vec<_> = refs
            .iter()
            .map(|r| (r.method, r.matched.as_str(), r.target.clone()))
            .collect();
        assert_eq!(
            found,
            vec![
                (METHOD, "./util", Target::Path("./util.js".into())),
                (METHOD, "./lib/dom.js", Target::Path("./lib/dom.js".into())),
                (METHOD, "./util", Target::Path("./util.js".into())),
                ("js-literal", "/img/spinner.gif", Target::Path("/img/spinner.gif".into())),
            ]
        );
    }

    #[test]
    fn test_required_image_is_one_literal_reference() {
        let src = b"var sprite = require(\"/img/a.png\");\nvar util = require('./util');\n";
        let main = resource("/www/js/app.main.js", src, ResourceKind::JsMain);
        let refs = JsMain.find_references(&main).unwrap();
        let found: Vec<_> = refs.iter().map(|r| (r.method, r.matched.as_str())).collect();
        assert_eq!(found, vec![("js-literal", "/img/a.png"), (METHOD, "./util")]);

        let deps = vec![
            dependency(&refs[0], "/images/aaaa.png", b""),
            dependency(&refs[1], "/js/bbbb.js", b"exports.x=1;"),
        ];
        let out = JsMain
            .optimize(&main, &deps, &PackConfig::default())
            .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("/images/aaaa.png"));
    }

    #[test]
    fn test_bundle_keys_modules_by_uri() {
        let main = resource("/www/js/app.main.js", MAIN.as_bytes(), ResourceKind::JsMain);
        let refs = JsMain.find_references(&main).unwrap();

        let util = b"exports.show=function(a,b){return[a,b]};";
        let dom = b"module.exports={ready:true};";
        let mut deps = vec![
            dependency(&refs[0], "/js/aaaa.js", util),
            dependency(&refs[1], "/js/bbbb.js", dom),
            dependency(&refs[2], "/js/aaaa.js", util),
            dependency(&refs[3], "/images/cccc.gif", b"GIF89a"),
        ];
        deps[0].resource.id = 10;
        deps[1].resource.id = 11;
        deps[2].resource.id = 10;
        deps[3].resource.id = 12;

        let out = JsMain
            .optimize(&main, &deps, &PackConfig::default())
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("\"/js/aaaa.js\""));
        assert!(out.contains("\"/js/bbbb.js\""));
        assert!(out.contains("/images/cccc.gif"));
        assert!(!out.contains("./util"));
        assert!(out.contains("ready"));
    }
}
