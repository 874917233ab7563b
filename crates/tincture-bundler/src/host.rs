//! A model of the host bundler's configuration.
//!
//! The adapter only needs the parts of a bundler configuration that static
//! extraction touches: module resolution, the module rule lists, plugins,
//! minimizers and server externals. Hosts translate their own config into
//! a [`HostConfig`], let the adapter mutate it, and translate it back.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use tincture::extract::SCRIPT_EXTENSIONS;

use crate::externals::{ExternalRequest, Placement};
use crate::options::CssTest;

/// Name of the general-purpose source compiler loader.
pub const SOURCE_COMPILER: &str = "source-compiler";

pub type ExcludeFn = Arc<dyn Fn(&Path) -> bool + Send + Sync>;
pub type ExternalFn = Arc<dyn Fn(&ExternalRequest) -> Option<String> + Send + Sync>;

/// Which files a rule applies to.
#[derive(Clone)]
pub enum ModuleTest {
    Pattern(Regex),
    /// File extensions without the dot; a `?query` suffix is ignored.
    Extensions(Vec<String>),
    Css(CssTest),
}

impl ModuleTest {
    pub fn extensions(extensions: &[&str]) -> Self {
        ModuleTest::Extensions(extensions.iter().map(|e| e.to_string()).collect())
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            ModuleTest::Pattern(re) => re.is_match(path),
            ModuleTest::Extensions(extensions) => {
                let path = path.split_once('?').map_or(path, |(file, _)| file);
                path.rsplit_once('.')
                    .is_some_and(|(_, ext)| extensions.iter().any(|e| e == ext))
            }
            ModuleTest::Css(test) => test.matches(path),
        }
    }
}

impl fmt::Debug for ModuleTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleTest::Pattern(re) => write!(f, "/{}/", re.as_str()),
            ModuleTest::Extensions(extensions) => write!(f, "*.{{{}}}", extensions.join(",")),
            ModuleTest::Css(test) => test.fmt(f),
        }
    }
}

/// One transform step of a module rule, run in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loader {
    /// Static style extraction.
    StaticExtraction,
    /// A named source compiler.
    Compiler(String),
    /// The animation worklet compiler.
    Animation,
    /// Moves CSS into a separate asset.
    ExtractCss,
    /// Resolves CSS imports.
    Css,
    PostCss,
    /// Injects CSS at runtime, for development.
    InjectCss,
    /// Inlines small assets as data URLs and copies the rest.
    Url {
        limit: u64,
        public_path: String,
        output_path: String,
    },
}

/// One entry in a `one_of` rule group.
#[derive(Clone)]
pub struct ModuleRule {
    pub test: ModuleTest,
    pub loaders: Vec<Loader>,
    pub exclude: Option<ExcludeFn>,
    pub side_effects: bool,
    /// Issuer layer restriction, e.g. `api`.
    pub layer: Option<String>,
}

impl ModuleRule {
    pub fn new(test: ModuleTest, loaders: Vec<Loader>) -> Self {
        Self {
            test,
            loaders,
            exclude: None,
            side_effects: false,
            layer: None,
        }
    }

    pub fn with_exclude(mut self, exclude: ExcludeFn) -> Self {
        self.exclude = Some(exclude);
        self
    }

    pub fn with_side_effects(mut self) -> Self {
        self.side_effects = true;
        self
    }

    pub fn in_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    /// Returns `true` if this rule handles the module at `path`.
    pub fn applies_to(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.test.matches(&text) && !self.exclude.as_ref().is_some_and(|exclude| exclude(path))
    }

    /// Returns `true` if this is the general source compiler rule.
    pub fn is_source_compiler(&self) -> bool {
        self.layer.as_deref() != Some("api")
            && self
                .loaders
                .iter()
                .any(|l| matches!(l, Loader::Compiler(name) if name == SOURCE_COMPILER))
    }
}

impl fmt::Debug for ModuleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRule")
            .field("test", &self.test)
            .field("loaders", &self.loaders)
            .field("exclude", &self.exclude.is_some())
            .field("side_effects", &self.side_effects)
            .field("layer", &self.layer)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Plugin {
    /// Replaces modules matching `pattern` with `replacement`.
    ModuleReplacement { pattern: Regex, replacement: String },
    /// Writes extracted CSS to content-hashed files.
    CssExtract { filename: String, ignore_order: bool },
    /// Inlines extracted CSS into generated HTML.
    InlineCss,
    /// Any host plugin the adapter does not know.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Minimizer {
    Script(String),
    /// A generic CSS minimizer.
    Css(String),
    /// The minimizer that deduplicates atomic rules.
    AtomicCss,
}

impl Minimizer {
    pub fn is_css(&self) -> bool {
        matches!(self, Minimizer::Css(_) | Minimizer::AtomicCss)
    }
}

/// An externals entry.
#[derive(Clone)]
pub enum External {
    /// A request name the host always externalizes.
    Name(String),
    /// A resolver that returns the external reference, or `None` to bundle.
    Resolver(ExternalFn),
}

impl External {
    /// Applies a resolver entry; name entries only match themselves.
    pub fn resolve(&self, request: &ExternalRequest) -> Option<String> {
        match self {
            External::Name(name) if *name == request.request => Some(name.clone()),
            External::Name(_) => None,
            External::Resolver(resolve) => resolve(request),
        }
    }

    /// Wraps a resolver so that `placement` is consulted first.
    pub fn guarded(
        self,
        placement: Arc<dyn Fn(&ExternalRequest) -> Placement + Send + Sync>,
    ) -> External {
        match self {
            External::Name(_) => self,
            External::Resolver(inner) => {
                External::Resolver(Arc::new(move |request| match placement(request) {
                    Placement::Inline => None,
                    Placement::Target(target) => Some(target),
                    Placement::Delegate => inner(request),
                }))
            }
        }
    }
}

impl fmt::Debug for External {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            External::Name(name) => f.debug_tuple("Name").field(name).finish(),
            External::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// The host bundler configuration the adapter mutates.
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    pub aliases: BTreeMap<String, String>,
    pub extensions: Vec<String>,
    pub main_fields: Vec<String>,
    pub defines: BTreeMap<String, String>,
    pub plugins: Vec<Plugin>,
    pub minimizers: Vec<Minimizer>,
    /// The `one_of` group handling stylesheets, if the host has one.
    pub css_rules: Option<Vec<ModuleRule>>,
    /// The `one_of` group handling script modules.
    pub js_rules: Option<Vec<ModuleRule>>,
    pub externals: Vec<External>,
}

impl HostConfig {
    /// A configuration shaped like a typical framework default: script
    /// modules go through the source compiler, stylesheets through the
    /// framework CSS loaders.
    pub fn framework_default() -> Self {
        let script = ModuleTest::extensions(SCRIPT_EXTENSIONS);
        let css = ModuleTest::extensions(&["css"]);
        Self {
            extensions: [".tsx", ".ts", ".jsx", ".js", ".mjs", ".json"]
                .map(String::from)
                .to_vec(),
            main_fields: ["browser", "module", "main"].map(String::from).to_vec(),
            minimizers: vec![
                Minimizer::Script("terser".into()),
                Minimizer::Css("css-minimizer".into()),
            ],
            css_rules: Some(vec![ModuleRule::new(
                css,
                vec![Loader::Css, Loader::PostCss],
            )]),
            js_rules: Some(vec![
                ModuleRule::new(
                    script.clone(),
                    vec![Loader::Compiler(SOURCE_COMPILER.into())],
                )
                .in_layer("api"),
                ModuleRule::new(script, vec![Loader::Compiler(SOURCE_COMPILER.into())]),
            ]),
            ..Self::default()
        }
    }

    /// Runs `request` through the externals, first match wins.
    pub fn resolve_external(&self, request: &ExternalRequest) -> Option<String> {
        self.externals.iter().find_map(|e| e.resolve(request))
    }

    /// The script rule that handles `path` in the default layer.
    pub fn js_rule_for(&self, path: &Path) -> Option<&ModuleRule> {
        first_match(self.js_rules.as_deref()?, path)
    }

    /// The stylesheet rule that handles `path` in the default layer.
    pub fn css_rule_for(&self, path: &Path) -> Option<&ModuleRule> {
        first_match(self.css_rules.as_deref()?, path)
    }
}

fn first_match<'a>(rules: &'a [ModuleRule], path: &Path) -> Option<&'a ModuleRule> {
    rules
        .iter()
        .find(|r| r.layer.is_none() && r.applies_to(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routes_scripts_to_compiler() {
        let host = HostConfig::framework_default();
        let rule = host.js_rule_for(Path::new("/app/src/App.tsx")).unwrap();
        assert_eq!(rule.loaders, vec![Loader::Compiler(SOURCE_COMPILER.into())]);
        assert!(host.js_rule_for(Path::new("/app/logo.png")).is_none());
    }

    #[test]
    fn test_exclude_skips_rule() {
        let rule = ModuleRule::new(ModuleTest::extensions(SCRIPT_EXTENSIONS), vec![])
            .with_exclude(Arc::new(|p: &Path| p.starts_with("/vendor")));
        assert!(rule.applies_to(Path::new("/app/a.js")));
        assert!(!rule.applies_to(Path::new("/vendor/a.js")));
    }

    #[test]
    fn test_source_compiler_ignores_api_layer() {
        let host = HostConfig::framework_default();
        let rules = host.js_rules.unwrap();
        assert!(!rules[0].is_source_compiler());
        assert!(rules[1].is_source_compiler());
    }

    #[test]
    fn test_guarded_external() {
        let inner = External::Resolver(Arc::new(|r: &ExternalRequest| Some(r.request.clone())));
        let guarded = inner.guarded(Arc::new(|r: &ExternalRequest| match r.request.as_str() {
            "a" => Placement::Inline,
            "b" => Placement::Target("commonjs b2".into()),
            _ => Placement::Delegate,
        }));
        let at = |r: &str| guarded.resolve(&ExternalRequest::new("/app", r));
        assert_eq!(at("a"), None);
        assert_eq!(at("b"), Some("commonjs b2".into()));
        assert_eq!(at("c"), Some("c".into()));
    }

    #[test]
    fn test_extensions_ignore_query() {
        let fonts = ModuleTest::extensions(&["woff", "woff2"]);
        assert!(fonts.matches("/a/Inter.woff2?v=1.2.3"));
        assert!(!fonts.matches("/a/Inter.ttf"));
        assert!(!fonts.matches("/a/woff"));
    }

    #[test]
    fn test_name_external() {
        let external = External::Name("fs".into());
        assert_eq!(
            external.resolve(&ExternalRequest::new("/", "fs")),
            Some("fs".into())
        );
        assert_eq!(external.resolve(&ExternalRequest::new("/", "path")), None);
    }
}
