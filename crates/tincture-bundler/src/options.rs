//! User-facing bundler options.
//!
//! The serializable part is read from JSON with camelCase keys. Host hooks
//! are closures and can only be installed from code, through the `with_*`
//! builders.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tincture::{Breakpoints, ConfigError, ExtractionPolicy};

use crate::error::BundleError;
use crate::externals::ExternalRequest;

/// Pattern used when `includeCssTest` is not configured.
pub const DEFAULT_CSS_TEST: &str = r"\.css$";

/// Inline limit for font assets, in bytes.
pub const DEFAULT_INLINE_FONT_LIMIT: u64 = 1024;

/// Host answer for server externalization of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerOverride {
    /// `true` externalizes through the host's own externals, `false` inlines.
    Exclude(bool),
    /// Externalize with exactly this reference, e.g. `commonjs react`.
    Target(String),
}

pub type ServerExclusionHook =
    Arc<dyn Fn(&ExternalRequest) -> Option<ServerOverride> + Send + Sync>;
pub type CssPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Selects which assets belong to the stylesheet pass.
#[derive(Clone)]
pub enum CssTest {
    Pattern(Regex),
    Predicate(CssPredicate),
}

impl CssTest {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            CssTest::Pattern(re) => re.is_match(path),
            CssTest::Predicate(f) => f(path),
        }
    }
}

impl fmt::Debug for CssTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssTest::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            CssTest::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct Hooks {
    should_extract: Option<Arc<dyn ExtractionPolicy>>,
    exclude_from_server: Option<ServerExclusionHook>,
    css_test: Option<CssPredicate>,
}

/// Options for one build.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundlerOptions {
    /// Package identifiers whose modules are always compiled and never
    /// externalized on the server.
    pub components: Vec<String>,
    /// Regex selecting stylesheet assets.
    #[serde(alias = "includeCSSTest", skip_serializing_if = "Option::is_none")]
    pub include_css_test: Option<String>,
    /// Inline the stylesheet into generated HTML instead of emitting a file.
    #[serde(alias = "inlineCSS")]
    pub inline_css: bool,
    pub disable_font_support: bool,
    /// Alias `react` and `react-dom` to the project's own copies.
    pub alias_react_packages: bool,
    /// Substitute the lite web implementation of the native primitives.
    #[serde(alias = "useReactNativeWebLite")]
    pub use_native_web_lite: bool,
    /// Export names of the web substitute to replace with an empty module.
    #[serde(
        alias = "excludeReactNativeWebExports",
        skip_serializing_if = "Option::is_none"
    )]
    pub exclude_native_web_exports: Option<Vec<String>>,
    /// Extra aliases merged after the defaults.
    pub aliases: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Breakpoints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_font_limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_prefix: Option<String>,
    #[serde(skip)]
    pub(crate) hooks: Hooks,
}

impl fmt::Debug for BundlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundlerOptions")
            .field("components", &self.components)
            .field("include_css_test", &self.include_css_test)
            .field("inline_css", &self.inline_css)
            .field("disable_font_support", &self.disable_font_support)
            .field("alias_react_packages", &self.alias_react_packages)
            .field("use_native_web_lite", &self.use_native_web_lite)
            .field("exclude_native_web_exports", &self.exclude_native_web_exports)
            .field("aliases", &self.aliases)
            .field("breakpoints", &self.breakpoints)
            .field("inline_font_limit", &self.inline_font_limit)
            .field("asset_prefix", &self.asset_prefix)
            .field("has_should_extract", &self.hooks.should_extract.is_some())
            .field("has_server_hook", &self.hooks.exclude_from_server.is_some())
            .finish()
    }
}

impl BundlerOptions {
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, BundleError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Installs the per-path extraction override.
    pub fn with_should_extract<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Path, &Path) -> Option<bool> + Send + Sync + 'static,
    {
        self.hooks.should_extract = Some(Arc::new(hook));
        self
    }

    /// Installs the per-request server externalization override.
    pub fn with_server_exclusion<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ExternalRequest) -> Option<ServerOverride> + Send + Sync + 'static,
    {
        self.hooks.exclude_from_server = Some(Arc::new(hook));
        self
    }

    /// Selects stylesheet assets with a predicate instead of a pattern.
    pub fn with_css_test<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.hooks.css_test = Some(Arc::new(predicate));
        self
    }

    pub fn extraction_policy(&self) -> Option<Arc<dyn ExtractionPolicy>> {
        self.hooks.should_extract.clone()
    }

    pub fn server_exclusion(&self) -> Option<ServerExclusionHook> {
        self.hooks.exclude_from_server.clone()
    }

    /// The stylesheet asset test. A predicate hook wins over the pattern.
    pub fn css_test(&self) -> Result<CssTest, ConfigError> {
        if let Some(predicate) = &self.hooks.css_test {
            return Ok(CssTest::Predicate(Arc::clone(predicate)));
        }
        let pattern = self.include_css_test.as_deref().unwrap_or(DEFAULT_CSS_TEST);
        Regex::new(pattern)
            .map(CssTest::Pattern)
            .map_err(|err| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: err.to_string(),
            })
    }

    pub fn inline_font_limit(&self) -> u64 {
        self.inline_font_limit.unwrap_or(DEFAULT_INLINE_FONT_LIMIT)
    }

    pub fn asset_prefix(&self) -> &str {
        self.asset_prefix.as_deref().unwrap_or("")
    }

    pub fn breakpoints(&self) -> Breakpoints {
        self.breakpoints.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_camel_case() {
        let options = BundlerOptions::from_json(
            r#"{
                "components": ["@acme/ui"],
                "inlineCss": true,
                "disableFontSupport": true,
                "excludeNativeWebExports": ["Switch"],
                "inlineFontLimit": 2048
            }"#,
        )
        .unwrap();
        assert_eq!(options.components, vec!["@acme/ui"]);
        assert!(options.inline_css);
        assert!(options.disable_font_support);
        assert_eq!(options.exclude_native_web_exports, Some(vec!["Switch".to_string()]));
        assert_eq!(options.inline_font_limit(), 2048);
    }

    #[test]
    fn test_accepts_legacy_keys() {
        let options = BundlerOptions::from_json(
            r#"{ "inlineCSS": true, "includeCSSTest": "\\.scss$", "useReactNativeWebLite": true }"#,
        )
        .unwrap();
        assert!(options.inline_css);
        assert!(options.use_native_web_lite);
        assert!(options.css_test().unwrap().matches("theme.scss"));
    }

    #[test]
    fn test_defaults() {
        let options = BundlerOptions::from_json("{}").unwrap();
        assert!(options.components.is_empty());
        assert_eq!(options.inline_font_limit(), DEFAULT_INLINE_FONT_LIMIT);
        assert_eq!(options.asset_prefix(), "");
        let test = options.css_test().unwrap();
        assert!(test.matches("app.css"));
        assert!(!test.matches("app.css.map"));
    }

    #[test]
    fn test_invalid_css_pattern() {
        let options = BundlerOptions {
            include_css_test: Some("(".into()),
            ..BundlerOptions::default()
        };
        assert!(matches!(
            options.css_test(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_predicate_wins_over_pattern() {
        let options = BundlerOptions::default().with_css_test(|path| path.ends_with(".style"));
        let test = options.css_test().unwrap();
        assert!(test.matches("a.style"));
        assert!(!test.matches("a.css"));
    }

    #[test]
    fn test_hooks_are_not_serialized() {
        let options = BundlerOptions::new(["@acme/ui"]).with_should_extract(|_, _| Some(true));
        assert!(options.extraction_policy().is_some());
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["components"][0], "@acme/ui");
        assert!(json.get("hooks").is_none());
    }

    #[test]
    fn test_unknown_breakpoints_default() {
        let options = BundlerOptions::from_json(
            r#"{ "breakpoints": [{ "name": "phone", "maxWidth": 480 }] }"#,
        )
        .unwrap();
        assert!(options.breakpoints().get("phone").is_some());
        assert!(options.breakpoints().get("sm").is_none());
    }
}
