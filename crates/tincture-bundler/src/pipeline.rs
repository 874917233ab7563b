//! Wires static extraction into a host bundler configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tincture::{ComponentRoots, ConfigError, ExtractionDecider};
use tracing::{debug, info, warn};

use crate::aliases::{build_aliases, ModuleResolver, PROXY_MODULE};
use crate::env::BuildEnv;
use crate::error::BundleError;
use crate::externals::{ExternalRequest, Externalizer, Placement};
use crate::host::{HostConfig, Loader, Minimizer, ModuleRule, ModuleTest, Plugin, SOURCE_COMPILER};
use crate::options::BundlerOptions;

/// Extensions preferred for web builds, ahead of the host's own.
pub const WEB_EXTENSIONS: &[&str] = &[".web.tsx", ".web.ts", ".web.js"];

/// Package field pointing at builds with JSX left intact.
pub const JSX_MAIN_FIELD: &str = "module:jsx";

const FONT_EXTENSIONS: &[&str] = &["woff", "woff2", "eot", "ttf", "otf"];
const ANIMATION_MODULES: &str = r"(bottom-sheet|react-native-reanimated).*\.[tj]sx?$";
const CSS_ASSET_NAME: &str = "static/css/[contenthash].css";

/// Applies bundler options to a host configuration.
#[derive(Debug, Clone)]
pub struct PipelineAdapter {
    options: BundlerOptions,
    decider: ExtractionDecider,
    resolver: ModuleResolver,
}

impl PipelineAdapter {
    /// Resolves the configured component packages under `project_root`.
    ///
    /// # Errors
    ///
    /// Fails if a component package or its `package.json` cannot be found.
    pub fn new(options: BundlerOptions, project_root: impl Into<PathBuf>) -> Result<Self, BundleError> {
        let project_root = project_root.into();
        let components = ComponentRoots::resolve(&options.components, &project_root)?;
        Ok(Self::with_components(options, project_root, components))
    }

    /// Uses already resolved component roots.
    pub fn with_components(
        options: BundlerOptions,
        project_root: impl Into<PathBuf>,
        components: ComponentRoots,
    ) -> Self {
        let project_root = project_root.into();
        let mut decider = ExtractionDecider::new(&project_root, components)
            .with_breakpoints(options.breakpoints());
        if let Some(policy) = options.extraction_policy() {
            decider = decider.with_shared_policy(policy);
        }
        Self {
            resolver: ModuleResolver::new(&project_root),
            options,
            decider,
        }
    }

    pub fn options(&self) -> &BundlerOptions {
        &self.options
    }

    pub fn decider(&self) -> &ExtractionDecider {
        &self.decider
    }

    pub fn project_root(&self) -> &Path {
        self.decider.project_root()
    }

    pub fn externalizer(&self) -> Externalizer {
        Externalizer::new(
            self.decider.components().clone(),
            self.options.server_exclusion(),
        )
    }

    /// Mutates `host` so static extraction runs in its pipeline.
    ///
    /// # Errors
    ///
    /// Fails on invalid user patterns, or if the host has no script rule
    /// group to extend.
    pub fn apply(&self, host: &mut HostConfig, env: &BuildEnv) -> Result<(), BundleError> {
        self.apply_aliases(host, env);
        self.apply_defines(host, env);
        self.apply_export_exclusions(host)?;
        self.apply_resolution(host, env);
        if env.is_server {
            self.apply_externals(host);
        }
        self.apply_css_rules(host, env)?;
        self.apply_js_rules(host)?;
        debug!(env = env.label(), "pipeline configured");
        Ok(())
    }

    fn apply_aliases(&self, host: &mut HostConfig, env: &BuildEnv) {
        host.aliases
            .extend(build_aliases(&self.options, &self.resolver, env));
        if env.debug {
            info!(env = env.label(), aliases = ?host.aliases, "alias table");
        } else {
            debug!(count = host.aliases.len(), "alias table merged");
        }
    }

    fn apply_defines(&self, host: &mut HostConfig, env: &BuildEnv) {
        host.defines
            .insert("process.env.IS_STATIC".into(), "\"\"".into());
        host.defines.insert(
            "process.env.TINCTURE_TARGET".into(),
            format!("\"{}\"", env.platform),
        );
        host.defines
            .insert("__DEV__".into(), env.is_development().to_string());
    }

    fn apply_export_exclusions(&self, host: &mut HostConfig) -> Result<(), BundleError> {
        let Some(names) = self.options.exclude_native_web_exports.as_deref() else {
            return Ok(());
        };
        if names.is_empty() {
            return Ok(());
        }
        if names.iter().any(|n| n == "PressResponder") {
            warn!("PressResponder should not be excluded from the web substitute");
        }

        let pattern = format!("react-native-web(-lite)?/.*({}).*js", names.join("|"));
        let regex = compile_pattern(&pattern)?;
        let replacement = self
            .resolver
            .resolve(PROXY_MODULE)
            .map_or_else(|| PROXY_MODULE.to_string(), |p| p.to_string_lossy().into_owned());
        debug!(%pattern, "excluding web substitute exports");
        host.plugins.push(Plugin::ModuleReplacement {
            pattern: regex,
            replacement,
        });
        Ok(())
    }

    fn apply_resolution(&self, host: &mut HostConfig, env: &BuildEnv) {
        if env.mode.is_production() {
            host.minimizers.retain(|m| !m.is_css());
            host.minimizers.push(Minimizer::AtomicCss);
        }

        let mut extensions: Vec<String> = WEB_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        for extension in host.extensions.drain(..) {
            if !extensions.contains(&extension) {
                extensions.push(extension);
            }
        }
        host.extensions = extensions;

        host.main_fields.retain(|f| f != JSX_MAIN_FIELD);
        host.main_fields.insert(0, JSX_MAIN_FIELD.to_string());
    }

    fn apply_externals(&self, host: &mut HostConfig) {
        let externalizer = self.externalizer();
        let placement: Arc<dyn Fn(&ExternalRequest) -> Placement + Send + Sync> =
            Arc::new(move |request| externalizer.place(request));
        host.externals = host
            .externals
            .drain(..)
            .map(|external| external.guarded(Arc::clone(&placement)))
            .collect();
    }

    fn apply_css_rules(&self, host: &mut HostConfig, env: &BuildEnv) -> Result<(), BundleError> {
        let css_test = self.options.css_test()?;
        let Some(rules) = host.css_rules.as_mut() else {
            debug!("host has no stylesheet rules, skipping");
            return Ok(());
        };

        if !self.options.disable_font_support {
            let server_prefix = if env.is_server { "../" } else { "" };
            rules.insert(
                0,
                ModuleRule::new(
                    ModuleTest::extensions(FONT_EXTENSIONS),
                    vec![Loader::Url {
                        limit: self.options.inline_font_limit(),
                        public_path: format!("{}/static/chunks/fonts/", self.options.asset_prefix()),
                        output_path: format!("{server_prefix}static/chunks/fonts/"),
                    }],
                ),
            );
        }

        let test = ModuleTest::Css(css_test);
        if env.mode.is_production() {
            rules.insert(
                0,
                ModuleRule::new(test, vec![Loader::ExtractCss, Loader::Css, Loader::PostCss])
                    .with_side_effects(),
            );
            host.plugins.push(Plugin::CssExtract {
                filename: CSS_ASSET_NAME.into(),
                ignore_order: true,
            });
            if self.options.inline_css {
                host.plugins.push(Plugin::InlineCss);
            }
        } else {
            rules.insert(
                0,
                ModuleRule::new(test, vec![Loader::InjectCss, Loader::Css, Loader::PostCss])
                    .with_side_effects(),
            );
        }
        Ok(())
    }

    fn apply_js_rules(&self, host: &mut HostConfig) -> Result<(), BundleError> {
        let rules = host
            .js_rules
            .as_mut()
            .ok_or(BundleError::MissingRuleGroup("script"))?;

        let (insert_at, compiler) = match rules.iter().position(ModuleRule::is_source_compiler) {
            Some(index) => (index, rules[index].loaders.clone()),
            None => (0, vec![Loader::Compiler(SOURCE_COMPILER.into())]),
        };

        let decider = self.decider.clone();
        let mut passes = vec![Loader::StaticExtraction];
        passes.extend(compiler);
        let extraction = ModuleRule::new(ModuleTest::extensions(&["js", "jsx", "ts", "tsx"]), passes)
            .with_exclude(Arc::new(move |path: &Path| decider.is_excluded(path)));
        let animation = ModuleRule::new(
            ModuleTest::Pattern(compile_pattern(ANIMATION_MODULES)?),
            vec![Loader::Animation],
        );

        // Ahead of the compiler rule: a `one_of` group uses the first match.
        rules.insert(insert_at, extraction);
        rules.insert(insert_at, animation);
        Ok(())
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|err| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })
}
