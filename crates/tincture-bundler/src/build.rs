//! The build driver.
//!
//! A [`Build`] owns one [`StyleSession`] and runs every source module
//! through the extraction decider, compiling modules in parallel. Rules
//! shared between modules are emitted once.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tincture::{Decision, Mode, RuntimeTable, StyleDeclaration, StyleSession};
use tracing::{debug, info};

use crate::env::BuildEnv;
use crate::error::BundleError;
use crate::host::HostConfig;
use crate::options::BundlerOptions;
use crate::pipeline::PipelineAdapter;
use crate::stylesheet::Stylesheet;

/// A style declaration attached to a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedDeclaration {
    pub component: String,
    pub style: StyleDeclaration,
}

/// The declarations found in one source module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceModule {
    /// Absolute, or relative to the project root.
    pub path: PathBuf,
    #[serde(default)]
    pub declarations: Vec<NamedDeclaration>,
}

impl SourceModule {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            declarations: Vec::new(),
        }
    }

    pub fn with(mut self, component: impl Into<String>, style: StyleDeclaration) -> Self {
        self.declarations.push(NamedDeclaration {
            component: component.into(),
            style,
        });
        self
    }
}

/// A build description read from JSON.
///
/// ```json
/// {
///   "projectRoot": ".",
///   "options": { "components": ["@acme/ui"] },
///   "modules": [
///     { "path": "src/App.tsx", "declarations": [
///       { "component": "Card", "style": { "padding": 8 } }
///     ] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildManifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
    pub options: BundlerOptions,
    pub modules: Vec<SourceModule>,
}

impl BuildManifest {
    pub fn from_json(text: &str) -> Result<Self, BundleError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The project root, resolved against the manifest's directory.
    pub fn project_root(&self, manifest_dir: &Path) -> PathBuf {
        match &self.project_root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => manifest_dir.join(root),
            None => manifest_dir.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationReport {
    pub component: String,
    #[serde(flatten)]
    pub decision: Decision,
    pub class_names: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleReport {
    pub path: PathBuf,
    pub declarations: Vec<DeclarationReport>,
}

impl ModuleReport {
    pub fn extracted(&self) -> usize {
        self.declarations
            .iter()
            .filter(|d| d.decision.is_extracted())
            .count()
    }
}

/// Everything a build produces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutput {
    pub mode: Mode,
    pub stylesheet: Stylesheet,
    pub runtime: RuntimeTable,
    pub modules: Vec<ModuleReport>,
}

impl BuildOutput {
    /// The stylesheet text; minified in production.
    pub fn css(&self) -> String {
        self.stylesheet.to_css(self.mode.is_development())
    }

    pub fn style_tag(&self) -> String {
        self.stylesheet.to_style_tag(self.mode.is_development())
    }
}

/// One build over a set of source modules.
#[derive(Debug)]
pub struct Build {
    adapter: PipelineAdapter,
    session: StyleSession,
    env: BuildEnv,
}

impl Build {
    /// # Errors
    ///
    /// Fails if the configured component packages cannot be resolved.
    pub fn new(
        options: BundlerOptions,
        env: BuildEnv,
        project_root: impl Into<PathBuf>,
    ) -> Result<Self, BundleError> {
        let adapter = PipelineAdapter::new(options, project_root)?;
        Ok(Self::from_adapter(adapter, env))
    }

    pub fn from_adapter(adapter: PipelineAdapter, env: BuildEnv) -> Self {
        let session =
            StyleSession::with_breakpoints(env.platform, env.mode, adapter.options().breakpoints());
        Self {
            adapter,
            session,
            env,
        }
    }

    pub fn session(&self) -> &StyleSession {
        &self.session
    }

    pub fn adapter(&self) -> &PipelineAdapter {
        &self.adapter
    }

    pub fn env(&self) -> &BuildEnv {
        &self.env
    }

    /// Wires this build into the host bundler configuration.
    pub fn configure(&self, host: &mut HostConfig) -> Result<(), BundleError> {
        self.adapter.apply(host, &self.env)
    }

    /// Decides and compiles every declaration of one module.
    pub fn compile_module(&self, module: &SourceModule) -> ModuleReport {
        let path = self.absolute(&module.path);
        let decider = self.adapter.decider();

        let declarations = module
            .declarations
            .iter()
            .map(|named| {
                let decision = decider.should_extract(&path, &named.style);
                let compiled = if decision.is_extracted() {
                    self.session.compile(&named.style)
                } else {
                    self.session.compile_deferred(&named.style)
                };
                debug!(
                    component = %named.component,
                    %decision,
                    rules = compiled.len(),
                    "compiled declaration"
                );
                DeclarationReport {
                    component: named.component.clone(),
                    decision,
                    class_names: compiled.class_names(),
                }
            })
            .collect();

        ModuleReport { path, declarations }
    }

    /// Compiles all modules in parallel and assembles the outputs.
    pub fn run(&self, modules: &[SourceModule]) -> BuildOutput {
        let reports: Vec<ModuleReport> = modules
            .par_iter()
            .map(|module| self.compile_module(module))
            .collect();

        let rules = self.session.stylesheet_rules();
        let mut stylesheet = Stylesheet::assemble(rules.iter().map(|r| r.as_ref()));
        if self.env.mode.is_production() {
            stylesheet = stylesheet.minify();
        }
        let runtime = self.session.runtime_table();

        info!(
            env = self.env.label(),
            modules = reports.len(),
            rules = rules.len(),
            blocks = stylesheet.len(),
            deferred = runtime.len(),
            "build complete"
        );

        BuildOutput {
            mode: self.env.mode,
            stylesheet,
            runtime,
            modules: reports,
        }
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.adapter.project_root().join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tincture::{ComponentRoots, DeferReason, Platform, StyleValue};

    fn build(mode: Mode) -> Build {
        let adapter = PipelineAdapter::with_components(
            BundlerOptions::default(),
            "/app",
            ComponentRoots::default(),
        );
        Build::from_adapter(adapter, BuildEnv::new(Platform::Web, mode))
    }

    #[test]
    fn test_relative_paths_join_root() {
        let build = build(Mode::Production);
        let report = build.compile_module(&SourceModule::new("src/App.tsx"));
        assert_eq!(report.path, PathBuf::from("/app/src/App.tsx"));
    }

    #[test]
    fn test_decisions_reported() {
        let build = build(Mode::Production);
        let module = SourceModule::new("src/App.tsx")
            .with("Card", StyleDeclaration::new().with("padding", 8))
            .with(
                "Avatar",
                StyleDeclaration::new().with("width", StyleValue::dynamic("props.size")),
            );
        let output = build.run(&[module]);

        let report = &output.modules[0];
        assert_eq!(report.extracted(), 1);
        assert_eq!(
            report.declarations[1].decision,
            Decision::Deferred(DeferReason::Dynamic)
        );
        assert_eq!(output.stylesheet.len(), 1);
        assert_eq!(output.runtime.len(), 1);
    }

    #[test]
    fn test_excluded_module_goes_to_runtime() {
        let build = build(Mode::Production);
        let module = SourceModule::new("/app/node_modules/lib/index.js")
            .with("Box", StyleDeclaration::new().with("padding", 8));
        let output = build.run(&[module]);
        assert!(output.stylesheet.is_empty());
        assert_eq!(output.runtime.len(), 1);
    }

    #[test]
    fn test_manifest_parse() {
        let manifest = BuildManifest::from_json(
            r#"{
                "projectRoot": "web",
                "options": { "inlineCss": true },
                "modules": [
                    { "path": "src/App.tsx", "declarations": [
                        { "component": "Card", "style": { "padding": 8, "hoverStyle": { "opacity": 0.5 } } }
                    ] }
                ]
            }"#,
        )
        .unwrap();
        assert!(manifest.options.inline_css);
        assert_eq!(manifest.project_root(Path::new("/repo")), PathBuf::from("/repo/web"));
        assert_eq!(manifest.modules[0].declarations[0].style.states.len(), 1);
    }

    #[test]
    fn test_report_serializes_decision_inline() {
        let report = DeclarationReport {
            component: "Card".into(),
            decision: Decision::Deferred(DeferReason::Excluded),
            class_names: String::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["decision"], "deferred");
        assert_eq!(json["reason"], "excluded");
        assert_eq!(json["classNames"], "");
    }

    #[test]
    fn test_development_output_is_pretty() {
        let build = build(Mode::Development);
        let module = SourceModule::new("src/App.tsx")
            .with("Card", StyleDeclaration::new().with("padding", 8));
        let output = build.run(&[module]);
        assert!(output.css().ends_with("; }\n"));
    }
}
