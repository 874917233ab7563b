//! The static extraction decider.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::trace;

use super::policy::{is_excluded_by_default, ExtractionPolicy, NoOverride};
use super::roots::ComponentRoots;
use crate::compile::StyleDeclaration;
use crate::state::Breakpoints;

/// Where a declaration's styles end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "decision", content = "reason")]
pub enum Decision {
    /// Compiled into the build-time stylesheet.
    Extracted,
    /// Left for the runtime resolver.
    Deferred(DeferReason),
}

impl Decision {
    pub fn is_extracted(self) -> bool {
        matches!(self, Decision::Extracted)
    }
}

/// Why a declaration was deferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeferReason {
    /// The module is covered by the exclusion policy.
    Excluded,
    /// A value is only known at render time.
    Dynamic,
    /// The host override asked for deferral.
    Forced,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Extracted => f.write_str("extracted"),
            Decision::Deferred(DeferReason::Excluded) => f.write_str("deferred (excluded)"),
            Decision::Deferred(DeferReason::Dynamic) => f.write_str("deferred (dynamic)"),
            Decision::Deferred(DeferReason::Forced) => f.write_str("deferred (forced)"),
        }
    }
}

/// Routes declarations between static extraction and runtime resolution.
#[derive(Clone)]
pub struct ExtractionDecider {
    project_root: PathBuf,
    components: ComponentRoots,
    breakpoints: Breakpoints,
    policy: Arc<dyn ExtractionPolicy>,
}

impl fmt::Debug for ExtractionDecider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionDecider")
            .field("project_root", &self.project_root)
            .field("components", &self.components)
            .field("breakpoints", &self.breakpoints)
            .finish_non_exhaustive()
    }
}

impl ExtractionDecider {
    /// Creates a decider with no host override.
    pub fn new(project_root: impl Into<PathBuf>, components: ComponentRoots) -> Self {
        Self {
            project_root: project_root.into(),
            components,
            breakpoints: Breakpoints::default(),
            policy: Arc::new(NoOverride),
        }
    }

    /// Uses `breakpoints` when checking whether a declaration is static.
    pub fn with_breakpoints(mut self, breakpoints: Breakpoints) -> Self {
        self.breakpoints = breakpoints;
        self
    }

    /// Installs a host override.
    pub fn with_policy(mut self, policy: impl ExtractionPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Installs a shared host override.
    pub fn with_shared_policy(mut self, policy: Arc<dyn ExtractionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn components(&self) -> &ComponentRoots {
        &self.components
    }

    /// Returns `true` if the module at `path` is a component package module.
    pub fn is_component_module(&self, path: &Path) -> bool {
        self.components.contains(path)
    }

    /// Module-level exclusion, ignoring declaration contents.
    ///
    /// This is what the host pipeline uses to skip the extraction pass for
    /// whole files.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if let Some(extract) = self.policy.should_extract(path, &self.project_root) {
            return !extract;
        }
        if self.components.contains(path) {
            return false;
        }
        is_excluded_by_default(path)
    }

    /// Decides the fate of one declaration in the module at `path`.
    pub fn should_extract(&self, path: &Path, declaration: &StyleDeclaration) -> Decision {
        let decision = match self.policy.should_extract(path, &self.project_root) {
            Some(true) => Decision::Extracted,
            Some(false) => Decision::Deferred(DeferReason::Forced),
            None if !self.components.contains(path) && is_excluded_by_default(path) => {
                Decision::Deferred(DeferReason::Excluded)
            }
            None if !declaration.is_static(&self.breakpoints) => {
                Decision::Deferred(DeferReason::Dynamic)
            }
            None => Decision::Extracted,
        };
        trace!(path = %path.display(), %decision, "extraction decision");
        decision
    }
}
