//! Server-side externalization.
//!
//! On the server bundle, platform-native modules with a web substitute are
//! left to the host runtime while component packages stay inlined so the
//! extraction passes can see them.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use serde::Serialize;
use tincture::ComponentRoots;
use tracing::trace;

use crate::options::{ServerExclusionHook, ServerOverride};

/// Packages that work on both platforms and can be bundled as is.
const UNIVERSAL_PREFIXES: &[&str] = &[
    "moti",
    "solito",
    "@tamagui",
    "@react-navigation",
    "@gorhom",
];
const UNIVERSAL_EXACT: &[&str] = &[
    "tamagui",
    "react-native-safe-area-context",
    "expo-linear-gradient",
];

/// One module request seen by the server bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRequest {
    /// Directory of the requesting module.
    pub context: PathBuf,
    /// The specifier as written.
    pub request: String,
    /// `request` joined onto `context` when relative, else `request`.
    pub full_path: String,
}

impl ExternalRequest {
    pub fn new(context: impl Into<PathBuf>, request: impl Into<String>) -> Self {
        let context = context.into();
        let request = request.into();
        let full_path = if request.starts_with('.') {
            context.join(&request).to_string_lossy().into_owned()
        } else {
            request.clone()
        };
        Self {
            context,
            request,
            full_path,
        }
    }
}

/// What the server bundle does with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "target")]
pub enum Placement {
    /// Bundle the module.
    Inline,
    /// Leave the module to the host runtime under this reference.
    Target(String),
    /// Let the host's own externals decide.
    Delegate,
}

/// Decides server placement for module requests.
#[derive(Clone)]
pub struct Externalizer {
    components: ComponentRoots,
    hook: Option<ServerExclusionHook>,
}

impl std::fmt::Debug for Externalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Externalizer")
            .field("components", &self.components)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl Externalizer {
    pub fn new(components: ComponentRoots, hook: Option<ServerExclusionHook>) -> Self {
        Self { components, hook }
    }

    pub fn place(&self, request: &ExternalRequest) -> Placement {
        let placement = self.decide(request);
        trace!(request = %request.request, ?placement, "server placement");
        placement
    }

    fn decide(&self, request: &ExternalRequest) -> Placement {
        let full_path = request.full_path.as_str();

        if let Some(answer) = self.hook.as_ref().and_then(|hook| hook(request)) {
            return match answer {
                ServerOverride::Exclude(true) => Placement::Delegate,
                ServerOverride::Exclude(false) => Placement::Inline,
                ServerOverride::Target(target) => Placement::Target(target),
            };
        }

        if self.components.contains(Path::new(full_path)) {
            return Placement::Inline;
        }

        // Resolved paths of the lite substitute break when externalized.
        if full_path.contains("react-native-web-lite") {
            return Placement::Inline;
        }

        // Inlined so the alias table can swap in the web substitute.
        if full_path == "react-native" || full_path.starts_with(&format!("react-native{MAIN_SEPARATOR}"))
        {
            return Placement::Inline;
        }

        if full_path.starts_with("react-native-web")
            || full_path.contains(&format!("node_modules{MAIN_SEPARATOR}react-native-web"))
            || is_react_root(full_path)
        {
            return Placement::Target(format!("commonjs {full_path}"));
        }

        if is_universal(full_path) {
            return Placement::Inline;
        }

        if is_native_package(&request.request) {
            return Placement::Inline;
        }

        Placement::Delegate
    }
}

fn is_react_root(path: &str) -> bool {
    ["react", "react-dom"]
        .iter()
        .any(|root| path == format!("{root}{MAIN_SEPARATOR}"))
}

/// `react-native-*` and `@react-native-*` specifiers.
fn is_native_package(request: &str) -> bool {
    request
        .strip_prefix('@')
        .unwrap_or(request)
        .starts_with("react-native-")
}

fn is_universal(path: &str) -> bool {
    UNIVERSAL_EXACT.contains(&path) || UNIVERSAL_PREFIXES.iter().any(|p| path.starts_with(p))
}
