//! Module resolution aliases.
//!
//! Aliases ending in `$` match the request exactly and are kept verbatim.
//! All other targets are resolved to an installed path first; targets that
//! are not installed are skipped, so optional integrations simply drop out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::BuildEnv;
use crate::options::BundlerOptions;

/// Empty module substituted for platform-only code.
pub const PROXY_MODULE: &str = "@tincture/proxy-worm";

pub const WEB_SUBSTITUTE: &str = "react-native-web";
pub const WEB_LITE_SUBSTITUTE: &str = "react-native-web-lite";

/// Finds installed packages in `node_modules` directories above a root.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    search_dirs: Vec<PathBuf>,
}

impl ModuleResolver {
    pub fn new(project_root: &Path) -> Self {
        Self {
            search_dirs: project_root
                .ancestors()
                .map(|dir| dir.join("node_modules"))
                .collect(),
        }
    }

    /// Resolves `module`, e.g. `react/jsx-runtime`, to an installed path.
    pub fn resolve(&self, module: &str) -> Option<PathBuf> {
        self.search_dirs.iter().find_map(|dir| {
            let candidate = dir.join(module);
            if candidate.exists() {
                return Some(candidate);
            }
            let with_js = dir.join(format!("{module}.js"));
            with_js.exists().then_some(with_js)
        })
    }
}

/// The substitute package for the native primitives.
pub fn web_substitute(options: &BundlerOptions) -> &'static str {
    if options.use_native_web_lite {
        WEB_LITE_SUBSTITUTE
    } else {
        WEB_SUBSTITUTE
    }
}

/// `(alias, target)` pairs installed by default, in priority order.
fn default_pairs(options: &BundlerOptions) -> Vec<(&'static str, &'static str)> {
    let web = web_substitute(options);
    let mut pairs = vec![
        ("@tincture/core/reset.css", "@tincture/core/reset.css"),
        ("@tincture/core", "@tincture/core"),
        ("react-native-svg", "@tincture/react-native-svg"),
        ("react/jsx-runtime.js", "react/jsx-runtime"),
        ("react/jsx-runtime", "react/jsx-runtime"),
        ("react/jsx-dev-runtime.js", "react/jsx-dev-runtime"),
        ("react/jsx-dev-runtime", "react/jsx-dev-runtime"),
        ("react-native-reanimated", "react-native-reanimated"),
        ("react-native$", web),
        ("react-native-web$", web),
        ("@testing-library/react-native", PROXY_MODULE),
        ("@gorhom/bottom-sheet$", "@gorhom/bottom-sheet"),
        ("react-native/Libraries/Renderer/shims/ReactFabric", PROXY_MODULE),
    ];
    if options.alias_react_packages {
        pairs.push(("react", "react"));
        pairs.push(("react-dom", "react-dom"));
    }
    pairs
}

/// Resolves the default aliases and merges the user's on top.
pub fn build_aliases(
    options: &BundlerOptions,
    resolver: &ModuleResolver,
    env: &BuildEnv,
) -> BTreeMap<String, String> {
    let mut aliases = BTreeMap::new();
    for (alias, target) in default_pairs(options) {
        if alias.ends_with('$') {
            aliases.insert(alias.to_string(), target.to_string());
            continue;
        }
        match resolver.resolve(target) {
            Some(path) => {
                aliases.insert(alias.to_string(), path.to_string_lossy().into_owned());
            }
            None if env.debug => info!(env = env.label(), alias, target, "skipping unresolved alias"),
            None => debug!(alias, target, "skipping unresolved alias"),
        }
    }
    for (alias, target) in &options.aliases {
        aliases.insert(alias.clone(), target.clone());
    }
    aliases
}
