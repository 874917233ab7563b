//! Host-supplied extraction overrides and the default exclusion rule.

use std::path::{Component, Path};

/// File extensions treated as extractable source modules.
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

/// A per-path override supplied by the host toolchain.
///
/// `Some(true)` forces extraction, `Some(false)` forces deferral and `None`
/// leaves the decision to the default policy. Closures of the matching
/// shape implement this trait.
pub trait ExtractionPolicy: Send + Sync {
    fn should_extract(&self, path: &Path, project_root: &Path) -> Option<bool>;
}

impl<F> ExtractionPolicy for F
where
    F: Fn(&Path, &Path) -> Option<bool> + Send + Sync,
{
    fn should_extract(&self, path: &Path, project_root: &Path) -> Option<bool> {
        self(path, project_root)
    }
}

/// A policy that never overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverride;

impl ExtractionPolicy for NoOverride {
    fn should_extract(&self, _path: &Path, _project_root: &Path) -> Option<bool> {
        None
    }
}

/// The default exclusion rule for paths outside component packages.
///
/// Installed dependencies (`node_modules`) and non-script files are
/// excluded; everything else is eligible.
pub fn is_excluded_by_default(path: &Path) -> bool {
    let in_node_modules = path
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == "node_modules"));
    if in_node_modules {
        return true;
    }
    !path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusion() {
        assert!(!is_excluded_by_default(Path::new("/app/src/Button.tsx")));
        assert!(is_excluded_by_default(Path::new(
            "/app/node_modules/lib/index.js"
        )));
        assert!(is_excluded_by_default(Path::new("/app/src/styles.css")));
        assert!(is_excluded_by_default(Path::new("/app/src/Makefile")));
    }

    #[test]
    fn test_closure_policy() {
        let policy = |path: &Path, _root: &Path| {
            path.to_str()
                .filter(|p| p.contains("legacy"))
                .map(|_| false)
        };
        let root = Path::new("/app");
        assert_eq!(
            policy.should_extract(Path::new("/app/legacy/a.tsx"), root),
            Some(false)
        );
        assert_eq!(policy.should_extract(Path::new("/app/a.tsx"), root), None);
        assert_eq!(NoOverride.should_extract(Path::new("/app/a.tsx"), root), None);
    }
}
