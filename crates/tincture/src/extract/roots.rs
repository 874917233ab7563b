//! Component package roots.
//!
//! Component packages are compiled even though they usually live under
//! `node_modules`. Their package roots are resolved once, up front, by
//! walking up from the package location to the nearest `package.json`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

/// Resolved root directories of the component packages in a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentRoots {
    roots: Vec<(String, PathBuf)>,
}

impl ComponentRoots {
    /// Resolves each package identifier relative to `project_root`.
    ///
    /// Identifiers are looked up in `node_modules` directories from the
    /// project root upwards; identifiers starting with `.` or `/` are paths.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ComponentNotFound`] if a package cannot be located,
    /// [`ConfigError::PackageRootNotFound`] if no `package.json` exists above
    /// its location.
    pub fn resolve<S: AsRef<str>>(
        components: &[S],
        project_root: &Path,
    ) -> Result<Self, ConfigError> {
        let mut roots = Vec::with_capacity(components.len());
        for component in components {
            let name = component.as_ref();
            let location =
                locate_package(name, project_root).ok_or_else(|| ConfigError::ComponentNotFound {
                    name: name.to_string(),
                    root: project_root.to_path_buf(),
                })?;
            let root = package_root(&location)?;
            debug!(component = name, root = %root.display(), "resolved component package");
            roots.push((name.to_string(), root));
        }
        Ok(Self { roots })
    }

    /// Uses already known root directories.
    pub fn from_dirs<I, S, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            roots: dirs
                .into_iter()
                .map(|(name, dir)| (name.into(), dir.into()))
                .collect(),
        }
    }

    /// Returns `true` if `path` lies inside any component package.
    pub fn contains(&self, path: &Path) -> bool {
        self.roots.iter().any(|(_, root)| path.starts_with(root))
    }

    pub fn roots(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.roots
            .iter()
            .map(|(name, root)| (name.as_str(), root.as_path()))
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn locate_package(name: &str, project_root: &Path) -> Option<PathBuf> {
    if name.starts_with('.') || name.starts_with('/') {
        let path = project_root.join(name);
        return path.exists().then_some(path);
    }
    project_root
        .ancestors()
        .map(|dir| dir.join("node_modules").join(name))
        .find(|candidate| candidate.exists())
}

/// Walks up from `start` to the nearest directory holding `package.json`.
fn package_root(start: &Path) -> Result<PathBuf, ConfigError> {
    let first = if start.is_dir() {
        Some(start)
    } else {
        start.parent()
    };
    first
        .into_iter()
        .flat_map(Path::ancestors)
        .find(|dir| dir.join("package.json").is_file())
        .map(Path::to_path_buf)
        .ok_or_else(|| ConfigError::PackageRootNotFound {
            path: start.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_package(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("package.json"), "{}").unwrap();
    }

    #[test]
    fn test_resolve_from_node_modules() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("node_modules").join("@acme").join("ui");
        write_package(&pkg);

        let roots = ComponentRoots::resolve(&["@acme/ui"], tmp.path()).unwrap();
        assert!(roots.contains(&pkg.join("dist").join("Button.js")));
        assert!(!roots.contains(&tmp.path().join("src").join("App.tsx")));
    }

    #[test]
    fn test_resolve_walks_up_to_package_json() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("packages").join("kit");
        write_package(&pkg);
        let entry = pkg.join("src").join("index.ts");
        fs::create_dir_all(entry.parent().unwrap()).unwrap();
        fs::write(&entry, "").unwrap();

        let roots = ComponentRoots::resolve(&["./packages/kit/src/index.ts"], tmp.path()).unwrap();
        assert_eq!(roots.roots().next().map(|(_, p)| p), Some(pkg.as_path()));
    }

    #[test]
    fn test_missing_component_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ComponentRoots::resolve(&["does-not-exist"], tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ComponentNotFound { .. }));
    }

    #[test]
    fn test_from_dirs_contains() {
        let roots = ComponentRoots::from_dirs([("kit", "/repo/packages/kit")]);
        assert!(roots.contains(Path::new("/repo/packages/kit/src/a.tsx")));
        assert!(!roots.contains(Path::new("/repo/packages/kitchen/a.tsx")));
    }
}
