//! Configuration errors.
//!
//! These are the only hard failures in the engine. Everything that concerns
//! individual style values degrades to a best-effort result instead.

use std::path::PathBuf;

use thiserror::Error;

/// Error returned when build configuration is structurally unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A configured component package could not be located at all.
    #[error("could not resolve component package '{name}' from {}", root.display())]
    ComponentNotFound { name: String, root: PathBuf },

    /// No `package.json` exists in any directory above a component path.
    #[error("couldn't find package.json in any path above: {}", path.display())]
    PackageRootNotFound { path: PathBuf },

    /// A user-supplied pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_root_not_found_display() {
        let err = ConfigError::PackageRootNotFound {
            path: PathBuf::from("/tmp/ui/index.js"),
        };
        let msg = err.to_string();
        assert!(msg.contains("package.json"));
        assert!(msg.contains("/tmp/ui/index.js"));
    }

    #[test]
    fn test_invalid_pattern_display() {
        let err = ConfigError::InvalidPattern {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "invalid pattern '(': unclosed group");
    }
}
