//! Bundler errors.

use thiserror::Error;
use tincture::ConfigError;

/// Error raised while wiring a build.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Component roots or user patterns are unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Options or a build manifest failed to parse.
    #[error("invalid build input: {0}")]
    Json(#[from] serde_json::Error),

    /// The host pipeline lacks a rule group the adapter must extend.
    #[error("host pipeline has no {0} rule group")]
    MissingRuleGroup(&'static str),
}
