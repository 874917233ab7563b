//! # Tincture Bundler - Static Extraction in a Bundler Pipeline
//!
//! This crate plugs the [`tincture`] engine into a module-bundling
//! pipeline. It decides nothing about styles on its own; it sequences the
//! engine's passes and adapts the host's configuration around them.
//!
//! ## What the adapter does
//!
//! - Runs static extraction ahead of the general source compiler, skipping
//!   modules the [`ExtractionDecider`](tincture::ExtractionDecider) excludes
//! - Assembles one deduplicated [`Stylesheet`] for the whole build and
//!   minifies it in production
//! - Externalizes platform-native modules on the server bundle while keeping
//!   component packages inline
//! - Installs resolution aliases from native packages to their web
//!   substitutes
//!
//! ## Example
//!
//! ```rust
//! use tincture::{Mode, Platform, StyleDeclaration};
//! use tincture_bundler::{Build, BuildEnv, BundlerOptions, SourceModule};
//!
//! let env = BuildEnv::new(Platform::Web, Mode::Production);
//! let build = Build::new(BundlerOptions::default(), env, "/app").unwrap();
//!
//! let card = StyleDeclaration::new().with("padding", 8).with("color", "red");
//! let modules = vec![
//!     SourceModule::new("src/Card.tsx").with("Card", card.clone()),
//!     SourceModule::new("src/Badge.tsx").with("Badge", card),
//! ];
//!
//! let output = build.run(&modules);
//! // Both components share the same two rules.
//! assert_eq!(output.stylesheet.len(), 2);
//! assert_eq!(output.modules[0].declarations[0].class_names,
//!            output.modules[1].declarations[0].class_names);
//! ```

pub mod aliases;
mod build;
mod env;
mod error;
pub mod externals;
pub mod host;
mod options;
pub mod pipeline;
mod stylesheet;

pub use build::{
    Build, BuildManifest, BuildOutput, DeclarationReport, ModuleReport, NamedDeclaration,
    SourceModule,
};
pub use env::{BuildEnv, DEBUG_VAR, NODE_ENV_VAR, TARGET_VAR};
pub use error::BundleError;
pub use externals::{ExternalRequest, Externalizer, Placement};
pub use host::HostConfig;
pub use options::{BundlerOptions, CssTest, ServerOverride};
pub use pipeline::PipelineAdapter;
pub use stylesheet::{StyleBlock, Stylesheet};
