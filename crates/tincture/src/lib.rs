//! # Tincture - Atomic Style Compilation
//!
//! Tincture turns declarative style objects into deduplicated atomic CSS
//! rules, deciding per source module whether a declaration can be compiled
//! ahead of time or has to stay dynamic for the runtime resolver.
//!
//! ## Core Concepts
//!
//! - [`StyleValue`]: A raw style value (number, string, theme token, dynamic expression)
//! - [`Normalizer`]: Platform normalization with forward and reverse caches
//! - [`StateDescriptor`]: Ordering metadata for hover/press/focus/enter/exit variants
//! - [`Breakpoint`]: A named responsive media range
//! - [`StyleDeclaration`]: Base properties plus state and breakpoint variants
//! - [`AtomicRule`]: One content-addressed property/value/variant rule
//! - [`StyleSession`]: Per-build compilation scope owning all shared tables
//! - [`ExtractionDecider`]: Static-versus-runtime routing per source path
//!
//! ## Quick Start
//!
//! ```rust
//! use tincture::{Mode, Platform, StyleDeclaration, StyleSession};
//!
//! let session = StyleSession::new(Platform::Web, Mode::Production);
//! let declaration = StyleDeclaration::new()
//!     .with("width", 10)
//!     .with("backgroundColor", "red")
//!     .with_state("hoverStyle", [("backgroundColor", "blue")]);
//!
//! let compiled = session.compile(&declaration);
//! assert_eq!(compiled.rules().len(), 3);
//!
//! // Values can be recovered from the generated class names.
//! let width = compiled.rules().iter().find(|r| r.property == "width").unwrap();
//! assert_eq!(
//!     session.reverse_resolve("width", width.identifier.as_str()),
//!     Some(tincture::StyleValue::Number(10.0)),
//! );
//! ```
//!
//! ## Failure Policy
//!
//! Value-level problems never abort compilation: malformed colors, unknown
//! states and non-scalar values degrade to pass-through, because anything
//! not confidently resolvable at build time still has a runtime path.
//! Only configuration problems surface as [`ConfigError`].

pub mod compile;
mod error;
pub mod extract;
pub mod state;
mod target;
pub mod value;

pub use compile::{
    AtomicRule, CompiledStyle, RuleCompiler, RuleId, RuntimeEntry, RuntimeTable,
    StyleDeclaration, StyleMap, StyleSession, VariantKey,
};
pub use error::ConfigError;
pub use extract::{
    ComponentRoots, DeferReason, Decision, ExtractionDecider, ExtractionPolicy, NoOverride,
};
pub use state::{
    all_descriptors, resolve_state, Breakpoint, Breakpoints, StateDescriptor,
};
pub use target::{Mode, Platform};
pub use value::{
    css_property_name, normalize_color, property_kind, Normalizer, PropertyKind, StyleValue,
    UNIT_SUFFIX,
};
