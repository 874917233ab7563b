//! Atomic rule compilation.
//!
//! This module provides:
//!
//! - [`StyleDeclaration`]: A style object with state and breakpoint variants
//! - [`AtomicRule`] / [`RuleId`] / [`VariantKey`]: Content-addressed rules
//! - [`RuleCompiler`]: Flattens, normalizes and orders one declaration
//! - [`StyleSession`]: The per-build scope that deduplicates rules across
//!   components and keeps the runtime resolution table
//!
//! # Ordering
//!
//! Rules are totally ordered by state priority (base first), state group,
//! breakpoint range (widest first), property and identifier. The order
//! never depends on how the input declaration was traversed.

mod compiler;
mod declaration;
mod rule;
mod runtime;
mod session;

pub use compiler::{CompiledStyle, RuleCompiler};
pub use declaration::{StyleDeclaration, StyleMap};
pub use rule::{AtomicRule, RuleId, VariantKey};
pub use runtime::{RuntimeEntry, RuntimeTable};
pub use session::StyleSession;
