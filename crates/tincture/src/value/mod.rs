//! Style values and their platform normalization.
//!
//! This module provides:
//!
//! - [`StyleValue`]: A raw or normalized style value
//! - [`Normalizer`]: Converts values to their platform form and back
//! - [`PropertyKind`]: The fixed partition of property names
//! - [`normalize_color`]: Best-effort color canonicalization

mod color;
mod normalize;
mod property;
mod style_value;

pub use color::normalize_color;
pub(crate) use normalize::selector_class;
pub use normalize::{Normalizer, UNIT_SUFFIX};
pub use property::{css_property_name, property_kind, property_tag, PropertyKind};
pub use style_value::StyleValue;
