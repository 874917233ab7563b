//! Content-addressed atomic rules.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::state::{Breakpoint, StateDescriptor};
use crate::value::{css_property_name, property_tag, StyleValue};

/// Number of digest bytes kept in an identifier (10 hex digits).
const ID_DIGEST_BYTES: usize = 5;

/// The state and breakpoint context of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub state: Option<&'static StateDescriptor>,
    pub breakpoint: Option<Breakpoint>,
}

impl VariantKey {
    pub fn new(state: Option<&'static StateDescriptor>, breakpoint: Option<Breakpoint>) -> Self {
        Self { state, breakpoint }
    }

    /// The unconditional context: no state, no breakpoint.
    pub fn base() -> Self {
        Self::new(None, None)
    }

    pub fn is_base(&self) -> bool {
        self.state.is_none() && self.breakpoint.is_none()
    }

    /// Stable text for hashing, e.g. `hover@sm(max-width:800px)`.
    ///
    /// The media query is part of the text so two tables that reuse a name
    /// for different ranges never share identifiers.
    pub fn key_text(&self) -> String {
        let state = self.state.map_or("-", |d| d.name);
        match &self.breakpoint {
            Some(bp) => format!("{}@{}{}", state, bp.name, bp.media_query()),
            None => format!("{}@-", state),
        }
    }
}

impl PartialOrd for VariantKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VariantKey {
    /// Base before states, states by priority then group, and within each
    /// state the default context before breakpoints, widest range first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.state
            .cmp(&other.state)
            .then_with(|| match (&self.breakpoint, &other.breakpoint) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.specificity_cmp(b),
            })
    }
}

/// A generated rule identifier, usable directly as a CSS class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    /// Hashes `(property, normalized value, variant)` into an identifier.
    ///
    /// Identical inputs always produce the identical identifier, in any
    /// process and on any platform.
    pub fn compute(property: &str, value: &StyleValue, variant: &VariantKey) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(property.as_bytes());
        hasher.update([0u8]);
        hasher.update(value.to_css().as_bytes());
        hasher.update([0u8]);
        hasher.update(variant.key_text().as_bytes());
        let digest = hasher.finalize();

        let hex: String = digest
            .iter()
            .take(ID_DIGEST_BYTES)
            .map(|b| format!("{:02x}", b))
            .collect();
        RuleId(format!("_{}-{}", property_tag(property), hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One property, one normalized value, one variant context.
///
/// Rules are immutable once built; recompilation produces new rules rather
/// than changing existing ones.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicRule {
    pub identifier: RuleId,
    pub property: String,
    pub value: StyleValue,
    pub variant: VariantKey,
}

impl AtomicRule {
    /// Builds a rule from an already normalized value.
    pub fn new(property: impl Into<String>, value: StyleValue, variant: VariantKey) -> Self {
        let property = property.into();
        let identifier = RuleId::compute(&property, &value, &variant);
        Self {
            identifier,
            property,
            value,
            variant,
        }
    }

    /// Returns `true` if both rules carry the same property, value and
    /// variant, whatever their identifiers.
    pub fn same_content(&self, other: &AtomicRule) -> bool {
        self.property == other.property
            && self.value == other.value
            && self.variant == other.variant
    }

    /// The full selector, e.g. `._bc-1a2b3c4d5e:hover`.
    pub fn selector(&self) -> String {
        let suffix = self.variant.state.map_or("", |d| d.selector);
        format!(".{}{}", self.identifier, suffix)
    }

    /// The declaration text, e.g. `background-color:rgba(255,0,0,1);`.
    pub fn declaration_text(&self) -> String {
        format!(
            "{}:{};",
            css_property_name(&self.property),
            self.value.to_css()
        )
    }

    pub fn media_query(&self) -> Option<String> {
        self.variant.breakpoint.as_ref().map(Breakpoint::media_query)
    }

    /// The complete rule, wrapped in `@media` when a breakpoint applies.
    pub fn to_css(&self) -> String {
        let rule = format!("{}{{{}}}", self.selector(), self.declaration_text());
        match self.media_query() {
            Some(query) => format!("@media {}{{{}}}", query, rule),
            None => rule,
        }
    }

    /// Total emission order: variant, then property, then identifier.
    pub fn emission_cmp(&self, other: &AtomicRule) -> Ordering {
        self.variant
            .cmp(&other.variant)
            .then_with(|| self.property.cmp(&other.property))
            .then_with(|| self.identifier.cmp(&other.identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::resolve_state;

    fn hover() -> Option<&'static StateDescriptor> {
        resolve_state("hoverStyle")
    }

    #[test]
    fn test_identifier_is_deterministic() {
        let a = RuleId::compute("width", &StyleValue::Str("10px".into()), &VariantKey::base());
        let b = RuleId::compute("width", &StyleValue::Str("10px".into()), &VariantKey::base());
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("_w-"));
        assert_eq!(a.as_str().len(), "_w-".len() + 10);
    }

    #[test]
    fn test_identifier_depends_on_variant() {
        let value = StyleValue::Str("red".into());
        let base = RuleId::compute("color", &value, &VariantKey::base());
        let hovered = RuleId::compute("color", &value, &VariantKey::new(hover(), None));
        let small = RuleId::compute(
            "color",
            &value,
            &VariantKey::new(None, Some(Breakpoint::max("sm", 800))),
        );
        assert_ne!(base, hovered);
        assert_ne!(base, small);
        assert_ne!(hovered, small);
    }

    #[test]
    fn test_rule_css() {
        let rule = AtomicRule::new(
            "backgroundColor",
            StyleValue::Str("rgba(255,0,0,1)".into()),
            VariantKey::new(hover(), Some(Breakpoint::max("sm", 800))),
        );
        let css = rule.to_css();
        assert!(css.starts_with("@media (max-width:800px){."));
        assert!(css.contains(":hover{background-color:rgba(255,0,0,1);}"));
        assert_eq!(rule.declaration_text(), "background-color:rgba(255,0,0,1);");
    }

    #[test]
    fn test_variant_order() {
        let base = VariantKey::base();
        let md = VariantKey::new(None, Some(Breakpoint::max("md", 1020)));
        let sm = VariantKey::new(None, Some(Breakpoint::max("sm", 800)));
        let hovered = VariantKey::new(hover(), None);
        let pressed = VariantKey::new(resolve_state("pressStyle"), None);

        let mut keys = vec![pressed.clone(), sm.clone(), hovered.clone(), md.clone(), base.clone()];
        keys.sort();
        assert_eq!(keys, vec![base, md, sm, hovered, pressed]);
    }
}
