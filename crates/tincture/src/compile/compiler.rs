//! The atomic rule compiler.

use std::sync::Arc;

use super::declaration::StyleDeclaration;
use super::rule::{AtomicRule, RuleId};
use crate::state::Breakpoints;
use crate::value::Normalizer;

/// Turns one declaration into an ordered, duplicate-free list of rules.
///
/// The compiler itself is stateless; cross-component deduplication happens
/// in the [`StyleSession`](super::StyleSession) that owns the normalizer.
#[derive(Debug, Clone, Copy)]
pub struct RuleCompiler<'a> {
    normalizer: &'a Normalizer,
    breakpoints: &'a Breakpoints,
}

impl<'a> RuleCompiler<'a> {
    pub fn new(normalizer: &'a Normalizer, breakpoints: &'a Breakpoints) -> Self {
        Self {
            normalizer,
            breakpoints,
        }
    }

    /// Flattens, normalizes and orders `declaration`.
    ///
    /// Values that cannot be normalized are passed through unchanged.
    pub fn compile(&self, declaration: &StyleDeclaration) -> Vec<AtomicRule> {
        let mut rules: Vec<AtomicRule> = declaration
            .flatten(self.breakpoints)
            .into_iter()
            .map(|entry| {
                let value = self.normalizer.normalize(&entry.value, Some(&entry.property));
                AtomicRule::new(entry.property, value, entry.variant)
            })
            .collect();

        rules.sort_by(|a, b| a.emission_cmp(b));
        rules.dedup_by(|a, b| a.identifier == b.identifier);
        rules
    }
}

/// The rules produced for one declaration.
#[derive(Debug, Clone, Default)]
pub struct CompiledStyle {
    rules: Vec<Arc<AtomicRule>>,
}

impl CompiledStyle {
    pub(crate) fn new(rules: Vec<Arc<AtomicRule>>) -> Self {
        Self { rules }
    }

    /// Rules in emission order.
    pub fn rules(&self) -> &[Arc<AtomicRule>] {
        &self.rules
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &RuleId> {
        self.rules.iter().map(|r| &r.identifier)
    }

    /// Space separated class list for the element.
    pub fn class_names(&self) -> String {
        self.identifiers()
            .map(RuleId::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{Mode, Platform};
    use crate::value::StyleValue;

    fn compile(declaration: &StyleDeclaration) -> Vec<AtomicRule> {
        let normalizer = Normalizer::new(Platform::Web, Mode::Production);
        let breakpoints = Breakpoints::default();
        RuleCompiler::new(&normalizer, &breakpoints).compile(declaration)
    }

    #[test]
    fn test_compile_normalizes_values() {
        let rules = compile(
            &StyleDeclaration::new()
                .with("width", 10)
                .with("zIndex", 5)
                .with("backgroundColor", "red"),
        );
        let value_of = |p: &str| {
            rules
                .iter()
                .find(|r| r.property == p)
                .map(|r| r.value.clone())
        };
        assert_eq!(value_of("width"), Some(StyleValue::Str("10px".into())));
        assert_eq!(value_of("zIndex"), Some(StyleValue::Number(5.0)));
        assert_eq!(
            value_of("backgroundColor"),
            Some(StyleValue::Str("rgba(255,0,0,1)".into()))
        );
    }

    #[test]
    fn test_breakpoint_precedence() {
        let rules = compile(
            &StyleDeclaration::new()
                .with("width", 100)
                .with_media("sm", StyleDeclaration::new().with("width", 50))
                .with_media("md", StyleDeclaration::new().with("width", 75)),
        );
        let order: Vec<Option<&str>> = rules
            .iter()
            .map(|r| r.variant.breakpoint.as_ref().map(|b| b.name.as_str()))
            .collect();
        assert_eq!(order, vec![None, Some("md"), Some("sm")]);
    }

    #[test]
    fn test_state_rules_follow_base() {
        let rules = compile(
            &StyleDeclaration::new()
                .with_state("focusStyle", [("opacity", 1)])
                .with_state("hoverStyle", [("opacity", 0.9)])
                .with("opacity", 0.5),
        );
        let states: Vec<Option<&str>> = rules
            .iter()
            .map(|r| r.variant.state.map(|d| d.name))
            .collect();
        assert_eq!(states, vec![None, Some("hover"), Some("focus")]);
    }

    #[test]
    fn test_malformed_values_pass_through() {
        let declaration =
            StyleDeclaration::from_json(&serde_json::json!({ "transform": [{ "scale": 2 }] }));
        let rules = compile(&declaration);
        assert_eq!(rules.len(), 1);
        assert!(matches!(rules[0].value, StyleValue::Raw(_)));
    }

    #[test]
    fn test_class_names() {
        let normalizer = Normalizer::new(Platform::Web, Mode::Production);
        let breakpoints = Breakpoints::default();
        let rules = RuleCompiler::new(&normalizer, &breakpoints)
            .compile(&StyleDeclaration::new().with("width", 1).with("height", 2));
        let compiled = CompiledStyle::new(rules.into_iter().map(Arc::new).collect());
        let names = compiled.class_names();
        assert_eq!(names.split(' ').count(), 2);
        assert!(names.contains("_h-"));
        assert!(names.contains("_w-"));
    }
}
