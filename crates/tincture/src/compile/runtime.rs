//! The runtime resolution table.
//!
//! Declarations that cannot be extracted are still flattened and hashed
//! with the same identifier scheme as emitted rules, so the rendering layer
//! can look them up by identifier at render time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rule::{AtomicRule, RuleId};
use crate::value::StyleValue;

/// A deferred rule, resolved by the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeEntry {
    pub property: String,
    /// Normalized where possible; dynamic values keep their expression.
    pub value: StyleValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

impl From<&AtomicRule> for RuntimeEntry {
    fn from(rule: &AtomicRule) -> Self {
        Self {
            property: rule.property.clone(),
            value: rule.value.clone(),
            state: rule.variant.state.map(|d| d.name.to_string()),
            breakpoint: rule.variant.breakpoint.as_ref().map(|b| b.name.clone()),
            media: rule.media_query(),
        }
    }
}

/// Deferred rules keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeTable {
    entries: BTreeMap<RuleId, RuntimeEntry>,
}

impl RuntimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule unless its identifier is already present.
    pub fn insert(&mut self, rule: &AtomicRule) -> bool {
        if self.entries.contains_key(&rule.identifier) {
            return false;
        }
        self.entries
            .insert(rule.identifier.clone(), RuntimeEntry::from(rule));
        true
    }

    pub fn get(&self, identifier: &str) -> Option<&RuntimeEntry> {
        self.entries.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RuleId, &RuntimeEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::VariantKey;
    use crate::state::{resolve_state, Breakpoint};

    #[test]
    fn test_insert_dedups_by_identifier() {
        let rule = AtomicRule::new("width", StyleValue::dynamic("props.w"), VariantKey::base());
        let mut table = RuntimeTable::new();
        assert!(table.insert(&rule));
        assert!(!table.insert(&rule));
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(rule.identifier.as_str()).map(|e| &e.value),
            Some(&StyleValue::dynamic("props.w"))
        );
    }

    #[test]
    fn test_entry_serializes_context() {
        let rule = AtomicRule::new(
            "opacity",
            StyleValue::Number(0.5),
            VariantKey::new(resolve_state("hover"), Some(Breakpoint::max("sm", 800))),
        );
        let mut table = RuntimeTable::new();
        table.insert(&rule);
        let json = serde_json::to_value(&table).unwrap();
        let entry = &json[rule.identifier.as_str()];
        assert_eq!(entry["property"], "opacity");
        assert_eq!(entry["state"], "hover");
        assert_eq!(entry["breakpoint"], "sm");
        assert_eq!(entry["media"], "(max-width:800px)");
    }
}
