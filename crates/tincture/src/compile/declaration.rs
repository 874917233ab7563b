//! Style declarations.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use super::rule::VariantKey;
use crate::state::{exclusive_winners, resolve_state, Breakpoint, Breakpoints, StateDescriptor};
use crate::value::StyleValue;

/// Property name to value.
pub type StyleMap = BTreeMap<String, StyleValue>;

/// A style object attached to a component.
///
/// In JSON form, keys naming a state (`hoverStyle`, `pressStyle`, ...) hold
/// state variants, keys starting with `$` hold breakpoint variants, and all
/// other keys are base properties:
///
/// ```json
/// {
///   "width": 100,
///   "hoverStyle": { "backgroundColor": "red" },
///   "$sm": { "width": 50, "pressStyle": { "opacity": 0.8 } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDeclaration {
    pub base: StyleMap,
    /// Keyed by state style key, e.g. `hoverStyle`.
    pub states: BTreeMap<String, StyleMap>,
    /// Keyed by breakpoint name without the `$`.
    pub media: BTreeMap<String, StyleDeclaration>,
}

/// One flattened `(property, value, variant)` triple.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FlatEntry {
    pub property: String,
    pub value: StyleValue,
    pub variant: VariantKey,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a base property.
    pub fn with(mut self, property: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.base.insert(property.into(), value.into());
        self
    }

    /// Adds properties under a state (`hoverStyle` or `hover`).
    pub fn with_state<I, K, V>(mut self, state: &str, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<StyleValue>,
    {
        let key = resolve_state(state).map_or(state, |d| d.key).to_string();
        let map = self.states.entry(key).or_default();
        for (property, value) in properties {
            map.insert(property.into(), value.into());
        }
        self
    }

    /// Adds a breakpoint variant (`sm` or `$sm`).
    pub fn with_media(mut self, breakpoint: &str, declaration: StyleDeclaration) -> Self {
        self.media
            .insert(breakpoint.trim_start_matches('$').to_string(), declaration);
        self
    }

    /// Builds a declaration from a JSON style object.
    ///
    /// Non-object input yields an empty declaration.
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(object) = value else {
            return Self::default();
        };

        let mut declaration = Self::default();
        for (key, value) in object {
            match (resolve_state(key), value) {
                (Some(descriptor), Value::Object(props)) => {
                    let map = declaration
                        .states
                        .entry(descriptor.key.to_string())
                        .or_default();
                    for (property, value) in props {
                        map.insert(property.clone(), StyleValue::from_json(value));
                    }
                }
                (None, Value::Object(_)) if key.starts_with('$') => {
                    declaration.media.insert(
                        key.trim_start_matches('$').to_string(),
                        StyleDeclaration::from_json(value),
                    );
                }
                _ => {
                    declaration
                        .base
                        .insert(key.clone(), StyleValue::from_json(value));
                }
            }
        }
        declaration
    }

    /// Converts back to the JSON style object form.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (property, value) in &self.base {
            object.insert(property.clone(), style_value_json(value));
        }
        for (state, map) in &self.states {
            let props = map
                .iter()
                .map(|(p, v)| (p.clone(), style_value_json(v)))
                .collect();
            object.insert(state.clone(), Value::Object(props));
        }
        for (breakpoint, nested) in &self.media {
            object.insert(format!("${}", breakpoint), nested.to_json());
        }
        Value::Object(object)
    }

    /// Returns `true` if every value that compiles under `breakpoints` is
    /// known at build time.
    ///
    /// Variants [`flatten`](Self::flatten) drops (unknown states, unknown or
    /// nested breakpoints, losing exclusive states) are not considered.
    pub fn is_static(&self, breakpoints: &Breakpoints) -> bool {
        self.flatten(breakpoints)
            .iter()
            .all(|entry| !entry.value.is_dynamic())
    }

    /// Returns `true` if the declaration holds no properties at all.
    pub fn is_empty(&self) -> bool {
        self.values().next().is_none()
    }

    fn values(&self) -> Box<dyn Iterator<Item = &StyleValue> + '_> {
        Box::new(
            self.base
                .values()
                .chain(self.states.values().flat_map(|m| m.values()))
                .chain(self.media.values().flat_map(|nested| nested.values())),
        )
    }

    /// Flattens into triples, resolving state exclusion and breakpoints.
    ///
    /// Unknown states and breakpoints are skipped. Breakpoint variants nested
    /// inside another breakpoint are not supported and are skipped as well.
    pub(crate) fn flatten(&self, breakpoints: &Breakpoints) -> Vec<FlatEntry> {
        let mut entries = Vec::new();
        self.flatten_level(None, &mut entries);

        for (name, nested) in &self.media {
            match breakpoints.get(name) {
                Some(breakpoint) => nested.flatten_level(Some(breakpoint), &mut entries),
                None => debug!(breakpoint = %name, "unknown breakpoint, variant skipped"),
            }
            if !nested.media.is_empty() {
                debug!(breakpoint = %name, "nested breakpoint variants skipped");
            }
        }
        entries
    }

    fn flatten_level(&self, breakpoint: Option<&Breakpoint>, entries: &mut Vec<FlatEntry>) {
        for (property, value) in &self.base {
            entries.push(FlatEntry {
                property: property.clone(),
                value: value.clone(),
                variant: VariantKey::new(None, breakpoint.cloned()),
            });
        }

        let mut by_property: BTreeMap<&str, Vec<(&'static StateDescriptor, &StyleValue)>> =
            BTreeMap::new();
        for (state, map) in &self.states {
            let Some(descriptor) = resolve_state(state) else {
                debug!(state = %state, "unknown state, variant skipped");
                continue;
            };
            for (property, value) in map {
                by_property
                    .entry(property.as_str())
                    .or_default()
                    .push((descriptor, value));
            }
        }

        for (property, candidates) in by_property {
            let winners = exclusive_winners(candidates.iter().map(|(d, _)| *d));
            for (descriptor, value) in candidates {
                if !winners.contains(&descriptor) {
                    continue;
                }
                entries.push(FlatEntry {
                    property: property.to_string(),
                    value: value.clone(),
                    variant: VariantKey::new(Some(descriptor), breakpoint.cloned()),
                });
            }
        }
    }
}

fn style_value_json(value: &StyleValue) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl Serialize for StyleDeclaration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StyleDeclaration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(StyleDeclaration::from_json(&value))
    }
}
