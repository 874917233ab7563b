//! Platform normalization with forward and reverse caches.
//!
//! The [`Normalizer`] converts raw `(property, value)` pairs into the form
//! the target platform expects, and later recovers semantic values from
//! emitted rules (for example when an animation needs to interpolate from a
//! compiled class back to a number).
//!
//! # Caches
//!
//! | Cache | Key | Populated by |
//! |-------|-----|--------------|
//! | forward | property class + raw value | color normalization |
//! | selectors | rule identifier | rules actually emitted to a stylesheet |
//! | reverse | declaration text | [`Normalizer::reverse_resolve`] |
//!
//! None of them is ever invalidated; a normalizer lives exactly as long as
//! the build session that owns it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::color::normalize_color;
use super::property::{property_kind, PropertyKind};
use super::style_value::{format_number, StyleValue};
use crate::target::{Mode, Platform};

/// Unit appended to bare numbers on the web target.
pub const UNIT_SUFFIX: &str = "px";

/// Converts style values to their platform representation and back.
///
/// All methods take `&self`; the caches are guarded so one normalizer can be
/// shared across threads compiling different modules.
#[derive(Debug, Default)]
pub struct Normalizer {
    platform: Platform,
    mode: Mode,
    forward: RwLock<HashMap<String, StyleValue>>,
    selectors: RwLock<HashMap<String, String>>,
    reverse: RwLock<HashMap<String, StyleValue>>,
}

impl Normalizer {
    /// Creates a normalizer for `platform` with empty caches.
    pub fn new(platform: Platform, mode: Mode) -> Self {
        Self {
            platform,
            mode,
            ..Self::default()
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Normalizes `value` for `property`.
    ///
    /// - Unitless properties pass through unchanged, whatever the value type.
    /// - A cached result for the same raw value is returned as is.
    /// - On the web target, numbers become `"<n>px"`.
    /// - Color properties are canonicalized and the result is cached.
    /// - Everything else is returned unchanged.
    ///
    /// ```rust
    /// use tincture::{Mode, Normalizer, Platform, StyleValue};
    ///
    /// let normalizer = Normalizer::new(Platform::Web, Mode::Production);
    /// assert_eq!(
    ///     normalizer.normalize(&StyleValue::Number(10.0), Some("width")),
    ///     StyleValue::Str("10px".into()),
    /// );
    /// assert_eq!(
    ///     normalizer.normalize(&StyleValue::Number(5.0), Some("zIndex")),
    ///     StyleValue::Number(5.0),
    /// );
    /// ```
    pub fn normalize(&self, value: &StyleValue, property: Option<&str>) -> StyleValue {
        let kind = property.map(property_kind);
        if kind == Some(PropertyKind::UnitlessNumeric) {
            return value.clone();
        }

        let key = forward_key(value, kind);
        if let Some(cached) = read(&self.forward).get(&key) {
            return cached.clone();
        }

        match value {
            StyleValue::Number(n) if self.platform.needs_units() => {
                StyleValue::Str(format!("{}{}", format_number(*n), UNIT_SUFFIX))
            }
            StyleValue::Str(raw) if kind == Some(PropertyKind::Color) => {
                let normalized = StyleValue::Str(normalize_color(raw));
                debug!(raw = %raw, normalized = %normalized, "normalized color");
                write(&self.forward).insert(key, normalized.clone());
                normalized
            }
            _ => value.clone(),
        }
    }

    /// Records the declaration text of an emitted rule so its value can be
    /// recovered from the identifier later.
    pub fn record_rule(&self, identifier: &str, declaration: &str) {
        write(&self.selectors).insert(identifier.to_string(), declaration.to_string());
    }

    /// Returns the recorded declaration text for `identifier`, if any.
    ///
    /// Accepts a bare identifier or a full selector such as
    /// `._w-1a2b3c4d5e:hover`; the state suffix is ignored.
    pub fn declaration_for(&self, identifier: &str) -> Option<String> {
        read(&self.selectors)
            .get(selector_class(identifier))
            .cloned()
    }

    /// Recovers the semantic value behind a compiled rule.
    ///
    /// `property` is the style key the caller is interested in; it decides
    /// whether a bare number is expected. Returns `None` when the identifier
    /// was never emitted, in which case the caller has to fall back to the
    /// raw dynamic value.
    ///
    /// - `var(...)` references come back verbatim as [`StyleValue::Token`].
    /// - Unitless properties parse as numbers.
    /// - Values ending in the unit suffix are stripped and parsed as numbers.
    /// - Anything else is returned as a string.
    pub fn reverse_resolve(&self, property: &str, identifier: &str) -> Option<StyleValue> {
        let declaration = self.declaration_for(identifier)?;
        if let Some(cached) = read(&self.reverse).get(&declaration) {
            return Some(cached.clone());
        }

        let css_value = declaration_value(&declaration);
        let resolved = if css_value.starts_with("var(") {
            StyleValue::Token(css_value.to_string())
        } else if property_kind(property) == PropertyKind::UnitlessNumeric {
            self.parse_number(css_value, &declaration, property, identifier)
        } else if let Some(number) = css_value.strip_suffix(UNIT_SUFFIX) {
            self.parse_number(number, &declaration, property, identifier)
        } else if let Some(number) = self.bare_number(css_value, property) {
            StyleValue::Number(number)
        } else {
            StyleValue::Str(css_value.to_string())
        };

        write(&self.reverse).insert(declaration, resolved.clone());
        Some(resolved)
    }

    fn parse_number(
        &self,
        text: &str,
        declaration: &str,
        property: &str,
        identifier: &str,
    ) -> StyleValue {
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => StyleValue::Number(n),
            _ => {
                if self.mode.is_development() {
                    warn!(
                        value = text,
                        rule = declaration,
                        property,
                        identifier,
                        "invalid reverse-mapped value, expected a number"
                    );
                }
                StyleValue::Str(text.to_string())
            }
        }
    }

    /// Generic properties keep bare numbers on targets without units.
    fn bare_number(&self, css_value: &str, property: &str) -> Option<f64> {
        if self.platform.needs_units() || property_kind(property) != PropertyKind::Generic {
            return None;
        }
        css_value.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// Number of values in the forward cache.
    pub fn cached_len(&self) -> usize {
        read(&self.forward).len()
    }
}

/// Forward cache key: raw value namespaced by the property class, so a raw
/// value cached for a color property never leaks into another class.
fn forward_key(value: &StyleValue, kind: Option<PropertyKind>) -> String {
    let class = match kind {
        Some(PropertyKind::Color) => "color",
        _ => "value",
    };
    format!("{}|{}", class, value.cache_key())
}

/// Extracts the value part of `prop:value;` text.
fn declaration_value(declaration: &str) -> &str {
    let value = declaration
        .split_once(':')
        .map_or(declaration, |(_, value)| value)
        .trim_end();
    value.strip_suffix(';').unwrap_or(value).trim()
}

/// The class part of a selector: `._w-1a2b:hover` becomes `_w-1a2b`.
pub(crate) fn selector_class(selector: &str) -> &str {
    let class = selector.trim().trim_start_matches('.');
    class
        .find([':', '['])
        .map_or(class, |end| &class[..end])
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web() -> Normalizer {
        Normalizer::new(Platform::Web, Mode::Development)
    }

    #[test]
    fn test_unitless_passes_through() {
        let n = web();
        assert_eq!(
            n.normalize(&StyleValue::Number(5.0), Some("zIndex")),
            StyleValue::Number(5.0)
        );
        assert_eq!(
            n.normalize(&StyleValue::Number(0.5), Some("opacity")),
            StyleValue::Number(0.5)
        );
        assert_eq!(
            n.normalize(&StyleValue::Str("red".into()), Some("opacity")),
            StyleValue::Str("red".into())
        );
    }

    #[test]
    fn test_web_numbers_get_units() {
        let n = web();
        assert_eq!(
            n.normalize(&StyleValue::Number(10.0), Some("width")),
            StyleValue::Str("10px".into())
        );
        assert_eq!(
            n.normalize(&StyleValue::Number(1.5), None),
            StyleValue::Str("1.5px".into())
        );
    }

    #[test]
    fn test_native_numbers_unchanged() {
        let n = Normalizer::new(Platform::Native, Mode::Production);
        assert_eq!(
            n.normalize(&StyleValue::Number(10.0), Some("width")),
            StyleValue::Number(10.0)
        );
    }

    #[test]
    fn test_color_is_normalized_and_cached() {
        let n = web();
        let red = StyleValue::Str("red".into());
        assert_eq!(
            n.normalize(&red, Some("backgroundColor")),
            StyleValue::Str("rgba(255,0,0,1)".into())
        );
        assert_eq!(n.cached_len(), 1);
        assert_eq!(
            n.normalize(&red, Some("color")),
            StyleValue::Str("rgba(255,0,0,1)".into())
        );
        assert_eq!(n.cached_len(), 1);
    }

    #[test]
    fn test_color_cache_does_not_leak_to_generic_properties() {
        let n = web();
        let red = StyleValue::Str("red".into());
        n.normalize(&red, Some("backgroundColor"));
        assert_eq!(n.normalize(&red, Some("fontFamily")), red);
    }

    #[test]
    fn test_tokens_and_dynamic_pass_through() {
        let n = web();
        let token = StyleValue::Token("$brand".into());
        assert_eq!(n.normalize(&token, Some("color")), token);
        let dynamic = StyleValue::dynamic("props.w");
        assert_eq!(n.normalize(&dynamic, Some("width")), dynamic);
    }

    #[test]
    fn test_reverse_resolve_px() {
        let n = web();
        n.record_rule("_w-abc", "width:42px;");
        assert_eq!(
            n.reverse_resolve("width", "_w-abc"),
            Some(StyleValue::Number(42.0))
        );
        // leading dot is accepted
        assert_eq!(
            n.reverse_resolve("width", "._w-abc"),
            Some(StyleValue::Number(42.0))
        );
    }

    #[test]
    fn test_reverse_resolve_unitless_and_var() {
        let n = web();
        n.record_rule("_o-1", "opacity:0.5;");
        n.record_rule("_c-1", "color:var(--brand);");
        assert_eq!(
            n.reverse_resolve("opacity", "_o-1"),
            Some(StyleValue::Number(0.5))
        );
        assert_eq!(
            n.reverse_resolve("color", "_c-1"),
            Some(StyleValue::Token("var(--brand)".into()))
        );
    }

    #[test]
    fn test_reverse_resolve_string_and_missing() {
        let n = web();
        n.record_rule("_bc-1", "background-color:rgba(255,0,0,1);");
        assert_eq!(
            n.reverse_resolve("backgroundColor", "_bc-1"),
            Some(StyleValue::Str("rgba(255,0,0,1)".into()))
        );
        assert_eq!(n.reverse_resolve("width", "_w-missing"), None);
    }

    #[test]
    fn test_reverse_resolve_bad_number_degrades() {
        let n = web();
        n.record_rule("_z-1", "z-index:auto;");
        assert_eq!(
            n.reverse_resolve("zIndex", "_z-1"),
            Some(StyleValue::Str("auto".into()))
        );
    }

    #[test]
    fn test_declaration_value() {
        assert_eq!(declaration_value("width:10px;"), "10px");
        assert_eq!(declaration_value("color: var(--a) ;"), "var(--a)");
        assert_eq!(
            declaration_value("background-image:url(http://x/y.png);"),
            "url(http://x/y.png)"
        );
        assert_eq!(
            declaration_value("background-image:url(data:image/svg+xml;base64,AAAA);"),
            "url(data:image/svg+xml;base64,AAAA)"
        );
    }

    #[test]
    fn test_reverse_resolve_keeps_semicolons_in_value() {
        let n = web();
        n.record_rule("_bi-1", "background-image:url(data:image/svg+xml;base64,AAAA);");
        assert_eq!(
            n.reverse_resolve("backgroundImage", "_bi-1"),
            Some(StyleValue::Str("url(data:image/svg+xml;base64,AAAA)".into()))
        );
    }

    #[test]
    fn test_reverse_resolve_by_state_selector() {
        let n = web();
        n.record_rule("_w-abc", "width:42px;");
        assert_eq!(
            n.reverse_resolve("width", "._w-abc:hover"),
            Some(StyleValue::Number(42.0))
        );
        assert_eq!(
            n.reverse_resolve("width", "._w-abc[data-presence=\"exit\"]"),
            Some(StyleValue::Number(42.0))
        );
    }

    #[test]
    fn test_selector_class() {
        assert_eq!(selector_class("_w-abc"), "_w-abc");
        assert_eq!(selector_class("._w-abc:active"), "_w-abc");
        assert_eq!(selector_class("._w-abc[data-presence=\"enter\"]"), "_w-abc");
    }

    #[test]
    fn test_native_reverse_resolve_keeps_numbers() {
        let n = Normalizer::new(Platform::Native, Mode::Development);
        n.record_rule("_w-n", "width:42;");
        n.record_rule("_ff-n", "font-family:Inter;");
        assert_eq!(
            n.reverse_resolve("width", "_w-n"),
            Some(StyleValue::Number(42.0))
        );
        assert_eq!(
            n.reverse_resolve("fontFamily", "_ff-n"),
            Some(StyleValue::Str("Inter".into()))
        );

        let web = web();
        web.record_rule("_w-w", "width:42;");
        assert_eq!(
            web.reverse_resolve("width", "_w-w"),
            Some(StyleValue::Str("42".into()))
        );
    }
}
