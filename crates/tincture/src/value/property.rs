//! Property classification and CSS naming.
//!
//! Every property name falls into exactly one [`PropertyKind`]. The unitless
//! and color sets are fixed when the tables are first touched and never
//! change afterwards.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// The normalization class of a style property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Numeric values never receive a unit suffix (`zIndex`, `opacity`).
    UnitlessNumeric,
    /// Values are routed through color normalization.
    Color,
    /// Numbers receive the platform unit suffix on the web target.
    Generic,
}

static UNITLESS_NUMBERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "WebkitLineClamp",
        "animationIterationCount",
        "aspectRatio",
        "borderImageOutset",
        "borderImageSlice",
        "borderImageWidth",
        "columnCount",
        "flex",
        "flexGrow",
        "flexOrder",
        "flexPositive",
        "flexShrink",
        "flexNegative",
        "fontWeight",
        "gridRow",
        "gridRowEnd",
        "gridRowGap",
        "gridRowStart",
        "gridColumn",
        "gridColumnEnd",
        "gridColumnGap",
        "gridColumnStart",
        "lineClamp",
        "opacity",
        "order",
        "orphans",
        "tabSize",
        "widows",
        "zIndex",
        "zoom",
        "scale",
        "scaleX",
        "scaleY",
        "scaleZ",
        "shadowOpacity",
    ]
    .into_iter()
    .collect()
});

static COLOR_PROPS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "backgroundColor",
        "borderColor",
        "borderTopColor",
        "borderRightColor",
        "borderBottomColor",
        "borderLeftColor",
        "color",
        "shadowColor",
        "textDecorationColor",
        "textShadowColor",
    ]
    .into_iter()
    .collect()
});

/// Returns the normalization class of `property`.
///
/// Unknown properties are [`PropertyKind::Generic`].
pub fn property_kind(property: &str) -> PropertyKind {
    if UNITLESS_NUMBERS.contains(property) {
        PropertyKind::UnitlessNumeric
    } else if COLOR_PROPS.contains(property) {
        PropertyKind::Color
    } else {
        PropertyKind::Generic
    }
}

/// Converts a camelCase style key to its CSS property name.
///
/// Vendor prefixes written as `Webkit`, `Moz` or `ms` become `-webkit-`,
/// `-moz-` and `-ms-`. Custom properties (`--x`) and names that are already
/// kebab-case pass through.
///
/// ```rust
/// use tincture::css_property_name;
///
/// assert_eq!(css_property_name("backgroundColor"), "background-color");
/// assert_eq!(css_property_name("WebkitLineClamp"), "-webkit-line-clamp");
/// assert_eq!(css_property_name("msFlex"), "-ms-flex");
/// ```
pub fn css_property_name(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }

    let mut out = String::with_capacity(property.len() + 4);
    let rest = match property.strip_prefix("ms") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_uppercase()) => {
            out.push_str("-ms");
            rest
        }
        _ => property,
    };

    for c in rest.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Short tag for a property used in generated identifiers: the first letter
/// of each camelCase word (`backgroundColor` -> `bc`).
pub fn property_tag(property: &str) -> String {
    if property.starts_with("--") {
        return "v".to_string();
    }
    let mut chars = property.chars();
    let mut tag: String = chars.next().map(|c| c.to_ascii_lowercase()).into_iter().collect();
    tag.extend(
        chars
            .filter(|c| c.is_ascii_uppercase())
            .map(|c| c.to_ascii_lowercase()),
    );
    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return "x".to_string();
    }
    tag
}
