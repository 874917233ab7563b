//! Color canonicalization.
//!
//! Colors are tokenized with `cssparser` and rewritten to a single
//! `rgba(r,g,b,a)` form so that equal colors written differently compile to
//! the same atomic rule. Theme tokens pass through, and anything that does
//! not parse is returned unchanged.

use std::collections::HashMap;
use std::fmt;

use cssparser::{ParseError, Parser, ParserInput, Token};
use once_cell::sync::Lazy;

use super::style_value::format_number;

/// A parsed color with 8-bit channels and a unit alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgba {
    r: u8,
    g: u8,
    b: u8,
    a: f64,
}

impl Rgba {
    fn from_hex(rgb: u32, alpha: u8) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: f64::from(alpha) / 255.0,
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alpha = (self.a * 1000.0).round() / 1000.0;
        write!(
            f,
            "rgba({},{},{},{})",
            self.r,
            self.g,
            self.b,
            format_number(alpha)
        )
    }
}

/// Normalizes a CSS color to `rgba(r,g,b,a)`.
///
/// Accepts hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), `rgb()`/`rgba()`,
/// `hsl()`/`hsla()` in comma or space syntax, and named colors. Tokens
/// (`$brand`, `var(--brand)`) and unparsable input come back unchanged.
///
/// ```rust
/// use tincture::normalize_color;
///
/// assert_eq!(normalize_color("red"), "rgba(255,0,0,1)");
/// assert_eq!(normalize_color("#00ff0080"), "rgba(0,255,0,0.502)");
/// assert_eq!(normalize_color("$brand"), "$brand");
/// ```
pub fn normalize_color(color: &str) -> String {
    let trimmed = color.trim();
    if trimmed.starts_with('$') || trimmed.starts_with("var(") {
        return color.to_string();
    }
    match parse_color(trimmed) {
        Some(rgba) => rgba.to_string(),
        None => color.to_string(),
    }
}

fn parse_color(input: &str) -> Option<Rgba> {
    let mut parser_input = ParserInput::new(input);
    let mut parser = Parser::new(&mut parser_input);

    let token = parser.next().ok()?.clone();
    let rgba = match token {
        Token::Hash(ref value) | Token::IDHash(ref value) => parse_hex(value)?,
        Token::Ident(ref name) => named_color(name)?,
        Token::Function(ref name) => {
            let name = name.to_ascii_lowercase();
            let args = parser.parse_nested_block(parse_components).ok()?;
            match name.as_str() {
                "rgb" | "rgba" => rgb_from_args(&args)?,
                "hsl" | "hsla" => hsl_from_args(&args)?,
                _ => return None,
            }
        }
        _ => return None,
    };

    parser.expect_exhausted().ok()?;
    Some(rgba)
}

fn parse_hex(value: &str) -> Option<Rgba> {
    if !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digits = u32::from_str_radix(value, 16).ok()?;
    let expand = |nibble: u32| nibble * 0x11;

    match value.len() {
        3 => Some(Rgba::from_hex(
            (expand((digits >> 8) & 0xf) << 16)
                | (expand((digits >> 4) & 0xf) << 8)
                | expand(digits & 0xf),
            0xff,
        )),
        4 => Some(Rgba::from_hex(
            (expand((digits >> 12) & 0xf) << 16)
                | (expand((digits >> 8) & 0xf) << 8)
                | expand((digits >> 4) & 0xf),
            expand(digits & 0xf) as u8,
        )),
        6 => Some(Rgba::from_hex(digits, 0xff)),
        8 => Some(Rgba::from_hex(digits >> 8, (digits & 0xff) as u8)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Component {
    Number(f32),
    Percentage(f32),
    /// Hue in degrees.
    Angle(f32),
    Slash,
}

fn parse_components<'i, 'tt>(
    input: &mut Parser<'i, 'tt>,
) -> Result<Vec<Component>, ParseError<'i, ()>> {
    let mut components = Vec::with_capacity(4);
    while !input.is_exhausted() {
        let token = input.next()?.clone();
        match token {
            Token::Number { value, .. } => components.push(Component::Number(value)),
            Token::Percentage { unit_value, .. } => {
                components.push(Component::Percentage(unit_value))
            }
            Token::Dimension {
                value, ref unit, ..
            } => {
                let degrees = match unit.to_ascii_lowercase().as_str() {
                    "deg" => value,
                    "rad" => value.to_degrees(),
                    "grad" => value * 0.9,
                    "turn" => value * 360.0,
                    _ => return Err(input.new_custom_error(())),
                };
                components.push(Component::Angle(degrees));
            }
            Token::Comma => {}
            Token::Delim('/') => components.push(Component::Slash),
            _ => return Err(input.new_custom_error(())),
        }
    }
    Ok(components)
}

/// Splits function arguments into three channels and an optional alpha.
fn split_alpha(args: &[Component]) -> Option<([Component; 3], Option<Component>)> {
    let (channels, alpha) = match args.iter().position(|c| *c == Component::Slash) {
        Some(pos) if args.len() == pos + 2 => (&args[..pos], Some(args[pos + 1])),
        Some(_) => return None,
        None if args.len() == 4 => (&args[..3], Some(args[3])),
        None => (args, None),
    };
    match channels {
        [a, b, c] => Some(([*a, *b, *c], alpha)),
        _ => None,
    }
}

fn alpha_value(alpha: Option<Component>) -> Option<f64> {
    match alpha {
        None => Some(1.0),
        Some(Component::Number(v)) | Some(Component::Percentage(v)) => {
            Some(f64::from(v).clamp(0.0, 1.0))
        }
        Some(_) => None,
    }
}

fn rgb_channel(component: Component) -> Option<u8> {
    let value = match component {
        Component::Number(v) => f64::from(v),
        Component::Percentage(v) => f64::from(v) * 255.0,
        _ => return None,
    };
    Some(value.round().clamp(0.0, 255.0) as u8)
}

fn rgb_from_args(args: &[Component]) -> Option<Rgba> {
    let ([r, g, b], alpha) = split_alpha(args)?;
    Some(Rgba {
        r: rgb_channel(r)?,
        g: rgb_channel(g)?,
        b: rgb_channel(b)?,
        a: alpha_value(alpha)?,
    })
}

fn unit_fraction(component: Component) -> Option<f64> {
    match component {
        Component::Percentage(v) => Some(f64::from(v)),
        Component::Number(v) => Some(f64::from(v) / 100.0),
        _ => None,
    }
    .map(|v| v.clamp(0.0, 1.0))
}

fn hsl_from_args(args: &[Component]) -> Option<Rgba> {
    let ([h, s, l], alpha) = split_alpha(args)?;
    let hue = match h {
        Component::Number(v) | Component::Angle(v) => f64::from(v).rem_euclid(360.0) / 360.0,
        _ => return None,
    };
    let saturation = unit_fraction(s)?;
    let lightness = unit_fraction(l)?;

    let q = if lightness < 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;
    let channel = |t: f64| -> u8 {
        let t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Some(Rgba {
        r: channel(hue + 1.0 / 3.0),
        g: channel(hue),
        b: channel(hue - 1.0 / 3.0),
        a: alpha_value(alpha)?,
    })
}

fn named_color(name: &str) -> Option<Rgba> {
    let name = name.to_ascii_lowercase();
    if name == "transparent" {
        return Some(Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0.0,
        });
    }
    NAMED_COLORS
        .get(name.as_str())
        .map(|rgb| Rgba::from_hex(*rgb, 0xff))
}

static NAMED_COLORS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    [
        ("aliceblue", 0xf0f8ff), ("antiquewhite", 0xfaebd7), ("aqua", 0x00ffff),
        ("aquamarine", 0x7fffd4), ("azure", 0xf0ffff), ("beige", 0xf5f5dc),
        ("bisque", 0xffe4c4), ("black", 0x000000), ("blanchedalmond", 0xffebcd),
        ("blue", 0x0000ff), ("blueviolet", 0x8a2be2), ("brown", 0xa52a2a),
        ("burlywood", 0xdeb887), ("cadetblue", 0x5f9ea0), ("chartreuse", 0x7fff00),
        ("chocolate", 0xd2691e), ("coral", 0xff7f50), ("cornflowerblue", 0x6495ed),
        ("cornsilk", 0xfff8dc), ("crimson", 0xdc143c), ("cyan", 0x00ffff),
        ("darkblue", 0x00008b), ("darkcyan", 0x008b8b), ("darkgoldenrod", 0xb8860b),
        ("darkgray", 0xa9a9a9), ("darkgreen", 0x006400), ("darkgrey", 0xa9a9a9),
        ("darkkhaki", 0xbdb76b), ("darkmagenta", 0x8b008b), ("darkolivegreen", 0x556b2f),
        ("darkorange", 0xff8c00), ("darkorchid", 0x9932cc), ("darkred", 0x8b0000),
        ("darksalmon", 0xe9967a), ("darkseagreen", 0x8fbc8f), ("darkslateblue", 0x483d8b),
        ("darkslategray", 0x2f4f4f), ("darkslategrey", 0x2f4f4f), ("darkturquoise", 0x00ced1),
        ("darkviolet", 0x9400d3), ("deeppink", 0xff1493), ("deepskyblue", 0x00bfff),
        ("dimgray", 0x696969), ("dimgrey", 0x696969), ("dodgerblue", 0x1e90ff),
        ("firebrick", 0xb22222), ("floralwhite", 0xfffaf0), ("forestgreen", 0x228b22),
        ("fuchsia", 0xff00ff), ("gainsboro", 0xdcdcdc), ("ghostwhite", 0xf8f8ff),
        ("gold", 0xffd700), ("goldenrod", 0xdaa520), ("gray", 0x808080),
        ("green", 0x008000), ("greenyellow", 0xadff2f), ("grey", 0x808080),
        ("honeydew", 0xf0fff0), ("hotpink", 0xff69b4), ("indianred", 0xcd5c5c),
        ("indigo", 0x4b0082), ("ivory", 0xfffff0), ("khaki", 0xf0e68c),
        ("lavender", 0xe6e6fa), ("lavenderblush", 0xfff0f5), ("lawngreen", 0x7cfc00),
        ("lemonchiffon", 0xfffacd), ("lightblue", 0xadd8e6), ("lightcoral", 0xf08080),
        ("lightcyan", 0xe0ffff), ("lightgoldenrodyellow", 0xfafad2), ("lightgray", 0xd3d3d3),
        ("lightgreen", 0x90ee90), ("lightgrey", 0xd3d3d3), ("lightpink", 0xffb6c1),
        ("lightsalmon", 0xffa07a), ("lightseagreen", 0x20b2aa), ("lightskyblue", 0x87cefa),
        ("lightslategray", 0x778899), ("lightslategrey", 0x778899), ("lightsteelblue", 0xb0c4de),
        ("lightyellow", 0xffffe0), ("lime", 0x00ff00), ("limegreen", 0x32cd32),
        ("linen", 0xfaf0e6), ("magenta", 0xff00ff), ("maroon", 0x800000),
        ("mediumaquamarine", 0x66cdaa), ("mediumblue", 0x0000cd), ("mediumorchid", 0xba55d3),
        ("mediumpurple", 0x9370db), ("mediumseagreen", 0x3cb371), ("mediumslateblue", 0x7b68ee),
        ("mediumspringgreen", 0x00fa9a), ("mediumturquoise", 0x48d1cc), ("mediumvioletred", 0xc71585),
        ("midnightblue", 0x191970), ("mintcream", 0xf5fffa), ("mistyrose", 0xffe4e1),
        ("moccasin", 0xffe4b5), ("navajowhite", 0xffdead), ("navy", 0x000080),
        ("oldlace", 0xfdf5e6), ("olive", 0x808000), ("olivedrab", 0x6b8e23),
        ("orange", 0xffa500), ("orangered", 0xff4500), ("orchid", 0xda70d6),
        ("palegoldenrod", 0xeee8aa), ("palegreen", 0x98fb98), ("paleturquoise", 0xafeeee),
        ("palevioletred", 0xdb7093), ("papayawhip", 0xffefd5), ("peachpuff", 0xffdab9),
        ("peru", 0xcd853f), ("pink", 0xffc0cb), ("plum", 0xdda0dd),
        ("powderblue", 0xb0e0e6), ("purple", 0x800080), ("rebeccapurple", 0x663399),
        ("red", 0xff0000), ("rosybrown", 0xbc8f8f), ("royalblue", 0x4169e1),
        ("saddlebrown", 0x8b4513), ("salmon", 0xfa8072), ("sandybrown", 0xf4a460),
        ("seagreen", 0x2e8b57), ("seashell", 0xfff5ee), ("sienna", 0xa0522d),
        ("silver", 0xc0c0c0), ("skyblue", 0x87ceeb), ("slateblue", 0x6a5acd),
        ("slategray", 0x708090), ("slategrey", 0x708090), ("snow", 0xfffafa),
        ("springgreen", 0x00ff7f), ("steelblue", 0x4682b4), ("tan", 0xd2b48c),
        ("teal", 0x008080), ("thistle", 0xd8bfd8), ("tomato", 0xff6347),
        ("turquoise", 0x40e0d0), ("violet", 0xee82ee), ("wheat", 0xf5deb3),
        ("white", 0xffffff), ("whitesmoke", 0xf5f5f5), ("yellow", 0xffff00),
        ("yellowgreen", 0x9acd32),
    ]
    .into_iter()
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(normalize_color("red"), "rgba(255,0,0,1)");
        assert_eq!(normalize_color("RebeccaPurple"), "rgba(102,51,153,1)");
        assert_eq!(normalize_color("transparent"), "rgba(0,0,0,0)");
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(normalize_color("#f00"), "rgba(255,0,0,1)");
        assert_eq!(normalize_color("#f008"), "rgba(255,0,0,0.533)");
        assert_eq!(normalize_color("#336699"), "rgba(51,102,153,1)");
        assert_eq!(normalize_color("#33669900"), "rgba(51,102,153,0)");
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(normalize_color("rgb(10, 20, 30)"), "rgba(10,20,30,1)");
        assert_eq!(normalize_color("rgba(10,20,30,0.5)"), "rgba(10,20,30,0.5)");
        assert_eq!(normalize_color("rgb(10 20 30 / 50%)"), "rgba(10,20,30,0.5)");
        assert_eq!(normalize_color("rgb(100%, 0%, 0%)"), "rgba(255,0,0,1)");
    }

    #[test]
    fn test_hsl_functions() {
        assert_eq!(normalize_color("hsl(0, 100%, 50%)"), "rgba(255,0,0,1)");
        assert_eq!(normalize_color("hsl(120deg 100% 50%)"), "rgba(0,255,0,1)");
        assert_eq!(normalize_color("hsla(240, 100%, 50%, 0.25)"), "rgba(0,0,255,0.25)");
    }

    #[test]
    fn test_tokens_pass_through() {
        assert_eq!(normalize_color("$brand"), "$brand");
        assert_eq!(normalize_color("var(--brand)"), "var(--brand)");
    }

    #[test]
    fn test_malformed_returns_input() {
        assert_eq!(normalize_color("notacolor"), "notacolor");
        assert_eq!(normalize_color("#12345"), "#12345");
        assert_eq!(normalize_color("rgb(1, 2)"), "rgb(1, 2)");
        assert_eq!(normalize_color("red blue"), "red blue");
        assert_eq!(normalize_color("linear-gradient(red, blue)"), "linear-gradient(red, blue)");
    }

    #[test]
    fn test_normalized_output_is_stable() {
        for input in ["red", "#f008", "hsl(200, 50%, 40%)", "rgb(1 2 3 / 0.3)"] {
            let once = normalize_color(input);
            assert_eq!(normalize_color(&once), once, "input {}", input);
        }
    }
}
