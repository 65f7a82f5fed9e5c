//! Color expression parsing.
//!
//! Accepts the forms the label designer emits: a handful of named colors,
//! `rgb(r, g, b)` / `rgba(r, g, b, a)`, and hex `#RRGGBB` / `#AARRGGBB`.
//! Anything unrecognized resolves to opaque black; nothing here can fail.

use serde::Serialize;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const RED: Self = Self::opaque(255, 0, 0);
    pub const GREEN: Self = Self::opaque(0, 128, 0);
    pub const BLUE: Self = Self::opaque(0, 0, 255);
    pub const YELLOW: Self = Self::opaque(255, 255, 0);
    pub const GRAY: Self = Self::opaque(128, 128, 128);
    pub const TRANSPARENT: Self = Self {
        r: 255,
        g: 255,
        b: 255,
        a: 0,
    };

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent colors paint nothing.
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Components as 0.0–1.0 floats, the way PDF color operators take them.
    pub fn unit_rgb(&self) -> [f64; 3] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        ]
    }
}

const NAMED: &[(&str, Rgba)] = &[
    ("white", Rgba::WHITE),
    ("black", Rgba::BLACK),
    ("red", Rgba::RED),
    ("blue", Rgba::BLUE),
    ("green", Rgba::GREEN),
    ("yellow", Rgba::YELLOW),
    ("transparent", Rgba::TRANSPARENT),
];

/// Resolve a color expression. `None` and empty strings are transparent.
///
/// ```
/// use etiqueta::style::{resolve_color, Rgba};
///
/// assert_eq!(resolve_color(Some("#FF0000")), Rgba::RED);
/// assert_eq!(resolve_color(Some("rgb(255, 0, 0)")), Rgba::RED);
/// assert_eq!(resolve_color(Some("Red")), Rgba::RED);
/// assert!(resolve_color(None).is_transparent());
/// ```
pub fn resolve_color(expr: Option<&str>) -> Rgba {
    let expr = match expr.map(str::trim) {
        Some(e) if !e.is_empty() => e,
        _ => return Rgba::TRANSPARENT,
    };

    if let Some((_, color)) = NAMED.iter().find(|(name, _)| name.eq_ignore_ascii_case(expr)) {
        return *color;
    }

    if expr.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("rgb")) {
        return parse_rgb_function(expr).unwrap_or(Rgba::BLACK);
    }

    parse_hex(expr).unwrap_or(Rgba::BLACK)
}

/// Parse `rgb(r,g,b)` or `rgba(r,g,b,a)` where `a` is 0.0–1.0.
fn parse_rgb_function(expr: &str) -> Option<Rgba> {
    let open = expr.find('(')?;
    let inner = expr[open + 1..].trim_end().strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();

    let channel = |s: &str| s.parse::<u8>().ok();
    match parts.as_slice() {
        [r, g, b] => Some(Rgba::opaque(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha: f64 = a.parse().ok()?;
            if !alpha.is_finite() || alpha < 0.0 {
                return None;
            }
            let a = if alpha <= 1.0 {
                (alpha * 255.0).round() as u8
            } else {
                alpha.min(255.0).round() as u8
            };
            Some(Rgba {
                r: channel(r)?,
                g: channel(g)?,
                b: channel(b)?,
                a,
            })
        }
        _ => None,
    }
}

/// Parse `RRGGBB` or `AARRGGBB`, with or without a leading `#`.
fn parse_hex(expr: &str) -> Option<Rgba> {
    let hex = expr.trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba {
            a: byte(0)?,
            r: byte(2)?,
            g: byte(4)?,
            b: byte(6)?,
        }),
        _ => None,
    }
}
