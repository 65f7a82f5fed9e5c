//! Font selection: family, size and the bold/italic bitmask.

use serde::Serialize;
use std::ops::{BitOr, BitOrAssign};

/// Font style flags. Bold and italic are independent and combinable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct FontStyle(u8);

impl FontStyle {
    pub const REGULAR: Self = Self(0);
    pub const BOLD: Self = Self(1);
    pub const ITALIC: Self = Self(1 << 1);

    /// Build from CSS-like `fontWeight` / `fontStyle` strings.
    ///
    /// Only the exact keywords `bold` and `italic` (any case) set a flag;
    /// numeric weights such as `"400"` stay regular.
    pub fn from_css(weight: Option<&str>, style: Option<&str>) -> Self {
        let mut flags = Self::REGULAR;
        if weight.is_some_and(|w| w.trim().eq_ignore_ascii_case("bold")) {
            flags |= Self::BOLD;
        }
        if style.is_some_and(|s| s.trim().eq_ignore_ascii_case("italic")) {
            flags |= Self::ITALIC;
        }
        flags
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_bold(self) -> bool {
        self.contains(Self::BOLD)
    }

    pub fn is_italic(self) -> bool {
        self.contains(Self::ITALIC)
    }
}

impl BitOr for FontStyle {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FontStyle {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A resolved font request handed to the drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub family: String,
    /// Size in device pixels at the render DPI.
    pub size_px: f64,
    pub style: FontStyle,
}

impl Font {
    pub fn new(family: impl Into<String>, size_px: f64, style: FontStyle) -> Self {
        Self {
            family: family.into(),
            size_px,
            style,
        }
    }
}
