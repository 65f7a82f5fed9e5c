//! # Sheet Configuration
//!
//! Page and tile geometry for batch mode.
//!
//! ## Presets
//!
//! | Name | Page | Tile | Margin |
//! |------|------|------|--------|
//! | `a4` | 210 × 297 mm | 150 × 100 px | 10 px |
//! | `letter` | 215.9 × 279.4 mm | 150 × 100 px | 10 px |
//!
//! Tile and margin sizes are device pixels at the template DPI, so the
//! same sheet holds more tiles when the template DPI is higher.
//!
//! ## TOML overrides
//!
//! ```toml
//! sheet = "letter"     # optional base preset
//! tile_width_px = 300
//! tile_height_px = 200
//! margin_px = 20
//! ```
//!
//! ```
//! use etiqueta::config::SheetConfig;
//!
//! let sheet = SheetConfig::parse("100x150mm").unwrap();
//! assert_eq!(sheet.page_width_mm, 100.0);
//! assert_eq!(sheet.tile_width_px, 150.0);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::EtiquetaError;
use crate::units;

/// A named paper size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub name: &'static str,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    pub const A4: Self = Self {
        name: "a4",
        width_mm: 210.0,
        height_mm: 297.0,
    };

    pub const LETTER: Self = Self {
        name: "letter",
        width_mm: 215.9,
        height_mm: 279.4,
    };

    pub fn built_in() -> [Self; 2] {
        [Self::A4, Self::LETTER]
    }
}

/// Batch sheet geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub tile_width_px: f64,
    pub tile_height_px: f64,
    pub margin_px: f64,
}

impl SheetConfig {
    pub const DEFAULT_TILE_WIDTH_PX: f64 = 150.0;
    pub const DEFAULT_TILE_HEIGHT_PX: f64 = 100.0;
    pub const DEFAULT_MARGIN_PX: f64 = 10.0;

    /// A sheet of `page` with the default tile grid.
    pub fn for_page(page: PageSize) -> Self {
        Self::with_page_mm(page.width_mm, page.height_mm)
    }

    fn with_page_mm(width_mm: f64, height_mm: f64) -> Self {
        Self {
            page_width_mm: width_mm,
            page_height_mm: height_mm,
            tile_width_px: Self::DEFAULT_TILE_WIDTH_PX,
            tile_height_px: Self::DEFAULT_TILE_HEIGHT_PX,
            margin_px: Self::DEFAULT_MARGIN_PX,
        }
    }

    /// Parse a sheet name from the command line.
    ///
    /// Formats:
    /// - `"a4"`, `"letter"` → built-in page sizes
    /// - `"WxHmm"` or `"WxH"` → custom page in millimeters (e.g. `"100x150mm"`)
    pub fn parse(s: &str) -> Result<Self, EtiquetaError> {
        let lower = s.trim().to_lowercase();
        if let Some(page) = PageSize::built_in().into_iter().find(|p| p.name == lower) {
            return Ok(Self::for_page(page));
        }

        let dims = lower.strip_suffix("mm").unwrap_or(&lower);
        let Some((w, h)) = dims.split_once('x') else {
            return Err(EtiquetaError::Config(format!(
                "Unknown sheet '{}'. Use 'a4', 'letter' or 'WIDTHxHEIGHTmm'",
                s
            )));
        };
        let dim = |v: &str| -> Result<f64, EtiquetaError> {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite() && *n > 0.0)
                .ok_or_else(|| EtiquetaError::Config(format!("Invalid sheet dimension: {}", v)))
        };
        Ok(Self::with_page_mm(dim(w)?, dim(h)?))
    }

    /// Load a TOML override file on top of `base`.
    pub fn load(path: &Path, base: Self) -> Result<Self, EtiquetaError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text, base)
    }

    /// Apply TOML overrides on top of `base`. A `sheet` key replaces the
    /// base with that preset before the other keys apply.
    pub fn from_toml(text: &str, base: Self) -> Result<Self, EtiquetaError> {
        let file: SheetFile =
            toml::from_str(text).map_err(|e| EtiquetaError::Config(e.to_string()))?;

        let mut sheet = match file.sheet.as_deref() {
            Some(name) => Self::parse(name)?,
            None => base,
        };
        let set = |slot: &mut f64, value: Option<f64>, key: &str| -> Result<(), EtiquetaError> {
            match value {
                Some(v) if !(v.is_finite() && v > 0.0) => Err(EtiquetaError::Config(format!(
                    "{} must be positive, got {}",
                    key, v
                ))),
                Some(v) => {
                    *slot = v;
                    Ok(())
                }
                None => Ok(()),
            }
        };
        set(&mut sheet.page_width_mm, file.page_width_mm, "page_width_mm")?;
        set(&mut sheet.page_height_mm, file.page_height_mm, "page_height_mm")?;
        set(&mut sheet.tile_width_px, file.tile_width_px, "tile_width_px")?;
        set(&mut sheet.tile_height_px, file.tile_height_px, "tile_height_px")?;
        if let Some(margin) = file.margin_px {
            if !(margin.is_finite() && margin >= 0.0) {
                return Err(EtiquetaError::Config(format!(
                    "margin_px must not be negative, got {}",
                    margin
                )));
            }
            sheet.margin_px = margin;
        }
        Ok(sheet)
    }

    /// Page width in device pixels at `dpi`.
    pub fn page_width_px(&self, dpi: u32) -> f64 {
        units::mm_to_px(self.page_width_mm, dpi)
    }

    /// Page height in device pixels at `dpi`.
    pub fn page_height_px(&self, dpi: u32) -> f64 {
        units::mm_to_px(self.page_height_mm, dpi)
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self::for_page(PageSize::A4)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SheetFile {
    sheet: Option<String>,
    page_width_mm: Option<f64>,
    page_height_mm: Option<f64>,
    tile_width_px: Option<f64>,
    tile_height_px: Option<f64>,
    margin_px: Option<f64>,
}

// ============================================================================
// TESTS
// ============================================================================
