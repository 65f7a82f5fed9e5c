//! # Style Resolution
//!
//! Colors, fonts and the defaults every element falls back to.
//!
//! All fallbacks live in one immutable table, [`STYLE_DEFAULTS`], so the
//! renderer never invents a value at a call site.

mod color;
mod font;

pub use color::{Rgba, resolve_color};
pub use font::{Font, FontStyle};

/// Fallback values for element styling.
#[derive(Debug, Clone, Copy)]
pub struct StyleDefaults {
    pub font_family: &'static str,
    /// Text size in device pixels.
    pub font_size_px: f64,
    pub text_color: &'static str,
    pub stroke_color: &'static str,
    /// Stroke width in device pixels.
    pub stroke_width_px: f64,
    pub fill_color: &'static str,
    pub barcode_type: &'static str,
    /// Value encoded when a barcode element has no content.
    pub barcode_value: &'static str,
    /// Value encoded when a legacy group has no usable label.
    pub group_barcode_value: &'static str,
    /// Human-readable caption under linear barcodes, in points.
    pub barcode_caption_pt: f64,
    /// Gap between a barcode and its caption, in points.
    pub barcode_caption_gap_pt: f64,
    /// Diagnostic text inside placeholders, in points.
    pub placeholder_caption_pt: f64,
    pub placeholder_font_family: &'static str,
}

/// The single source of style fallbacks.
pub const STYLE_DEFAULTS: StyleDefaults = StyleDefaults {
    font_family: "Arial",
    font_size_px: 12.0,
    text_color: "#000000",
    stroke_color: "#000000",
    stroke_width_px: 1.0,
    fill_color: "transparent",
    barcode_type: "code128",
    barcode_value: "123456",
    group_barcode_value: "123456789012",
    barcode_caption_pt: 8.0,
    barcode_caption_gap_pt: 2.0,
    placeholder_caption_pt: 8.0,
    placeholder_font_family: "Arial",
};
