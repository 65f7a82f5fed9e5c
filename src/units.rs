//! # Unit Conversion
//!
//! Label geometry is authored in millimeters, drawn in device pixels at the
//! template DPI, and paginated in PDF points.
//!
//! ```text
//! px = mm * dpi / 25.4
//! pt = mm * 72  / 25.4
//! ```
//!
//! No rounding happens here; the drawing surface decides how to quantize.
//!
//! ## Example
//!
//! ```
//! use etiqueta::units;
//!
//! // 25.4mm is one inch: 300 pixels at 300 DPI, 72 points.
//! assert!((units::mm_to_px(25.4, 300) - 300.0).abs() < 1e-9);
//! assert!((units::mm_to_pt(25.4) - 72.0).abs() < 1e-9);
//! ```

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// PDF points per inch.
pub const PT_PER_INCH: f64 = 72.0;

/// Clamp a DPI value so conversions never divide by zero.
#[inline]
pub fn clamp_dpi(dpi: u32) -> f64 {
    dpi.max(1) as f64
}

/// Convert millimeters to pixels at `dpi`.
#[inline]
pub fn mm_to_px(mm: f64, dpi: u32) -> f64 {
    mm * clamp_dpi(dpi) / MM_PER_INCH
}

/// Convert pixels at `dpi` to millimeters.
#[inline]
pub fn px_to_mm(px: f64, dpi: u32) -> f64 {
    px * MM_PER_INCH / clamp_dpi(dpi)
}

/// Convert millimeters to points.
#[inline]
pub fn mm_to_pt(mm: f64) -> f64 {
    mm * PT_PER_INCH / MM_PER_INCH
}

/// Convert points to millimeters.
#[inline]
pub fn pt_to_mm(pt: f64) -> f64 {
    pt * MM_PER_INCH / PT_PER_INCH
}

/// Convert pixels at `dpi` to points.
#[inline]
pub fn px_to_pt(px: f64, dpi: u32) -> f64 {
    px * PT_PER_INCH / clamp_dpi(dpi)
}

/// Convert points to pixels at `dpi`.
#[inline]
pub fn pt_to_px(pt: f64, dpi: u32) -> f64 {
    pt * clamp_dpi(dpi) / PT_PER_INCH
}
