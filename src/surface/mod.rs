//! # Drawing Surfaces
//!
//! The renderer draws through the [`Surface`] trait and never touches PDF
//! objects directly.
//!
//! | Surface | Output |
//! |---------|--------|
//! | [`PdfSurface`] | PDF bytes (lopdf) |
//! | [`RecordingSurface`] | Ordered [`DrawCall`] log, JSON on finish |
//!
//! ## Coordinates
//!
//! Pages are opened in PDF points. Every draw call takes device pixels at
//! the render DPI, origin at the top-left of the page, y growing down.
//! Mapping pixels to points (and flipping y) is the surface's job.

mod pdf;
mod record;

pub use pdf::PdfSurface;
pub use record::{DrawCall, RecordingSurface};

use serde::Serialize;

use crate::error::EtiquetaError;
use crate::style::{Font, Rgba};

/// A point in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointPx {
    pub x: f64,
    pub y: f64,
}

impl PointPx {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RectPx {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectPx {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> PointPx {
        PointPx::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Outline paint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Rgba,
    pub width_px: f64,
}

impl Stroke {
    /// `None` when the stroke would paint nothing.
    pub fn visible(color: Rgba, width_px: f64) -> Option<Self> {
        (width_px > 0.0 && !color.is_transparent()).then_some(Self { color, width_px })
    }
}

/// Where text sits inside its layout rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlign {
    /// First line's top-left corner at the rectangle's top-left.
    TopLeft,
    /// Horizontally centered, top edge at the rectangle's top.
    TopCenter,
    /// Centered both ways.
    Center,
}

/// Approximate advance width of `text`, for alignment only.
///
/// Surfaces without font metrics use an average glyph width of 0.55 em.
pub fn estimate_text_width(text: &str, size_px: f64) -> f64 {
    text.chars().count() as f64 * size_px * 0.55
}

/// A page-oriented drawing target.
pub trait Surface {
    /// Start a new page. Later draw calls land on it.
    fn new_page(&mut self, width_pt: f64, height_pt: f64) -> Result<(), EtiquetaError>;

    fn draw_text(
        &mut self,
        text: &str,
        font: &Font,
        color: Rgba,
        rect: RectPx,
        align: TextAlign,
    ) -> Result<(), EtiquetaError>;

    fn draw_line(&mut self, from: PointPx, to: PointPx, stroke: Stroke)
    -> Result<(), EtiquetaError>;

    /// Rectangle with optional rounded corners (`corner_radius_px` > 0).
    fn draw_rect(
        &mut self,
        rect: RectPx,
        corner_radius_px: f64,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    ) -> Result<(), EtiquetaError>;

    /// Ellipse inscribed in `rect`.
    fn draw_ellipse(
        &mut self,
        rect: RectPx,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    ) -> Result<(), EtiquetaError>;

    /// Closed polygon, non-zero winding fill.
    fn draw_polygon(
        &mut self,
        points: &[PointPx],
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    ) -> Result<(), EtiquetaError>;

    /// Draw `image` stretched to `rect`.
    fn draw_image(&mut self, rect: RectPx, image: &image::DynamicImage)
    -> Result<(), EtiquetaError>;

    /// Finalize and return the output bytes.
    fn finish(&mut self) -> Result<Vec<u8>, EtiquetaError>;
}
