//! Recording surface: keeps every draw call for inspection.
//!
//! Useful for tests and for debugging a template without opening a PDF
//! viewer. `finish` serializes the log as JSON.

use serde::Serialize;

use super::{PointPx, RectPx, Stroke, Surface, TextAlign};
use crate::error::EtiquetaError;
use crate::style::{Font, Rgba};

/// One recorded surface operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCall {
    NewPage {
        width_pt: f64,
        height_pt: f64,
    },
    Text {
        text: String,
        font: Font,
        color: Rgba,
        rect: RectPx,
        align: TextAlign,
    },
    Line {
        from: PointPx,
        to: PointPx,
        stroke: Stroke,
    },
    Rect {
        rect: RectPx,
        corner_radius_px: f64,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    },
    Ellipse {
        rect: RectPx,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    },
    Polygon {
        points: Vec<PointPx>,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    },
    /// Pixel content is not kept, only its size.
    Image {
        rect: RectPx,
        width: u32,
        height: u32,
    },
}

/// A [`Surface`] that records calls instead of rendering.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn page_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::NewPage { .. }))
            .count()
    }

    /// Text of every text call, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn new_page(&mut self, width_pt: f64, height_pt: f64) -> Result<(), EtiquetaError> {
        self.calls.push(DrawCall::NewPage {
            width_pt,
            height_pt,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        font: &Font,
        color: Rgba,
        rect: RectPx,
        align: TextAlign,
    ) -> Result<(), EtiquetaError> {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            font: font.clone(),
            color,
            rect,
            align,
        });
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: PointPx,
        to: PointPx,
        stroke: Stroke,
    ) -> Result<(), EtiquetaError> {
        self.calls.push(DrawCall::Line { from, to, stroke });
        Ok(())
    }

    fn draw_rect(
        &mut self,
        rect: RectPx,
        corner_radius_px: f64,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    ) -> Result<(), EtiquetaError> {
        self.calls.push(DrawCall::Rect {
            rect,
            corner_radius_px,
            stroke,
            fill,
        });
        Ok(())
    }

    fn draw_ellipse(
        &mut self,
        rect: RectPx,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    ) -> Result<(), EtiquetaError> {
        self.calls.push(DrawCall::Ellipse { rect, stroke, fill });
        Ok(())
    }

    fn draw_polygon(
        &mut self,
        points: &[PointPx],
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    ) -> Result<(), EtiquetaError> {
        self.calls.push(DrawCall::Polygon {
            points: points.to_vec(),
            stroke,
            fill,
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        rect: RectPx,
        image: &image::DynamicImage,
    ) -> Result<(), EtiquetaError> {
        self.calls.push(DrawCall::Image {
            rect,
            width: image.width(),
            height: image.height(),
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, EtiquetaError> {
        serde_json::to_vec_pretty(&self.calls).map_err(|e| EtiquetaError::Io(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::FontStyle;

    #[test]
    fn test_records_in_order() {
        let mut s = RecordingSurface::new();
        s.new_page(100.0, 50.0).unwrap();
        s.draw_text(
            "hi",
            &Font::new("Arial", 12.0, FontStyle::REGULAR),
            Rgba::BLACK,
            RectPx::new(0.0, 0.0, 10.0, 10.0),
            TextAlign::TopLeft,
        )
        .unwrap();
        s.draw_ellipse(RectPx::new(0.0, 0.0, 5.0, 5.0), None, Some(Rgba::RED))
            .unwrap();

        assert_eq!(s.page_count(), 1);
        assert_eq!(s.texts(), vec!["hi"]);
        assert!(matches!(s.calls()[2], DrawCall::Ellipse { .. }));
    }

    #[test]
    fn test_finish_emits_json() {
        let mut s = RecordingSurface::new();
        s.new_page(10.0, 10.0).unwrap();
        let bytes = s.finish().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json[0]["op"], "new_page");
        assert_eq!(json[0]["width_pt"], 10.0);
    }
}
