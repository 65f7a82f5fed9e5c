//! # Element Renderer
//!
//! Draws one template onto a [`Surface`] at a tile placement.
//!
//! Every element kind has one drawing function; all of them share a
//! [`Frame`] holding the field map, scale and placement of the current
//! label copy. Single and batch rendering differ only in that frame.
//!
//! | Kind | Drawn as |
//! |------|----------|
//! | text | bound text, top-left anchored |
//! | line | stroked segment, rotated about its start |
//! | rectangle | stroke + optional fill, optional rounded corners |
//! | circle / ellipse | inscribed ellipse (circle uses the short side) |
//! | triangle | apex at top-center |
//! | image | data URI fitted and centered |
//! | barcode | encoder raster plus caption below |
//! | group | barcode whose value comes from its text child |
//!
//! Asset problems never abort the label: a visible placeholder is drawn and
//! a [`RenderIssue`] is returned instead.

mod barcode;
mod picture;
mod shapes;
mod text;

use crate::barcode::BarcodeEncoder;
use crate::binding::FieldMap;
use crate::error::{EtiquetaError, RenderIssue};
use crate::layout::{RenderContext, TilePlacement};
use crate::style::{Font, FontStyle, Rgba, STYLE_DEFAULTS};
use crate::surface::{RectPx, Stroke, Surface, TextAlign};
use crate::template::{Element, ElementKind, Template};
use crate::units;

/// Everything shared by the elements of one label copy.
pub struct Frame<'a> {
    pub template: &'a Template,
    pub fields: &'a FieldMap,
    pub ctx: RenderContext,
    pub placement: TilePlacement,
}

impl Frame<'_> {
    /// Destination rectangle of an element in page pixels.
    pub fn dest_rect(&self, element: &Element) -> RectPx {
        let dpi = self.ctx.dpi;
        RectPx::new(
            self.placement.offset_x_px + units::mm_to_px(element.x_mm, dpi) * self.ctx.scale_x,
            self.placement.offset_y_px + units::mm_to_px(element.y_mm, dpi) * self.ctx.scale_y,
            units::mm_to_px(element.width_mm, dpi) * self.ctx.scale_x,
            units::mm_to_px(element.height_mm, dpi) * self.ctx.scale_y,
        )
    }

    /// A point size converted to pixels, scaled with the label height.
    pub fn pt_to_px(&self, pt: f64) -> f64 {
        units::pt_to_px(pt, self.ctx.dpi) * self.ctx.scale_y
    }
}

/// Draw every element of the frame's template in ascending z-index.
pub fn render_label(
    surface: &mut dyn Surface,
    encoder: &dyn BarcodeEncoder,
    frame: &Frame,
) -> Result<Vec<RenderIssue>, EtiquetaError> {
    let mut issues = Vec::new();
    for (index, element) in frame.template.draw_order() {
        if let Some(issue) = render_element(surface, encoder, frame, index, element)? {
            log::warn!("{}", issue);
            issues.push(issue);
        }
    }
    Ok(issues)
}

/// Draw one element.
///
/// `Err` only for surface failures; element problems come back as
/// `Ok(Some(issue))`.
pub fn render_element(
    surface: &mut dyn Surface,
    encoder: &dyn BarcodeEncoder,
    frame: &Frame,
    index: usize,
    element: &Element,
) -> Result<Option<RenderIssue>, EtiquetaError> {
    let rect = frame.dest_rect(element);
    let failure = |message: String| {
        Some(RenderIssue::AssetFailure {
            element: index,
            message,
        })
    };

    match &element.kind {
        ElementKind::Text => text::draw(surface, frame, element, rect).map(|_| None),
        ElementKind::Line => shapes::draw_line(surface, frame, element, rect).map(|_| None),
        ElementKind::Rectangle => shapes::draw_rect(surface, frame, element, rect).map(|_| None),
        ElementKind::Circle => {
            let side = rect.width.min(rect.height);
            let circle = RectPx::new(rect.x, rect.y, side, side);
            shapes::draw_ellipse(surface, frame, element, circle).map(|_| None)
        }
        ElementKind::Ellipse => shapes::draw_ellipse(surface, frame, element, rect).map(|_| None),
        ElementKind::Triangle => {
            shapes::draw_triangle(surface, frame, element, rect).map(|_| None)
        }
        ElementKind::Image => Ok(picture::draw(surface, frame, element, rect)?.and_then(failure)),
        ElementKind::Barcode => {
            Ok(barcode::draw(surface, encoder, frame, element, rect)?.and_then(failure))
        }
        ElementKind::Group => {
            Ok(barcode::draw_group(surface, encoder, frame, element, rect)?.and_then(failure))
        }
        ElementKind::Unknown(name) => Ok(Some(RenderIssue::ElementRenderWarning {
            element: index,
            message: format!("unknown element type '{}'", name),
        })),
    }
}

/// A style string, treating blank values as absent.
fn style_str(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Outlined rectangle with a centered diagnostic caption.
fn draw_placeholder(
    surface: &mut dyn Surface,
    frame: &Frame,
    rect: RectPx,
    color: Rgba,
    message: &str,
) -> Result<(), EtiquetaError> {
    let stroke = Stroke::visible(color, frame.pt_to_px(1.0));
    surface.draw_rect(rect, 0.0, stroke, None)?;
    let font = Font::new(
        STYLE_DEFAULTS.placeholder_font_family,
        frame.pt_to_px(STYLE_DEFAULTS.placeholder_caption_pt),
        FontStyle::REGULAR,
    );
    surface.draw_text(message, &font, color, rect, TextAlign::Center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::SymbolEncoder;
    use crate::surface::{DrawCall, RecordingSurface};

    fn frame<'a>(template: &'a Template, fields: &'a FieldMap) -> Frame<'a> {
        Frame {
            template,
            fields,
            ctx: RenderContext::single(template),
            placement: TilePlacement::ORIGIN,
        }
    }

    #[test]
    fn test_dest_rect_scales_and_offsets() {
        let template = Template {
            dpi: 254,
            ..Default::default()
        };
        let fields = FieldMap::new();
        let f = Frame {
            template: &template,
            fields: &fields,
            ctx: RenderContext {
                dpi: 254,
                scale_x: 0.5,
                scale_y: 2.0,
            },
            placement: TilePlacement {
                page_index: 0,
                offset_x_px: 100.0,
                offset_y_px: 10.0,
            },
        };
        // 254 dpi: 10 px per mm
        let el = Element::new(ElementKind::Rectangle).at(1.0, 2.0, 3.0, 4.0);
        let r = f.dest_rect(&el);
        assert!((r.x - 105.0).abs() < 1e-9);
        assert!((r.y - 50.0).abs() < 1e-9);
        assert!((r.width - 15.0).abs() < 1e-9);
        assert!((r.height - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_kind_draws_nothing() {
        let template = Template {
            elements: vec![Element::new(ElementKind::Unknown("sparkle".into()))],
            ..Default::default()
        };
        let fields = FieldMap::new();
        let mut surface = RecordingSurface::new();
        let issues = render_label(&mut surface, &SymbolEncoder, &frame(&template, &fields)).unwrap();

        assert!(surface.calls().is_empty());
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            issues[0],
            RenderIssue::ElementRenderWarning { element: 0, .. }
        ));
    }

    #[test]
    fn test_z_order() {
        let template = Template {
            elements: vec![
                Element::new(ElementKind::Text).content("top").z(5),
                Element::new(ElementKind::Text).content("bottom").z(0),
                Element::new(ElementKind::Text).content("middle").z(3),
            ],
            ..Default::default()
        };
        let fields = FieldMap::new();
        let mut surface = RecordingSurface::new();
        render_label(&mut surface, &SymbolEncoder, &frame(&template, &fields)).unwrap();
        assert_eq!(surface.texts(), vec!["bottom", "middle", "top"]);
    }

    #[test]
    fn test_circle_uses_short_side() {
        let mut circle = Element::new(ElementKind::Circle).at(0.0, 0.0, 20.0, 10.0);
        circle.style.background_color = Some("red".into());
        let template = Template {
            dpi: 254,
            elements: vec![circle],
            ..Default::default()
        };
        let fields = FieldMap::new();
        let mut surface = RecordingSurface::new();
        render_label(&mut surface, &SymbolEncoder, &frame(&template, &fields)).unwrap();
        match &surface.calls()[0] {
            DrawCall::Ellipse { rect, fill, .. } => {
                assert!((rect.width - 100.0).abs() < 1e-9);
                assert!((rect.height - 100.0).abs() < 1e-9);
                assert_eq!(*fill, Some(Rgba::RED));
            }
            other => panic!("expected ellipse, got {:?}", other),
        }
    }
}
