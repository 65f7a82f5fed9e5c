//! Lines and filled shapes.

use super::{Frame, style_str};
use crate::error::EtiquetaError;
use crate::style::{Rgba, STYLE_DEFAULTS, resolve_color};
use crate::surface::{PointPx, RectPx, Stroke, Surface};
use crate::template::{Element, ElementStyle};
use crate::units;

/// Border stroke: `borderColor`/`borderWidth`, then `strokeColor`/`strokeWidth`.
fn outline(style: &ElementStyle, frame: &Frame) -> Option<Stroke> {
    let color = style_str(&style.border_color)
        .or(style_str(&style.stroke_color))
        .unwrap_or(STYLE_DEFAULTS.stroke_color);
    let width = style
        .border_width
        .or(style.stroke_width)
        .unwrap_or(STYLE_DEFAULTS.stroke_width_px);
    Stroke::visible(
        resolve_color(Some(color)),
        width * frame.ctx.uniform_scale(),
    )
}

/// Interior paint; absent or transparent means no fill.
fn fill(style: &ElementStyle) -> Option<Rgba> {
    let color = resolve_color(Some(
        style_str(&style.background_color).unwrap_or(STYLE_DEFAULTS.fill_color),
    ));
    (!color.is_transparent()).then_some(color)
}

/// Segment from the top-left corner along the element width, rotated by
/// `rotation_deg` about its start.
pub(super) fn draw_line(
    surface: &mut dyn Surface,
    frame: &Frame,
    element: &Element,
    rect: RectPx,
) -> Result<(), EtiquetaError> {
    let style = &element.style;
    let color = style_str(&style.stroke_color)
        .or(style_str(&style.border_color))
        .unwrap_or(STYLE_DEFAULTS.stroke_color);
    let width = style
        .stroke_width
        .or(style.border_width)
        .unwrap_or(STYLE_DEFAULTS.stroke_width_px);
    let Some(stroke) = Stroke::visible(resolve_color(Some(color)), width * frame.ctx.uniform_scale())
    else {
        return Ok(());
    };

    let length = units::mm_to_px(element.width_mm, frame.ctx.dpi) * style.scale_x.unwrap_or(1.0);
    let angle = element.rotation_deg.to_radians();
    let from = PointPx::new(rect.x, rect.y);
    let to = PointPx::new(
        rect.x + length * angle.cos() * frame.ctx.scale_x,
        rect.y + length * angle.sin() * frame.ctx.scale_y,
    );
    surface.draw_line(from, to, stroke)
}

pub(super) fn draw_rect(
    surface: &mut dyn Surface,
    frame: &Frame,
    element: &Element,
    rect: RectPx,
) -> Result<(), EtiquetaError> {
    let style = &element.style;
    let radius = style.border_radius.unwrap_or(0.0).max(0.0) * frame.ctx.uniform_scale();
    surface.draw_rect(rect, radius, outline(style, frame), fill(style))
}

pub(super) fn draw_ellipse(
    surface: &mut dyn Surface,
    frame: &Frame,
    element: &Element,
    rect: RectPx,
) -> Result<(), EtiquetaError> {
    let style = &element.style;
    surface.draw_ellipse(rect, outline(style, frame), fill(style))
}

/// Apex at top-center, base along the bottom edge.
pub(super) fn draw_triangle(
    surface: &mut dyn Surface,
    frame: &Frame,
    element: &Element,
    rect: RectPx,
) -> Result<(), EtiquetaError> {
    let style = &element.style;
    let points = [
        PointPx::new(rect.x + rect.width / 2.0, rect.y),
        PointPx::new(rect.x, rect.bottom()),
        PointPx::new(rect.right(), rect.bottom()),
    ];
    surface.draw_polygon(&points, outline(style, frame), fill(style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::FieldMap;
    use crate::layout::{RenderContext, TilePlacement};
    use crate::surface::{DrawCall, RecordingSurface};
    use crate::template::{ElementKind, Template};

    type DrawFn = fn(&mut dyn Surface, &Frame, &Element, RectPx) -> Result<(), EtiquetaError>;

    /// 254 dpi gives 10 px per mm.
    fn draw_one(draw: DrawFn, element: Element) -> Vec<DrawCall> {
        let template = Template {
            dpi: 254,
            ..Default::default()
        };
        let fields = FieldMap::new();
        let frame = Frame {
            template: &template,
            fields: &fields,
            ctx: RenderContext::single(&template),
            placement: TilePlacement::ORIGIN,
        };
        let rect = frame.dest_rect(&element);
        let mut surface = RecordingSurface::new();
        draw(&mut surface, &frame, &element, rect).unwrap();
        surface.calls().to_vec()
    }

    fn close(a: PointPx, b: PointPx) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn test_horizontal_line() {
        let el = Element::new(ElementKind::Line).at(1.0, 2.0, 5.0, 0.0);
        let calls = draw_one(draw_line, el);
        let DrawCall::Line { from, to, stroke } = calls[0] else {
            panic!("expected line");
        };
        assert!(close(from, PointPx::new(10.0, 20.0)));
        assert!(close(to, PointPx::new(60.0, 20.0)));
        assert_eq!(stroke.color, Rgba::BLACK);
        assert_eq!(stroke.width_px, 1.0);
    }

    #[test]
    fn test_rotated_scaled_line() {
        let mut el = Element::new(ElementKind::Line).at(0.0, 0.0, 5.0, 0.0);
        el.rotation_deg = 90.0;
        el.style.scale_x = Some(2.0);
        let calls = draw_one(draw_line, el);
        let DrawCall::Line { to, .. } = calls[0] else {
            panic!("expected line");
        };
        assert!(close(to, PointPx::new(0.0, 100.0)));
    }

    #[test]
    fn test_line_ignores_scale_y_in_designer_json() {
        let el: Element = serde_json::from_value(serde_json::json!({
            "type": "line",
            "width_mm": 5,
            "additionalData": {"scaleX": 2, "scaleY": 4}
        }))
        .unwrap();
        let calls = draw_one(draw_line, el);
        let DrawCall::Line { from, to, .. } = calls[0] else {
            panic!("expected line");
        };
        assert!(close(from, PointPx::new(0.0, 0.0)));
        assert!(close(to, PointPx::new(100.0, 0.0)));
    }

    #[test]
    fn test_zero_width_line_draws_nothing() {
        let mut el = Element::new(ElementKind::Line);
        el.style.stroke_width = Some(0.0);
        assert!(draw_one(draw_line, el).is_empty());
    }

    #[test]
    fn test_rect_stroke_and_fill() {
        let mut el = Element::new(ElementKind::Rectangle);
        el.style.border_color = Some("blue".into());
        el.style.border_width = Some(3.0);
        el.style.background_color = Some("rgba(0, 0, 0, 0)".into());
        el.style.border_radius = Some(4.0);
        let calls = draw_one(draw_rect, el);
        let DrawCall::Rect {
            corner_radius_px,
            stroke,
            fill,
            ..
        } = calls[0]
        else {
            panic!("expected rect");
        };
        assert_eq!(corner_radius_px, 4.0);
        assert_eq!(stroke.map(|s| (s.color, s.width_px)), Some((Rgba::BLUE, 3.0)));
        assert_eq!(fill, None);
    }

    #[test]
    fn test_triangle_points() {
        let el = Element::new(ElementKind::Triangle).at(0.0, 0.0, 2.0, 3.0);
        let calls = draw_one(draw_triangle, el);
        let DrawCall::Polygon { points, .. } = &calls[0] else {
            panic!("expected polygon");
        };
        assert!(close(points[0], PointPx::new(10.0, 0.0)));
        assert!(close(points[1], PointPx::new(0.0, 30.0)));
        assert!(close(points[2], PointPx::new(20.0, 30.0)));
    }
}
