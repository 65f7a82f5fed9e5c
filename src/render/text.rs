//! Text elements.

use super::{Frame, style_str};
use crate::binding;
use crate::error::EtiquetaError;
use crate::style::{Font, FontStyle, STYLE_DEFAULTS, resolve_color};
use crate::surface::{RectPx, Surface, TextAlign};
use crate::template::Element;

/// Bound content, anchored at the rectangle's top-left corner.
pub(super) fn draw(
    surface: &mut dyn Surface,
    frame: &Frame,
    element: &Element,
    rect: RectPx,
) -> Result<(), EtiquetaError> {
    let text = binding::resolve(&element.content, frame.fields);
    if text.is_empty() {
        return Ok(());
    }

    let style = &element.style;
    let size_px = style
        .font_size
        .filter(|s| *s > 0.0)
        .unwrap_or(STYLE_DEFAULTS.font_size_px)
        * frame.ctx.scale_y;
    let font = Font::new(
        style_str(&style.font_family).unwrap_or(STYLE_DEFAULTS.font_family),
        size_px,
        FontStyle::from_css(style.font_weight.as_deref(), style.font_style.as_deref()),
    );
    let color = resolve_color(Some(
        style_str(&style.color).unwrap_or(STYLE_DEFAULTS.text_color),
    ));

    surface.draw_text(&text, &font, color, rect, TextAlign::TopLeft)
}
