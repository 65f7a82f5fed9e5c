//! Barcode and legacy group elements.

use super::{Frame, draw_placeholder, style_str};
use crate::barcode::{BarcodeEncoder, Symbology};
use crate::binding;
use crate::error::EtiquetaError;
use crate::style::{Font, FontStyle, Rgba, STYLE_DEFAULTS};
use crate::surface::{RectPx, Surface, TextAlign};
use crate::template::{Element, ElementKind};

fn symbology(element: &Element) -> Symbology {
    Symbology::parse(style_str(&element.style.barcode_type).unwrap_or(STYLE_DEFAULTS.barcode_type))
}

/// Bound content, or the default value when it resolves empty.
pub(super) fn draw(
    surface: &mut dyn Surface,
    encoder: &dyn BarcodeEncoder,
    frame: &Frame,
    element: &Element,
    rect: RectPx,
) -> Result<Option<String>, EtiquetaError> {
    let mut value = binding::resolve(&element.content, frame.fields);
    if value.trim().is_empty() {
        value = STYLE_DEFAULTS.barcode_value.to_string();
    }
    draw_symbol(surface, encoder, frame, &value, symbology(element), rect)
}

/// The first text child's bound label is the value.
pub(super) fn draw_group(
    surface: &mut dyn Surface,
    encoder: &dyn BarcodeEncoder,
    frame: &Frame,
    element: &Element,
    rect: RectPx,
) -> Result<Option<String>, EtiquetaError> {
    let label = element
        .children
        .iter()
        .find(|child| child.kind == ElementKind::Text)
        .map(|child| binding::resolve(child.content.trim(), frame.fields))
        .unwrap_or_default();
    let value = match label.trim() {
        "" => STYLE_DEFAULTS.group_barcode_value,
        trimmed => trimmed,
    };
    draw_symbol(surface, encoder, frame, value, symbology(element), rect)
}

fn draw_symbol(
    surface: &mut dyn Surface,
    encoder: &dyn BarcodeEncoder,
    frame: &Frame,
    value: &str,
    symbology: Symbology,
    rect: RectPx,
) -> Result<Option<String>, EtiquetaError> {
    let width = rect.width.round().max(1.0) as usize;
    let height = rect.height.round().max(1.0) as usize;

    let raster = match encoder.encode(value, symbology, width, height) {
        Ok(raster) => raster,
        Err(e) => {
            draw_placeholder(surface, frame, rect, Rgba::RED, "Barcode Err")?;
            return Ok(Some(e.to_string()));
        }
    };
    surface.draw_image(rect, &image::DynamicImage::ImageLuma8(raster.to_luma8()))?;

    if !symbology.is_2d() {
        let size_px = frame.pt_to_px(STYLE_DEFAULTS.barcode_caption_pt);
        let font = Font::new(STYLE_DEFAULTS.font_family, size_px, FontStyle::REGULAR);
        let caption = RectPx::new(
            rect.x,
            rect.bottom() + frame.pt_to_px(STYLE_DEFAULTS.barcode_caption_gap_pt),
            rect.width,
            size_px,
        );
        surface.draw_text(value, &font, Rgba::BLACK, caption, TextAlign::TopCenter)?;
    }
    Ok(None)
}
