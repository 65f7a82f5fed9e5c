//! Image elements.
//!
//! Source order: bound `content`, then the field named by `fieldName`, then
//! the template thumbnail. Only `data:image/...` URIs are used; the payload
//! after the first comma is base64.

use base64::Engine;

use super::{Frame, draw_placeholder, style_str};
use crate::binding;
use crate::error::EtiquetaError;
use crate::style::Rgba;
use crate::surface::{RectPx, Surface};
use crate::template::Element;

/// Prompt text the designer leaves in empty image slots.
const UPLOAD_PROMPT: &str = "Click to upload";

fn usable(candidate: &str) -> Option<&str> {
    let candidate = candidate.trim();
    (!candidate.is_empty() && !candidate.contains(UPLOAD_PROMPT)).then_some(candidate)
}

fn is_data_image(uri: &&str) -> bool {
    uri.starts_with("data:image")
}

/// Decode a `data:image` URI.
pub(crate) fn decode_data_uri(uri: &str) -> Result<image::DynamicImage, EtiquetaError> {
    let payload = uri.split_once(',').map_or(uri, |(_, data)| data);
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| EtiquetaError::Image(format!("invalid base64: {}", e)))?;
    image::load_from_memory(&bytes).map_err(|e| EtiquetaError::Image(e.to_string()))
}

/// Largest rectangle with the image's aspect ratio, centered in `rect`.
fn fit_centered(rect: RectPx, width: u32, height: u32) -> RectPx {
    let (iw, ih) = (width.max(1) as f64, height.max(1) as f64);
    let scale = (rect.width / iw).min(rect.height / ih);
    let (w, h) = (iw * scale, ih * scale);
    RectPx::new(
        rect.x + (rect.width - w) / 2.0,
        rect.y + (rect.height - h) / 2.0,
        w,
        h,
    )
}

/// Returns the failure message when a placeholder was drawn.
pub(super) fn draw(
    surface: &mut dyn Surface,
    frame: &Frame,
    element: &Element,
    rect: RectPx,
) -> Result<Option<String>, EtiquetaError> {
    let bound = binding::resolve(&element.content, frame.fields);
    let source = usable(&bound)
        .filter(is_data_image)
        .or_else(|| {
            style_str(&element.style.field_name)
                .and_then(|name| frame.fields.get(name))
                .and_then(usable)
                .filter(is_data_image)
        })
        .or_else(|| {
            frame
                .template
                .thumbnail
                .as_deref()
                .and_then(usable)
                .filter(is_data_image)
        });

    let Some(uri) = source else {
        draw_placeholder(surface, frame, rect, Rgba::GRAY, "No image")?;
        return Ok(Some("no image data".to_string()));
    };

    match decode_data_uri(uri) {
        Ok(img) => {
            let target = fit_centered(rect, img.width(), img.height());
            log::debug!(
                "image {}x{} placed at {:.1},{:.1} ({:.1}x{:.1} px)",
                img.width(),
                img.height(),
                target.x,
                target.y,
                target.width,
                target.height
            );
            surface.draw_image(target, &img)?;
            Ok(None)
        }
        Err(e) => {
            draw_placeholder(surface, frame, rect, Rgba::RED, "Image error")?;
            Ok(Some(e.to_string()))
        }
    }
}
