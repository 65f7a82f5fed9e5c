//! # Template Model
//!
//! A template is a small canvas (millimeters at a DPI) plus an ordered list
//! of elements. It is parsed once per render request and never mutated.
//!
//! Three root layouts are accepted, matching what the label designer has
//! saved over time:
//!
//! ```text
//! {"fabric": {"canvas": {...}, "elements": [...]}, "thumbnail": "data:image/..."}
//! {"canvas": {...}, "elements": [...]}
//! {"canvasSize": {"width": 50, "height": 30}, "dpi": 300, "elements": [...]}
//! ```
//!
//! ```
//! use etiqueta::template::{ElementKind, Template};
//!
//! let template = Template::from_json(r#"{
//!     "canvas": {"width_mm": 50, "height_mm": 30, "dpi": 300},
//!     "elements": [{"type": "text", "content": "Hello", "z_index": 1}]
//! }"#).unwrap();
//!
//! assert_eq!(template.dpi, 300);
//! assert_eq!(template.elements[0].kind, ElementKind::Text);
//! ```

mod types;

pub use types::{DEFAULT_ELEMENT_SIZE_MM, Element, ElementKind, ElementStyle};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::EtiquetaError;
use crate::units;
use types::{lenient_f64, parse_elements, value_as_f64};

/// Canvas width used when the template gives none (A4 portrait).
pub const DEFAULT_CANVAS_WIDTH_MM: f64 = 210.0;
/// Canvas height used when the template gives none (A4 portrait).
pub const DEFAULT_CANVAS_HEIGHT_MM: f64 = 297.0;
/// Resolution used when the template gives none.
pub const DEFAULT_DPI: u32 = 300;

/// A parsed label template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: Option<String>,
    /// Always > 0.
    pub canvas_width_mm: f64,
    /// Always > 0.
    pub canvas_height_mm: f64,
    /// Always >= 1.
    pub dpi: u32,
    /// Elements in document order; see [`Template::draw_order`].
    pub elements: Vec<Element>,
    /// Fallback image for image elements without data.
    pub thumbnail: Option<String>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            name: None,
            canvas_width_mm: DEFAULT_CANVAS_WIDTH_MM,
            canvas_height_mm: DEFAULT_CANVAS_HEIGHT_MM,
            dpi: DEFAULT_DPI,
            elements: Vec::new(),
            thumbnail: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCanvas {
    #[serde(deserialize_with = "lenient_f64")]
    width_mm: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    height_mm: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    dpi: Option<f64>,
}

/// Legacy `canvasSize` block (millimeters).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCanvasSize {
    #[serde(deserialize_with = "lenient_f64")]
    width: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    height: Option<f64>,
}

fn lenient_object<T: Default + for<'de> Deserialize<'de>>(value: Option<&Value>) -> Option<T> {
    value
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

impl Template {
    /// Parse a template from JSON text.
    ///
    /// Fails only when the payload is not JSON or its root is not an
    /// object. Missing or malformed fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, EtiquetaError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Parse a template from an already-decoded JSON value.
    pub fn from_value(value: &Value) -> Result<Self, EtiquetaError> {
        let Value::Object(root) = value else {
            return Err(EtiquetaError::TemplateParse(format!(
                "expected a JSON object at the root, got {}",
                type_name(value)
            )));
        };

        // Designer saves nest the scene under "fabric"
        let scene: &Map<String, Value> = match root.get("fabric") {
            Some(Value::Object(fabric)) => fabric,
            _ => root,
        };

        let canvas: RawCanvas = lenient_object(scene.get("canvas").or_else(|| root.get("canvas")))
            .unwrap_or_default();
        let legacy: RawCanvasSize = lenient_object(root.get("canvasSize")).unwrap_or_default();
        let legacy_dpi = root.get("dpi").and_then(value_as_f64);

        let canvas_width_mm = positive(canvas.width_mm)
            .or(positive(legacy.width))
            .unwrap_or(DEFAULT_CANVAS_WIDTH_MM);
        let canvas_height_mm = positive(canvas.height_mm)
            .or(positive(legacy.height))
            .unwrap_or(DEFAULT_CANVAS_HEIGHT_MM);
        let dpi = positive(canvas.dpi.or(legacy_dpi))
            .map(|d| (d.round() as u32).max(1))
            .unwrap_or(DEFAULT_DPI);

        let elements = scene
            .get("elements")
            .or_else(|| root.get("elements"))
            .map(|v| parse_elements(v, "elements"))
            .unwrap_or_default();

        let text = |key: &str| root.get(key).and_then(Value::as_str).map(str::to_string);

        Ok(Self {
            name: text("name"),
            canvas_width_mm,
            canvas_height_mm,
            dpi,
            elements,
            thumbnail: text("thumbnail").filter(|t| !t.trim().is_empty()),
        })
    }

    /// Elements in ascending z-index; ties keep document order.
    ///
    /// Each entry carries the element's index in [`Template::elements`].
    pub fn draw_order(&self) -> Vec<(usize, &Element)> {
        let mut ordered: Vec<(usize, &Element)> = self.elements.iter().enumerate().collect();
        ordered.sort_by_key(|(_, el)| el.z_index);
        ordered
    }

    /// Canvas width in device pixels.
    pub fn canvas_width_px(&self) -> f64 {
        units::mm_to_px(self.canvas_width_mm, self.dpi)
    }

    /// Canvas height in device pixels.
    pub fn canvas_height_px(&self) -> f64 {
        units::mm_to_px(self.canvas_height_mm, self.dpi)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
