//! Element types for the template model.
//!
//! Elements are deserialized through a lenient raw form: numeric fields
//! accept numbers or numeric strings, anything else counts as absent, and
//! every absent field takes the default stated on [`Element`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Width/height used when an element omits its size.
pub const DEFAULT_ELEMENT_SIZE_MM: f64 = 10.0;

// ============================================================================
// LENIENT FIELD DESERIALIZERS
// ============================================================================

/// Number or numeric string → `Some(f64)`; anything else → `None`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

/// String or number → `Some(String)`; anything else → `None`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

// ============================================================================
// ELEMENT KIND
// ============================================================================

/// What an element draws.
///
/// Unrecognized type names are kept as [`ElementKind::Unknown`] so the
/// element stays in the template but produces no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Text,
    Line,
    /// Also spelled `border`, `rect`, `border-rectangle`.
    Rectangle,
    Circle,
    Ellipse,
    Triangle,
    Image,
    Barcode,
    /// Legacy barcode container; its text child supplies the value.
    Group,
    Unknown(String),
}

impl ElementKind {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" | "textbox" => Self::Text,
            "line" => Self::Line,
            "rectangle" | "rect" | "border" | "border-rectangle" => Self::Rectangle,
            "circle" => Self::Circle,
            "ellipse" => Self::Ellipse,
            "triangle" => Self::Triangle,
            "image" | "imageplaceholder" => Self::Image,
            "barcode" => Self::Barcode,
            "group" => Self::Group,
            _ => Self::Unknown(name.to_string()),
        }
    }

    /// Canonical lowercase name, used in logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Line => "line",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Ellipse => "ellipse",
            Self::Triangle => "triangle",
            Self::Image => "image",
            Self::Barcode => "barcode",
            Self::Group => "group",
            Self::Unknown(name) => name,
        }
    }
}

impl Default for ElementKind {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

// ============================================================================
// STYLE (additionalData)
// ============================================================================

/// Typed view of an element's `additionalData` mapping.
///
/// Every key is optional; the renderer fills gaps from
/// [`STYLE_DEFAULTS`](crate::style::STYLE_DEFAULTS).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementStyle {
    /// Text size in device pixels.
    #[serde(deserialize_with = "lenient_f64")]
    pub font_size: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub font_family: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub font_weight: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub font_style: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub border_color: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub border_width: Option<f64>,
    /// Corner radius in device pixels for rectangles.
    #[serde(deserialize_with = "lenient_f64")]
    pub border_radius: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    pub background_color: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub barcode_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub stroke_color: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub stroke_width: Option<f64>,
    /// Line length multiplier (legacy designer transform). `scaleY` is
    /// not kept: a line has no local height for it to stretch.
    #[serde(deserialize_with = "lenient_f64")]
    pub scale_x: Option<f64>,
    /// Field holding image data for image elements.
    #[serde(deserialize_with = "lenient_string")]
    pub field_name: Option<String>,
}

// ============================================================================
// ELEMENT
// ============================================================================

/// One drawable item on the label canvas.
///
/// Positions and sizes are in millimeters relative to the canvas origin.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawElement")]
pub struct Element {
    pub id: Option<String>,
    pub kind: ElementKind,
    /// Default 0.
    pub x_mm: f64,
    /// Default 0.
    pub y_mm: f64,
    /// Default [`DEFAULT_ELEMENT_SIZE_MM`].
    pub width_mm: f64,
    /// Default [`DEFAULT_ELEMENT_SIZE_MM`].
    pub height_mm: f64,
    /// Literal text, a data URI, or a placeholder. Default empty.
    pub content: String,
    /// Stacking order, higher draws later. Default 0.
    pub z_index: i64,
    /// Rotation in degrees; only lines honor it. Default 0.
    pub rotation_deg: f64,
    pub style: ElementStyle,
    /// Members of a legacy group.
    pub children: Vec<Element>,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            id: None,
            kind: ElementKind::default(),
            x_mm: 0.0,
            y_mm: 0.0,
            width_mm: DEFAULT_ELEMENT_SIZE_MM,
            height_mm: DEFAULT_ELEMENT_SIZE_MM,
            content: String::new(),
            z_index: 0,
            rotation_deg: 0.0,
            style: ElementStyle::default(),
            children: Vec::new(),
        }
    }
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Builder: position and size in millimeters.
    pub fn at(mut self, x_mm: f64, y_mm: f64, width_mm: f64, height_mm: f64) -> Self {
        self.x_mm = x_mm;
        self.y_mm = y_mm;
        self.width_mm = width_mm;
        self.height_mm = height_mm;
        self
    }

    /// Builder: content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder: z-index.
    pub fn z(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }
}

/// Wire form of an element before defaults are applied.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawElement {
    #[serde(deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient_string")]
    kind: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    x_mm: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    y_mm: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    width_mm: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    height_mm: Option<f64>,
    #[serde(deserialize_with = "lenient_string")]
    content: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    text: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    z_index: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    rotation_deg: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    angle: Option<f64>,
    #[serde(rename = "additionalData")]
    additional_data: Option<Value>,
    children: Option<Value>,
    objects: Option<Value>,
}

impl From<RawElement> for Element {
    fn from(raw: RawElement) -> Self {
        let style = raw
            .additional_data
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        // Designer saves may carry both spellings; the first one wins.
        let children = match (&raw.children, &raw.objects) {
            (Some(v), _) => parse_elements(v, "children"),
            (None, Some(v)) => parse_elements(v, "objects"),
            (None, None) => Vec::new(),
        };

        Self {
            id: raw.id,
            kind: raw.kind.as_deref().map(ElementKind::parse).unwrap_or_default(),
            x_mm: raw.x_mm.unwrap_or(0.0),
            y_mm: raw.y_mm.unwrap_or(0.0),
            width_mm: raw.width_mm.unwrap_or(DEFAULT_ELEMENT_SIZE_MM),
            height_mm: raw.height_mm.unwrap_or(DEFAULT_ELEMENT_SIZE_MM),
            content: raw.content.or(raw.text).unwrap_or_default(),
            z_index: raw.z_index.map(|z| z as i64).unwrap_or(0),
            rotation_deg: raw.rotation_deg.or(raw.angle).unwrap_or(0.0),
            style,
            children,
        }
    }
}

/// Parse a JSON array of elements, skipping entries that are not objects.
pub(crate) fn parse_elements(value: &Value, path: &str) -> Vec<Element> {
    let Value::Array(items) = value else {
        log::warn!("{}: expected an array, ignoring", path);
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| {
            if !item.is_object() {
                log::warn!("{}[{}]: expected object, got {}", path, i, item);
                return None;
            }
            match serde_json::from_value::<Element>(item.clone()) {
                Ok(element) => Some(element),
                Err(e) => {
                    log::warn!("{}[{}]: {}", path, i, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn element(value: Value) -> Element {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let el = element(json!({"type": "text"}));
        assert_eq!(el.kind, ElementKind::Text);
        assert_eq!(el.x_mm, 0.0);
        assert_eq!(el.width_mm, DEFAULT_ELEMENT_SIZE_MM);
        assert_eq!(el.height_mm, DEFAULT_ELEMENT_SIZE_MM);
        assert_eq!(el.z_index, 0);
        assert!(el.content.is_empty());
        assert_eq!(el.style, ElementStyle::default());
    }

    #[test]
    fn test_numeric_strings_and_garbage() {
        let el = element(json!({
            "type": "rectangle",
            "x_mm": "12.5",
            "y_mm": {"nested": true},
            "width_mm": null,
            "z_index": "3"
        }));
        assert_eq!(el.x_mm, 12.5);
        assert_eq!(el.y_mm, 0.0);
        assert_eq!(el.width_mm, DEFAULT_ELEMENT_SIZE_MM);
        assert_eq!(el.z_index, 3);
    }

    #[test]
    fn test_additional_data() {
        let el = element(json!({
            "type": "text",
            "content": "Sample Text",
            "additionalData": {
                "fontSize": 14,
                "fontFamily": "Arial",
                "fontWeight": 700,
                "color": "#000000",
                "unrelated": [1, 2, 3]
            }
        }));
        assert_eq!(el.style.font_size, Some(14.0));
        assert_eq!(el.style.font_family.as_deref(), Some("Arial"));
        assert_eq!(el.style.font_weight.as_deref(), Some("700"));
        assert_eq!(el.style.color.as_deref(), Some("#000000"));
    }

    #[test]
    fn test_line_scale_keeps_only_x() {
        let el = element(json!({
            "type": "line",
            "additionalData": {"scaleX": 2, "scaleY": 3}
        }));
        assert_eq!(el.style.scale_x, Some(2.0));
        assert_eq!(
            el.style,
            ElementStyle {
                scale_x: Some(2.0),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_malformed_additional_data_is_ignored() {
        let el = element(json!({"type": "line", "additionalData": "oops"}));
        assert_eq!(el.style, ElementStyle::default());
    }

    #[test]
    fn test_kind_aliases() {
        assert_eq!(ElementKind::parse("border-rectangle"), ElementKind::Rectangle);
        assert_eq!(ElementKind::parse("Border"), ElementKind::Rectangle);
        assert_eq!(ElementKind::parse("textbox"), ElementKind::Text);
        assert_eq!(
            ElementKind::parse("hologram"),
            ElementKind::Unknown("hologram".into())
        );
    }

    #[test]
    fn test_group_children_from_objects() {
        let el = element(json!({
            "type": "group",
            "objects": [
                {"type": "rect"},
                {"type": "text", "text": "sku"},
                42
            ]
        }));
        assert_eq!(el.kind, ElementKind::Group);
        assert_eq!(el.children.len(), 2);
        assert_eq!(el.children[1].content, "sku");
    }

    #[test]
    fn test_both_spellings_keep_the_element() {
        let el = element(json!({
            "type": "text",
            "content": "a",
            "text": "b",
            "rotation_deg": 15,
            "angle": 30,
            "children": [{"type": "text"}],
            "objects": [{"type": "rect"}, {"type": "rect"}]
        }));
        assert_eq!(el.content, "a");
        assert_eq!(el.rotation_deg, 15.0);
        assert_eq!(el.children.len(), 1);

        let legacy = element(json!({"type": "line", "text": "b", "angle": 30}));
        assert_eq!(legacy.content, "b");
        assert_eq!(legacy.rotation_deg, 30.0);
    }
}
