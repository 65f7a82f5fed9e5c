//! # Field Binding
//!
//! Substitutes per-row data into element content before drawing.
//!
//! | Content | FieldMap | Result |
//! |---------|----------|--------|
//! | `{code}` | `code = ABC-001` | `ABC-001` |
//! | `Batch: {lot}` | `lot = 12345` | `Batch: 12345` |
//! | `sku` | `sku = 42` | `42` |
//! | `{missing}` | | `{missing}` |
//!
//! Resolution never fails: unknown keys stay literal, braces included.

use std::collections::BTreeMap;

/// Marker the designer leaves in barcode cells; stripped from batch values.
const BARCODE_MARKER: &str = "{barcode}";

/// Field name → value for one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    values: BTreeMap<String, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map for one batch row.
    ///
    /// Header names and cells are zipped pairwise; extra headers or extra
    /// cells are ignored. Cell values lose any `{barcode}` marker.
    pub fn from_row<H, C>(header: &[H], row: &[C]) -> Self
    where
        H: AsRef<str>,
        C: AsRef<str>,
    {
        header
            .iter()
            .zip(row)
            .map(|(name, cell)| {
                (
                    name.as_ref().trim().to_string(),
                    strip_marker(cell.as_ref()),
                )
            })
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Remove every case-insensitive occurrence of `{barcode}`.
fn strip_marker(cell: &str) -> String {
    let lower = cell.to_ascii_lowercase();
    let mut out = String::with_capacity(cell.len());
    let mut pos = 0;
    while let Some(found) = lower[pos..].find(BARCODE_MARKER) {
        out.push_str(&cell[pos..pos + found]);
        pos += found + BARCODE_MARKER.len();
    }
    out.push_str(&cell[pos..]);
    out
}

/// Resolve element content against a field map.
///
/// Content equal to a key is replaced whole; otherwise each `{key}` token
/// with a known key is replaced in place.
///
/// ```
/// use etiqueta::binding::{resolve, FieldMap};
///
/// let fields: FieldMap = [("lot", "12345")].into_iter().collect();
/// assert_eq!(resolve("Batch: {lot}", &fields), "Batch: 12345");
/// assert_eq!(resolve("{other}", &fields), "{other}");
/// ```
pub fn resolve(content: &str, fields: &FieldMap) -> String {
    if fields.is_empty() {
        return content.to_string();
    }
    if let Some(value) = fields.get(content) {
        return value.to_string();
    }

    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => match fields.get(&after[..close]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    // Keep the brace and rescan, so "{{a}" still finds "{a}"
                    out.push('{');
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
