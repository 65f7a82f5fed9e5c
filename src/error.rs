//! # Error Types
//!
//! This module defines error types used throughout the etiqueta library.
//!
//! Only template-level and input-level failures abort a render. Problems
//! with a single element (unknown type, broken image, unencodable barcode)
//! are recovered where they happen and reported as [`RenderIssue`]s.

use thiserror::Error;

/// Main error type for etiqueta operations
#[derive(Debug, Error)]
pub enum EtiquetaError {
    /// The template payload is not valid JSON (or not a JSON object)
    #[error("Template parse error: {0}")]
    TemplateParse(String),

    /// Required render inputs are missing (batch header, rows, template id)
    #[error("Invalid input: {0}")]
    InputValidation(String),

    /// The barcode encoder rejected a value/symbology combination
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Image payload could not be decoded
    #[error("Image error: {0}")]
    Image(String),

    /// PDF serialization failed
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Template store failure (unknown id, unreadable entry)
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration file or preset could not be used
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for EtiquetaError {
    fn from(err: serde_json::Error) -> Self {
        EtiquetaError::TemplateParse(err.to_string())
    }
}

impl From<lopdf::Error> for EtiquetaError {
    fn from(err: lopdf::Error) -> Self {
        EtiquetaError::Pdf(err.to_string())
    }
}

/// A non-fatal problem met while drawing one element.
///
/// The render continues; the issue is logged and returned in the
/// render report so callers can surface it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderIssue {
    /// Element skipped (unknown type, nothing to draw).
    ElementRenderWarning { element: usize, message: String },
    /// Asset failed and a visible placeholder was drawn instead.
    AssetFailure { element: usize, message: String },
}

impl std::fmt::Display for RenderIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderIssue::ElementRenderWarning { element, message } => {
                write!(f, "element {}: skipped: {}", element, message)
            }
            RenderIssue::AssetFailure { element, message } => {
                write!(f, "element {}: placeholder drawn: {}", element, message)
            }
        }
    }
}
