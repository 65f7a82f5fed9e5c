//! # Etiqueta - Label Template Renderer
//!
//! Etiqueta turns label designs (JSON describing a small printable canvas
//! with text, barcodes, images and shapes) into PDF documents. It provides:
//!
//! - **Template model**: lenient parsing of designer JSON
//! - **Field binding**: `{placeholder}` substitution from a field map
//! - **Batch tiling**: one label per table row, flowed across sheets
//! - **Barcodes**: CODE128, CODE39, EAN-13, EAN-8, UPC-A, UPC-E, ITF-14 and QR
//! - **Output**: PDF through lopdf, or a draw-call log for inspection
//!
//! ## Quick Start
//!
//! ```
//! use etiqueta::{FieldMap, SheetConfig, Template};
//! use etiqueta::document::{render_batch, render_single};
//! use etiqueta::table::DataTable;
//!
//! let template = Template::from_json(r#"{
//!     "canvas": {"width_mm": 50, "height_mm": 30, "dpi": 300},
//!     "elements": [
//!         {"type": "text", "x_mm": 2, "y_mm": 2, "content": "Batch: {lot}"},
//!         {"type": "barcode", "x_mm": 2, "y_mm": 10, "width_mm": 40,
//!          "height_mm": 12, "content": "{code}"}
//!     ]
//! }"#)?;
//!
//! // One label
//! let fields: FieldMap = [("lot", "12345"), ("code", "ABC-001")].into_iter().collect();
//! let single = render_single(&template, &fields)?;
//! assert_eq!(single.report.pages, 1);
//!
//! // One label per row
//! let table = DataTable::parse("lot,code\n1,A-1\n2,A-2\n")?;
//! let batch = render_batch(&template, &table, &SheetConfig::default())?;
//! assert_eq!(batch.report.labels(), 2);
//!
//! # Ok::<(), etiqueta::EtiquetaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`template`] | Template and element model, JSON parsing |
//! | [`binding`] | Field maps and placeholder resolution |
//! | [`layout`] | Tile placement and pagination |
//! | [`render`] | Per-element drawing |
//! | [`document`] | Single and batch document assembly |
//! | [`surface`] | Drawing targets (PDF, recording) |
//! | [`barcode`] | Barcode and QR rasterization |
//! | [`style`] | Colors, fonts, style defaults |
//! | [`units`] | mm / px / pt conversion |
//! | [`table`] | Batch input table |
//! | [`store`] | Saved templates |
//! | [`config`] | Sheet presets and TOML config |
//! | [`error`] | Error types |

pub mod barcode;
pub mod binding;
pub mod config;
pub mod document;
pub mod error;
pub mod layout;
pub mod render;
pub mod store;
pub mod style;
pub mod surface;
pub mod table;
pub mod template;
pub mod units;

// Re-exports for convenience
pub use binding::FieldMap;
pub use config::SheetConfig;
pub use error::{EtiquetaError, RenderIssue};
pub use template::Template;
