//! # Document Assembler
//!
//! Ties layout and element rendering together and owns the page lifecycle.
//!
//! ## Single mode
//!
//! One page the size of the template canvas, one label at the origin:
//!
//! ```
//! use etiqueta::document::render_single;
//! use etiqueta::{FieldMap, Template};
//!
//! let template = Template::from_json(r#"{"canvas": {"width_mm": 50, "height_mm": 30}}"#).unwrap();
//! let output = render_single(&template, &FieldMap::new()).unwrap();
//! assert!(output.bytes.starts_with(b"%PDF"));
//! assert_eq!(output.report.pages, 1);
//! ```
//!
//! ## Batch mode
//!
//! One label per table row, tiled across sheets by
//! [`FlowLayout`](crate::layout::FlowLayout). Each row becomes the
//! [`FieldMap`] of its label.

use crate::barcode::{BarcodeEncoder, SymbolEncoder};
use crate::binding::FieldMap;
use crate::config::SheetConfig;
use crate::error::{EtiquetaError, RenderIssue};
use crate::layout::{self, FlowLayout, RenderContext, TilePlacement};
use crate::render::{self, Frame};
use crate::surface::{PdfSurface, Surface};
use crate::table::DataTable;
use crate::template::Template;
use crate::units;

/// What happened during one render call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderReport {
    pub pages: usize,
    pub placements: Vec<TilePlacement>,
    /// Recovered problems, tagged with the label (row) index.
    pub issues: Vec<(usize, RenderIssue)>,
}

impl RenderReport {
    pub fn labels(&self) -> usize {
        self.placements.len()
    }
}

/// Finished document bytes plus the report.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub bytes: Vec<u8>,
    pub report: RenderReport,
}

/// Render one label onto `surface` and finish it.
pub fn render_single_to(
    surface: &mut dyn Surface,
    encoder: &dyn BarcodeEncoder,
    template: &Template,
    fields: &FieldMap,
) -> Result<RenderOutput, EtiquetaError> {
    let placements = layout::single();
    surface.new_page(
        units::mm_to_pt(template.canvas_width_mm),
        units::mm_to_pt(template.canvas_height_mm),
    )?;

    let frame = Frame {
        template,
        fields,
        ctx: RenderContext::single(template),
        placement: TilePlacement::ORIGIN,
    };
    let issues = render::render_label(surface, encoder, &frame)?
        .into_iter()
        .map(|issue| (0, issue))
        .collect();

    let bytes = surface.finish()?;
    Ok(RenderOutput {
        bytes,
        report: RenderReport {
            pages: layout::page_count(&placements),
            placements,
            issues,
        },
    })
}

/// Render one label per table row, tiled on `sheet`, and finish.
///
/// Fails with [`EtiquetaError::InputValidation`] before drawing anything
/// when the table has no header or no rows.
pub fn render_batch_to(
    surface: &mut dyn Surface,
    encoder: &dyn BarcodeEncoder,
    template: &Template,
    table: &DataTable,
    sheet: &SheetConfig,
) -> Result<RenderOutput, EtiquetaError> {
    if table.header.iter().all(|h| h.trim().is_empty()) {
        return Err(EtiquetaError::InputValidation(
            "batch table has no header row".into(),
        ));
    }
    if table.rows.is_empty() {
        return Err(EtiquetaError::InputValidation(
            "batch table has no data rows".into(),
        ));
    }

    let dpi = template.dpi.max(1);
    let flow = FlowLayout::new(
        sheet.tile_width_px,
        sheet.tile_height_px,
        sheet.margin_px,
        sheet.page_width_px(dpi),
        sheet.page_height_px(dpi),
    );
    let placements = flow.place(table.rows.len());
    let ctx = RenderContext::for_tile(template, flow.tile_width_px, flow.tile_height_px);
    log::debug!(
        "batch: {} rows, scale {:.3}x{:.3}, {} page(s)",
        table.rows.len(),
        ctx.scale_x,
        ctx.scale_y,
        layout::page_count(&placements)
    );

    let (page_w_pt, page_h_pt) = (
        units::mm_to_pt(sheet.page_width_mm),
        units::mm_to_pt(sheet.page_height_mm),
    );
    let mut pages_open = 0;
    let mut issues = Vec::new();

    for (label, (row, placement)) in table.rows.iter().zip(&placements).enumerate() {
        while pages_open <= placement.page_index {
            surface.new_page(page_w_pt, page_h_pt)?;
            pages_open += 1;
        }

        let fields = FieldMap::from_row(&table.header, row);
        let frame = Frame {
            template,
            fields: &fields,
            ctx,
            placement: *placement,
        };
        issues.extend(
            render::render_label(surface, encoder, &frame)?
                .into_iter()
                .map(|issue| (label, issue)),
        );
    }

    let bytes = surface.finish()?;
    Ok(RenderOutput {
        bytes,
        report: RenderReport {
            pages: pages_open,
            placements,
            issues,
        },
    })
}

fn pdf_surface(template: &Template) -> PdfSurface {
    let surface = PdfSurface::new(template.dpi.max(1));
    match template.name.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(name) => surface.with_title(name),
        None => surface,
    }
}

/// [`render_single_to`] with the PDF surface and the built-in encoder.
pub fn render_single(template: &Template, fields: &FieldMap) -> Result<RenderOutput, EtiquetaError> {
    render_single_to(&mut pdf_surface(template), &SymbolEncoder, template, fields)
}

/// [`render_batch_to`] with the PDF surface and the built-in encoder.
pub fn render_batch(
    template: &Template,
    table: &DataTable,
    sheet: &SheetConfig,
) -> Result<RenderOutput, EtiquetaError> {
    render_batch_to(&mut pdf_surface(template), &SymbolEncoder, template, table, sheet)
}
