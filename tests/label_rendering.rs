//! # Label Rendering Tests
//!
//! End-to-end checks through the public API: template JSON in, draw calls
//! or PDF bytes out.
//!
//! Draw-call assertions use [`RecordingSurface`]; page structure of real
//! output is checked by loading the PDF back with lopdf.

use etiqueta::barcode::{BarcodeEncoder, Raster, SymbolEncoder, Symbology};
use etiqueta::document::{render_batch, render_batch_to, render_single, render_single_to};
use etiqueta::layout::TilePlacement;
use etiqueta::store::{DirStore, TemplateStore};
use etiqueta::style::Rgba;
use etiqueta::surface::{DrawCall, RecordingSurface, TextAlign};
use etiqueta::table::DataTable;
use etiqueta::{EtiquetaError, FieldMap, RenderIssue, SheetConfig, Template};
use lopdf::Document;
use pretty_assertions::assert_eq;
use std::cell::RefCell;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const BATCH_LABEL: &str = r#"{
    "name": "lot label",
    "fabric": {
        "canvas": {"width_mm": 50, "height_mm": 30, "dpi": 300},
        "elements": [
            {"type": "text", "x_mm": 2, "y_mm": 2, "width_mm": 40, "height_mm": 5,
             "content": "Batch: {lot}", "z_index": 1},
            {"type": "barcode", "x_mm": 2, "y_mm": 10, "width_mm": 40, "height_mm": 12,
             "content": "{code}", "z_index": 2,
             "additionalData": {"barcodeType": "CODE128"}}
        ]
    }
}"#;

/// Records every encode request and returns a blank raster.
#[derive(Default)]
struct SpyEncoder {
    requests: RefCell<Vec<(String, Symbology)>>,
}

impl BarcodeEncoder for SpyEncoder {
    fn encode(
        &self,
        value: &str,
        symbology: Symbology,
        width: usize,
        height: usize,
    ) -> Result<Raster, EtiquetaError> {
        self.requests
            .borrow_mut()
            .push((value.to_string(), symbology));
        Ok(Raster::new(width, height))
    }
}

fn pdf_page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).unwrap().get_pages().len()
}

fn page_size_pt(bytes: &[u8], page: u32) -> (f64, f64) {
    let doc = Document::load_mem(bytes).unwrap();
    let pages = doc.get_pages();
    let dict = doc.get_dictionary(pages[&page]).unwrap();
    let media_box = dict.get(b"MediaBox").unwrap().as_array().unwrap();
    (
        media_box[2].as_float().unwrap() as f64,
        media_box[3].as_float().unwrap() as f64,
    )
}

fn lot_table(rows: usize) -> DataTable {
    DataTable::new(
        vec!["lot".into(), "code".into()],
        (0..rows)
            .map(|i| vec![format!("{:05}", i), format!("ABC-{:03}", i)])
            .collect(),
    )
}

// ============================================================================
// SINGLE MODE
// ============================================================================

#[test]
fn test_blank_template_is_one_blank_page() {
    let template =
        Template::from_json(r#"{"canvas": {"width_mm": 50, "height_mm": 40}, "elements": []}"#)
            .unwrap();

    let mut surface = RecordingSurface::new();
    let output =
        render_single_to(&mut surface, &SymbolEncoder, &template, &FieldMap::new()).unwrap();
    assert_eq!(surface.page_count(), 1);
    assert_eq!(surface.calls().len(), 1);
    assert!(output.report.issues.is_empty());

    let pdf = render_single(&template, &FieldMap::new()).unwrap();
    assert_eq!(pdf_page_count(&pdf.bytes), 1);
    let (w, h) = page_size_pt(&pdf.bytes, 1);
    assert!((w - 50.0 * 72.0 / 25.4).abs() < 0.01);
    assert!((h - 40.0 * 72.0 / 25.4).abs() < 0.01);
}

#[test]
fn test_draw_order_follows_z_index() {
    let template = Template::from_json(
        r#"{"elements": [
            {"type": "text", "content": "third", "z_index": 9},
            {"type": "text", "content": "first", "z_index": 0},
            {"type": "text", "content": "second", "z_index": 4},
            {"type": "text", "content": "also second", "z_index": 4}
        ]}"#,
    )
    .unwrap();

    let mut surface = RecordingSurface::new();
    render_single_to(&mut surface, &SymbolEncoder, &template, &FieldMap::new()).unwrap();
    assert_eq!(surface.texts(), vec!["first", "second", "also second", "third"]);
}

#[test]
fn test_unknown_element_is_reported_not_drawn() {
    let template = Template::from_json(
        r#"{"elements": [{"type": "hologram"}, {"type": "text", "content": "ok"}]}"#,
    )
    .unwrap();

    let mut surface = RecordingSurface::new();
    let output =
        render_single_to(&mut surface, &SymbolEncoder, &template, &FieldMap::new()).unwrap();
    assert_eq!(surface.texts(), vec!["ok"]);
    assert_eq!(output.report.issues.len(), 1);
    assert!(matches!(
        output.report.issues[0].1,
        RenderIssue::ElementRenderWarning { element: 0, .. }
    ));
}

#[test]
fn test_upc_a_with_letters_draws_error_placeholder() {
    let template = Template::from_json(
        r#"{"canvas": {"width_mm": 50, "height_mm": 30},
            "elements": [{"type": "barcode", "width_mm": 30, "height_mm": 10,
                          "content": "NOT-A-NUMBER",
                          "additionalData": {"barcodeType": "upca"}}]}"#,
    )
    .unwrap();

    let mut surface = RecordingSurface::new();
    let output =
        render_single_to(&mut surface, &SymbolEncoder, &template, &FieldMap::new()).unwrap();

    assert_eq!(output.report.pages, 1);
    assert_eq!(surface.page_count(), 1);
    assert!(matches!(
        &surface.calls()[1],
        DrawCall::Rect { stroke: Some(s), fill: None, .. } if s.color == Rgba::RED
    ));
    assert_eq!(surface.texts(), vec!["Barcode Err"]);
    assert!(matches!(
        output.report.issues[0].1,
        RenderIssue::AssetFailure { .. }
    ));

    let pdf = render_single(&template, &FieldMap::new()).unwrap();
    assert_eq!(pdf_page_count(&pdf.bytes), 1);
}

#[test]
fn test_single_label_binds_lot_and_code() {
    let template = Template::from_json(BATCH_LABEL).unwrap();
    let fields: FieldMap = [("lot", "12345"), ("code", "0001")].into_iter().collect();
    let encoder = SpyEncoder::default();

    let mut surface = RecordingSurface::new();
    let output = render_single_to(&mut surface, &encoder, &template, &fields).unwrap();

    assert_eq!(output.report.pages, 1);
    assert!(output.report.issues.is_empty());
    assert_eq!(
        encoder.requests.borrow().clone(),
        vec![("0001".to_string(), Symbology::Code128)]
    );

    let calls = surface.calls();
    // page, label text, barcode image, barcode caption
    assert_eq!(calls.len(), 4);
    assert!(matches!(calls[0], DrawCall::NewPage { .. }));
    assert!(matches!(&calls[1], DrawCall::Text { text, .. } if text == "Batch: 12345"));
    assert!(matches!(calls[2], DrawCall::Image { .. }));
    assert!(matches!(&calls[3], DrawCall::Text { text, align: TextAlign::TopCenter, .. } if text == "0001"));
    assert_eq!(surface.texts(), vec!["Batch: 12345", "0001"]);
}

#[test]
fn test_bad_json_is_a_parse_error() {
    assert!(matches!(
        Template::from_json("{\"elements\": ["),
        Err(EtiquetaError::TemplateParse(_))
    ));
}

// ============================================================================
// BATCH MODE
// ============================================================================

#[test]
fn test_batch_binds_lot_and_code() {
    let template = Template::from_json(BATCH_LABEL).unwrap();
    let table = DataTable::parse("lot,code\n12345,ABC-001\n").unwrap();

    let mut surface = RecordingSurface::new();
    let output = render_batch_to(
        &mut surface,
        &SymbolEncoder,
        &template,
        &table,
        &SheetConfig::default(),
    )
    .unwrap();

    assert_eq!(output.report.pages, 1);
    assert_eq!(output.report.placements, vec![TilePlacement::ORIGIN]);
    assert!(output.report.issues.is_empty());

    let calls = surface.calls();
    // page, label text, barcode image, barcode caption
    assert_eq!(calls.len(), 4);
    assert!(matches!(&calls[1], DrawCall::Text { text, .. } if text == "Batch: 12345"));
    assert!(matches!(calls[2], DrawCall::Image { .. }));
    match &calls[3] {
        DrawCall::Text { text, align, .. } => {
            assert_eq!(text, "ABC-001");
            assert_eq!(*align, TextAlign::TopCenter);
        }
        other => panic!("expected barcode caption, got {:?}", other),
    }
}

#[test]
fn test_batch_layout_is_deterministic() {
    let template = Template::from_json(BATCH_LABEL).unwrap();
    let table = lot_table(40);
    let sheet = SheetConfig::default();

    let first = render_batch(&template, &table, &sheet).unwrap();
    let second = render_batch(&template, &table, &sheet).unwrap();

    assert_eq!(first.report.placements, second.report.placements);
    assert_eq!(first.report.pages, 1);
    assert_eq!(pdf_page_count(&first.bytes), 1);

    // A4 at 300 dpi is about 2480 px wide: 15 tiles of 150 px with 10 px gaps
    let rows: Vec<f64> = first
        .report
        .placements
        .iter()
        .map(|p| p.offset_y_px)
        .collect();
    assert_eq!(rows[0], 0.0);
    assert_eq!(rows[15], 110.0);
    assert_eq!(rows[30], 220.0);
    assert_eq!(first.report.placements[39].offset_x_px, 1440.0);
}

#[test]
fn test_batch_scales_label_into_tile() {
    let template = Template::from_json(BATCH_LABEL).unwrap();
    let mut surface = RecordingSurface::new();
    render_batch_to(
        &mut surface,
        &SymbolEncoder,
        &template,
        &lot_table(2),
        &SheetConfig::default(),
    )
    .unwrap();

    // second label starts one tile plus margin to the right
    let images: Vec<_> = surface
        .calls()
        .iter()
        .filter_map(|c| match c {
            DrawCall::Image { rect, .. } => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(images.len(), 2);
    assert!((images[1].x - images[0].x - 160.0).abs() < 1e-6);
    assert!(images[0].right() <= 150.0 + 1e-6);
}

#[test]
fn test_batch_spills_onto_second_sheet() {
    let template = Template::from_json(BATCH_LABEL).unwrap();
    let sheet = SheetConfig::parse("60x40mm").unwrap();
    // 60x40 mm at 300 dpi is 708x472 px: 4 tiles across, 4 rows down
    let output = render_batch(&template, &lot_table(17), &sheet).unwrap();

    assert_eq!(output.report.pages, 2);
    assert_eq!(pdf_page_count(&output.bytes), 2);
    assert_eq!(output.report.placements[16].page_index, 1);
    let (w, _) = page_size_pt(&output.bytes, 2);
    assert!((w - 60.0 * 72.0 / 25.4).abs() < 0.01);
}

#[test]
fn test_batch_without_rows_is_rejected() {
    let template = Template::from_json(BATCH_LABEL).unwrap();
    let table = DataTable::parse("lot,code\n").unwrap();
    assert!(matches!(
        render_batch(&template, &table, &SheetConfig::default()),
        Err(EtiquetaError::InputValidation(_))
    ));
}

// ============================================================================
// TEMPLATE STORE
// ============================================================================

#[test]
fn test_saved_template_renders() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::open(dir.path()).unwrap();
    let id = store.save("lot label", BATCH_LABEL).unwrap();

    let template = store.load(&id).unwrap().template().unwrap();
    let output = render_batch(&template, &lot_table(3), &SheetConfig::default()).unwrap();
    assert_eq!(output.report.labels(), 3);

    let listed: Vec<String> = store.list_all().unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(listed, vec![id]);
}
