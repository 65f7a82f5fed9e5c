//! PDF output through lopdf.
//!
//! ## Mapping
//!
//! ```text
//! pt = px * 72 / dpi
//! y_pdf = page_height_pt - y_pt
//! ```
//!
//! Fonts are the standard 14 Type1 faces, so nothing is embedded. Family
//! names map to Helvetica, Times or Courier; widths used for centering are
//! estimates. Partial transparency goes through `ExtGState` entries.
//! Images become Flate-compressed XObjects with an `SMask` when they carry
//! alpha.

use std::collections::BTreeMap;
use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::{PointPx, RectPx, Stroke, Surface, TextAlign, estimate_text_width};
use crate::error::EtiquetaError;
use crate::style::{Font, Rgba};
use crate::units;

/// Baseline offset below the text box top, as a fraction of font size.
const ASCENT: f64 = 0.8;
/// Line advance as a fraction of font size.
const LINE_HEIGHT: f64 = 1.15;
/// Bézier control distance for quarter circles.
const KAPPA: f64 = 0.552_284_75;

const STANDARD_FONTS: [&str; 12] = [
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
];

/// Index into [`STANDARD_FONTS`] for a requested font.
fn standard_font(font: &Font) -> usize {
    let family = font.family.to_ascii_lowercase();
    let base = if family.contains("courier") || family.contains("mono") {
        8
    } else if family.contains("times") || (family.contains("serif") && !family.contains("sans")) {
        4
    } else {
        0
    };
    let variant = match (font.style.is_bold(), font.style.is_italic()) {
        (false, false) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (true, true) => 3,
    };
    base + variant
}

/// WinAnsi bytes for `text`; characters outside Latin-1 become `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(c as u32).unwrap_or(b'?'))
        .collect()
}

struct PageState {
    height_pt: f64,
    width_pt: f64,
    ops: Vec<Operation>,
    fonts: BTreeMap<String, ObjectId>,
    xobjects: BTreeMap<String, ObjectId>,
    ext_gstates: BTreeMap<String, Dictionary>,
}

/// A [`Surface`] producing a PDF document.
pub struct PdfSurface {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    current: Option<PageState>,
    font_ids: BTreeMap<usize, ObjectId>,
    image_count: usize,
    /// Points per device pixel.
    scale: f64,
    title: Option<String>,
    finished: bool,
}

impl PdfSurface {
    /// A surface taking geometry in pixels at `dpi`.
    pub fn new(dpi: u32) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            current: None,
            font_ids: BTreeMap::new(),
            image_count: 0,
            scale: units::px_to_pt(1.0, dpi),
            title: None,
            finished: false,
        }
    }

    /// Set the document title stored in the info dictionary.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn page(&mut self) -> Result<&mut PageState, EtiquetaError> {
        self.current
            .as_mut()
            .ok_or_else(|| EtiquetaError::Pdf("draw call before new_page".into()))
    }

    fn pt(&self, px: f64) -> f64 {
        px * self.scale
    }

    /// Page-space point for a pixel position on the current page.
    fn point(&self, height_pt: f64, p: PointPx) -> (f64, f64) {
        (self.pt(p.x), height_pt - self.pt(p.y))
    }

    fn font_resource(&mut self, index: usize) -> Result<String, EtiquetaError> {
        let id = match self.font_ids.get(&index) {
            Some(id) => *id,
            None => {
                let id = self.doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => STANDARD_FONTS[index],
                    "Encoding" => "WinAnsiEncoding",
                });
                self.font_ids.insert(index, id);
                id
            }
        };
        let name = format!("F{}", index);
        self.page()?.fonts.insert(name.clone(), id);
        Ok(name)
    }

    /// Push a `gs` op when either alpha is partial. Callers wrap it in `q`/`Q`.
    fn apply_alpha(&mut self, stroke_alpha: u8, fill_alpha: u8) -> Result<(), EtiquetaError> {
        if stroke_alpha == 255 && fill_alpha == 255 {
            return Ok(());
        }
        let name = format!("GS{}_{}", stroke_alpha, fill_alpha);
        let page = self.page()?;
        page.ext_gstates.entry(name.clone()).or_insert_with(|| {
            dictionary! {
                "Type" => "ExtGState",
                "CA" => stroke_alpha as f64 / 255.0,
                "ca" => fill_alpha as f64 / 255.0,
            }
        });
        page.ops.push(Operation::new("gs", vec![name.as_str().into()]));
        Ok(())
    }

    /// Paint a path with optional stroke and fill.
    fn paint(
        &mut self,
        path: Vec<Operation>,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    ) -> Result<(), EtiquetaError> {
        let fill = fill.filter(|c| !c.is_transparent());
        let paint_op = match (stroke.is_some(), fill.is_some()) {
            (true, true) => "B",
            (true, false) => "S",
            (false, true) => "f",
            (false, false) => return Ok(()),
        };

        let stroke_width_pt = stroke.map(|s| self.pt(s.width_px));
        self.page()?.ops.push(Operation::new("q", vec![]));
        self.apply_alpha(
            stroke.map_or(255, |s| s.color.a),
            fill.map_or(255, |c| c.a),
        )?;

        let page = self.page()?;
        if let (Some(s), Some(width)) = (stroke, stroke_width_pt) {
            let [r, g, b] = s.color.unit_rgb();
            page.ops.push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
            page.ops.push(Operation::new("w", vec![width.into()]));
        }
        if let Some(c) = fill {
            let [r, g, b] = c.unit_rgb();
            page.ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        }
        page.ops.extend(path);
        page.ops.push(Operation::new(paint_op, vec![]));
        page.ops.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn flush_page(&mut self) -> Result<(), EtiquetaError> {
        let Some(page) = self.current.take() else {
            return Ok(());
        };

        let content = Content {
            operations: page.ops,
        }
        .encode()?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let mut resources = Dictionary::new();
        if !page.fonts.is_empty() {
            let mut fonts = Dictionary::new();
            for (name, id) in page.fonts {
                fonts.set(name, id);
            }
            resources.set("Font", fonts);
        }
        if !page.xobjects.is_empty() {
            let mut xobjects = Dictionary::new();
            for (name, id) in page.xobjects {
                xobjects.set(name, id);
            }
            resources.set("XObject", xobjects);
        }
        if !page.ext_gstates.is_empty() {
            let mut states = Dictionary::new();
            for (name, state) in page.ext_gstates {
                states.set(name, state);
            }
            resources.set("ExtGState", states);
        }

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page.width_pt.into(), page.height_pt.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.page_ids.push(page_id);
        Ok(())
    }
}

fn rect_path(x: f64, y: f64, w: f64, h: f64) -> Vec<Operation> {
    vec![Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()])]
}

/// Rounded rectangle path; `(x, y)` is the bottom-left corner in page space.
fn rounded_rect_path(x: f64, y: f64, w: f64, h: f64, r: f64) -> Vec<Operation> {
    let r = r.min(w / 2.0).min(h / 2.0);
    let k = r * KAPPA;
    let (x1, y1) = (x + w, y + h);
    let curve = |c1x: f64, c1y: f64, c2x: f64, c2y: f64, ex: f64, ey: f64| {
        Operation::new(
            "c",
            vec![c1x.into(), c1y.into(), c2x.into(), c2y.into(), ex.into(), ey.into()],
        )
    };
    vec![
        Operation::new("m", vec![(x + r).into(), y.into()]),
        Operation::new("l", vec![(x1 - r).into(), y.into()]),
        curve(x1 - r + k, y, x1, y + r - k, x1, y + r),
        Operation::new("l", vec![x1.into(), (y1 - r).into()]),
        curve(x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1),
        Operation::new("l", vec![(x + r).into(), y1.into()]),
        curve(x + r - k, y1, x, y1 - r + k, x, y1 - r),
        Operation::new("l", vec![x.into(), (y + r).into()]),
        curve(x, y + r - k, x + r - k, y, x + r, y),
        Operation::new("h", vec![]),
    ]
}

/// Ellipse path inscribed in a page-space box with bottom-left `(x, y)`.
fn ellipse_path(x: f64, y: f64, w: f64, h: f64) -> Vec<Operation> {
    let (rx, ry) = (w / 2.0, h / 2.0);
    let (cx, cy) = (x + rx, y + ry);
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let curve = |pts: [f64; 6]| Operation::new("c", pts.iter().map(|v| (*v).into()).collect());
    vec![
        Operation::new("m", vec![(cx + rx).into(), cy.into()]),
        curve([cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry]),
        curve([cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy]),
        curve([cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry]),
        curve([cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy]),
        Operation::new("h", vec![]),
    ]
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, EtiquetaError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn image_stream(
    width: u32,
    height: u32,
    color_space: &str,
    data: &[u8],
) -> Result<Stream, EtiquetaError> {
    Ok(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Interpolate" => false,
            "Filter" => "FlateDecode",
        },
        deflate(data)?,
    )
    .with_compression(false))
}

impl Surface for PdfSurface {
    fn new_page(&mut self, width_pt: f64, height_pt: f64) -> Result<(), EtiquetaError> {
        if self.finished {
            return Err(EtiquetaError::Pdf("surface already finished".into()));
        }
        self.flush_page()?;
        self.current = Some(PageState {
            width_pt: width_pt.max(1.0),
            height_pt: height_pt.max(1.0),
            ops: Vec::new(),
            fonts: BTreeMap::new(),
            xobjects: BTreeMap::new(),
            ext_gstates: BTreeMap::new(),
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        font: &Font,
        color: Rgba,
        rect: RectPx,
        align: TextAlign,
    ) -> Result<(), EtiquetaError> {
        if text.is_empty() || color.is_transparent() || font.size_px <= 0.0 {
            return Ok(());
        }
        let font_name = self.font_resource(standard_font(font))?;
        let height_pt = self.page()?.height_pt;
        let size_pt = self.pt(font.size_px);
        let lines: Vec<&str> = text.lines().collect();

        let block_height = font.size_px * LINE_HEIGHT * lines.len() as f64;
        let top = match align {
            TextAlign::Center => rect.y + (rect.height - block_height) / 2.0,
            TextAlign::TopLeft | TextAlign::TopCenter => rect.y,
        };

        let mut ops = vec![Operation::new("BT", vec![])];
        ops.push(Operation::new("Tf", vec![font_name.as_str().into(), size_pt.into()]));
        let [r, g, b] = color.unit_rgb();
        ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        for (i, line) in lines.iter().enumerate() {
            let left = match align {
                TextAlign::TopLeft => rect.x,
                TextAlign::TopCenter | TextAlign::Center => {
                    rect.x + (rect.width - estimate_text_width(line, font.size_px)) / 2.0
                }
            };
            let baseline = top + font.size_px * (ASCENT + LINE_HEIGHT * i as f64);
            let (x, y) = self.point(height_pt, PointPx::new(left, baseline));
            ops.push(Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(encode_text(line), StringFormat::Literal)],
            ));
        }
        ops.push(Operation::new("ET", vec![]));

        self.page()?.ops.push(Operation::new("q", vec![]));
        self.apply_alpha(255, color.a)?;
        let page = self.page()?;
        page.ops.extend(ops);
        page.ops.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: PointPx,
        to: PointPx,
        stroke: Stroke,
    ) -> Result<(), EtiquetaError> {
        let height_pt = self.page()?.height_pt;
        let (x0, y0) = self.point(height_pt, from);
        let (x1, y1) = self.point(height_pt, to);
        let path = vec![
            Operation::new("m", vec![x0.into(), y0.into()]),
            Operation::new("l", vec![x1.into(), y1.into()]),
        ];
        self.paint(path, Some(stroke), None)
    }

    fn draw_rect(
        &mut self,
        rect: RectPx,
        corner_radius_px: f64,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    ) -> Result<(), EtiquetaError> {
        let height_pt = self.page()?.height_pt;
        let (x, y) = self.point(height_pt, PointPx::new(rect.x, rect.bottom()));
        let (w, h) = (self.pt(rect.width), self.pt(rect.height));
        let path = if corner_radius_px > 0.0 {
            rounded_rect_path(x, y, w, h, self.pt(corner_radius_px))
        } else {
            rect_path(x, y, w, h)
        };
        self.paint(path, stroke, fill)
    }

    fn draw_ellipse(
        &mut self,
        rect: RectPx,
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    ) -> Result<(), EtiquetaError> {
        let height_pt = self.page()?.height_pt;
        let (x, y) = self.point(height_pt, PointPx::new(rect.x, rect.bottom()));
        let path = ellipse_path(x, y, self.pt(rect.width), self.pt(rect.height));
        self.paint(path, stroke, fill)
    }

    fn draw_polygon(
        &mut self,
        points: &[PointPx],
        stroke: Option<Stroke>,
        fill: Option<Rgba>,
    ) -> Result<(), EtiquetaError> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        let height_pt = self.page()?.height_pt;
        let (x, y) = self.point(height_pt, *first);
        let mut path = vec![Operation::new("m", vec![x.into(), y.into()])];
        for p in rest {
            let (x, y) = self.point(height_pt, *p);
            path.push(Operation::new("l", vec![x.into(), y.into()]));
        }
        path.push(Operation::new("h", vec![]));
        self.paint(path, stroke, fill)
    }

    fn draw_image(
        &mut self,
        rect: RectPx,
        image: &image::DynamicImage,
    ) -> Result<(), EtiquetaError> {
        let height_pt = self.page()?.height_pt;
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 || rect.width <= 0.0 || rect.height <= 0.0 {
            return Ok(());
        }

        let mut stream = match image {
            image::DynamicImage::ImageLuma8(gray) => {
                image_stream(width, height, "DeviceGray", gray.as_raw())?
            }
            other if other.color().has_alpha() => {
                let rgba = other.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                let mut alpha = Vec::with_capacity((width * height) as usize);
                for px in rgba.pixels() {
                    rgb.extend_from_slice(&px.0[..3]);
                    alpha.push(px.0[3]);
                }
                let mask_id = self
                    .doc
                    .add_object(image_stream(width, height, "DeviceGray", &alpha)?);
                let mut stream = image_stream(width, height, "DeviceRGB", &rgb)?;
                stream.dict.set("SMask", mask_id);
                stream
            }
            other => image_stream(width, height, "DeviceRGB", other.to_rgb8().as_raw())?,
        };
        // Grayscale rasters are barcodes and stay crisp
        if !matches!(image, image::DynamicImage::ImageLuma8(_)) {
            stream.dict.set("Interpolate", true);
        }
        let image_id = self.doc.add_object(stream);

        let name = format!("Im{}", self.image_count);
        self.image_count += 1;

        let (x, y) = self.point(height_pt, PointPx::new(rect.x, rect.bottom()));
        let (w, h) = (self.pt(rect.width), self.pt(rect.height));
        let page = self.page()?;
        page.xobjects.insert(name.clone(), image_id);
        page.ops.push(Operation::new("q", vec![]));
        page.ops.push(Operation::new(
            "cm",
            vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
        ));
        page.ops.push(Operation::new("Do", vec![name.as_str().into()]));
        page.ops.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, EtiquetaError> {
        if self.finished {
            return Err(EtiquetaError::Pdf("surface already finished".into()));
        }
        self.flush_page()?;
        if self.page_ids.is_empty() {
            return Err(EtiquetaError::Pdf("document has no pages".into()));
        }
        self.finished = true;

        let kids: Vec<Object> = self.page_ids.iter().map(|id| (*id).into()).collect();
        let count = kids.len() as i64;
        self.doc.set_object(
            self.pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            },
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let date = chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string();
        let mut info = dictionary! {
            "Producer" => Object::string_literal("etiqueta"),
            "CreationDate" => Object::string_literal(date),
        };
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", info_id);

        self.doc.compress();
        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        log::debug!("pdf finished: {} page(s), {} bytes", count, buffer.len());
        Ok(buffer)
    }
}
