//! # Barcode Encoding
//!
//! Turns a value and a symbology into a monochrome [`Raster`] sized for a
//! destination rectangle.
//!
//! ## Symbologies
//!
//! | Name(s) | Symbology | Backend |
//! |---------|-----------|---------|
//! | `code128` (default) | Code 128, set B | barcoders |
//! | `code39` | Code 39 | barcoders |
//! | `ean13` | EAN-13 | barcoders |
//! | `ean8` | EAN-8 | barcoders |
//! | `upca`, `upc` | UPC-A (as EAN-13 with a leading 0) | barcoders |
//! | `upce` | UPC-E | [`upce`] |
//! | `itf14`, `itf` | ITF-14 (interleaved 2 of 5) | barcoders |
//! | `qr`, `qrcode` | QR Code | qrcode |
//!
//! ## Sizing
//!
//! Each module is drawn as a whole number of pixels. The encoder picks the
//! largest multiple that fits the requested width (at least 1) and centers
//! the symbol, so the raster is never narrower than requested and only
//! wider when the symbol cannot fit at one pixel per module. Requests
//! above [`MAX_RASTER_PIXELS`] are refused with an encoding error.

mod upce;

use crate::error::EtiquetaError;

use barcoders::sym::code39::Code39;
use barcoders::sym::code128::Code128;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::tf::TF;

/// Largest raster the encoder will allocate.
pub const MAX_RASTER_PIXELS: usize = 1 << 25;

/// Supported barcode symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Symbology {
    #[default]
    Code128,
    Code39,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Itf14,
    Qr,
}

impl Symbology {
    /// Parse a designer barcode type. Unknown names fall back to Code 128.
    pub fn parse(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "code39" => Self::Code39,
            "ean13" => Self::Ean13,
            "ean8" => Self::Ean8,
            "upca" | "upc" => Self::UpcA,
            "upce" => Self::UpcE,
            "itf14" | "itf" => Self::Itf14,
            "qr" | "qrcode" => Self::Qr,
            _ => Self::Code128,
        }
    }

    /// Two-dimensional symbols carry no human-readable caption.
    pub fn is_2d(self) -> bool {
        matches!(self, Self::Qr)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Code128 => "CODE128",
            Self::Code39 => "CODE39",
            Self::Ean13 => "EAN13",
            Self::Ean8 => "EAN8",
            Self::UpcA => "UPC-A",
            Self::UpcE => "UPC-E",
            Self::Itf14 => "ITF-14",
            Self::Qr => "QR",
        }
    }
}

// ============================================================================
// RASTER
// ============================================================================

/// A monochrome bitmap; `true` is a dark module pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pixels: Vec<bool>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = true;
        }
    }

    /// 8-bit grayscale copy: dark → 0, light → 255.
    pub fn to_luma8(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Luma([if self.is_dark(x as usize, y as usize) {
                0
            } else {
                255
            }])
        })
    }

    /// Stretch a row of modules across the full raster height.
    fn from_modules(modules: &[u8], width: usize, height: usize) -> Self {
        let count = modules.len().max(1);
        let mult = (width / count).max(1);
        let out_width = width.max(count * mult);
        let height = height.max(1);
        let left = (out_width - modules.len() * mult) / 2;

        let mut raster = Self::new(out_width, height);
        for (i, &module) in modules.iter().enumerate() {
            if module != 1 {
                continue;
            }
            for dx in 0..mult {
                let x = left + i * mult + dx;
                for y in 0..height {
                    raster.set(x, y);
                }
            }
        }
        raster
    }
}

// ============================================================================
// ENCODER
// ============================================================================

/// Produces barcode rasters.
pub trait BarcodeEncoder {
    /// Encode `value` to a raster at least `width` × `height` pixels.
    fn encode(
        &self,
        value: &str,
        symbology: Symbology,
        width: usize,
        height: usize,
    ) -> Result<Raster, EtiquetaError>;
}

/// The built-in encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolEncoder;

impl BarcodeEncoder for SymbolEncoder {
    fn encode(
        &self,
        value: &str,
        symbology: Symbology,
        width: usize,
        height: usize,
    ) -> Result<Raster, EtiquetaError> {
        if value.is_empty() {
            return Err(encoding_error(symbology, "empty value"));
        }
        let (width, height) = (width.max(1), height.max(1));
        if width.checked_mul(height).is_none_or(|px| px > MAX_RASTER_PIXELS) {
            return Err(encoding_error(
                symbology,
                format!("raster {}x{} exceeds {} pixels", width, height, MAX_RASTER_PIXELS),
            ));
        }

        if symbology == Symbology::Qr {
            return encode_qr(value, width, height);
        }

        let modules = linear_modules(value, symbology)?;
        Ok(Raster::from_modules(&modules, width, height))
    }
}

fn encoding_error(symbology: Symbology, detail: impl std::fmt::Display) -> EtiquetaError {
    EtiquetaError::Encoding(format!("{}: {}", symbology.name(), detail))
}

/// Module pattern (1 = bar) for a one-dimensional symbology.
fn linear_modules(value: &str, symbology: Symbology) -> Result<Vec<u8>, EtiquetaError> {
    let err = |e: barcoders::error::Error| encoding_error(symbology, format!("{:?}", e));
    match symbology {
        Symbology::Code128 => {
            if !value.chars().all(|c| (' '..='~').contains(&c)) {
                return Err(encoding_error(symbology, "value must be printable ASCII"));
            }
            // Character set B covers all printable ASCII
            Ok(Code128::new(format!("\u{0181}{}", value)).map_err(err)?.encode())
        }
        Symbology::Code39 => Ok(Code39::new(value).map_err(err)?.encode()),
        Symbology::Ean13 => {
            let body = gtin_body(value, 13, symbology)?;
            Ok(EAN13::new(body).map_err(err)?.encode())
        }
        Symbology::Ean8 => {
            let body = gtin_body(value, 8, symbology)?;
            Ok(EAN8::new(body).map_err(err)?.encode())
        }
        Symbology::UpcA => {
            let body = gtin_body(value, 12, symbology)?;
            // UPC-A is EAN-13 with number system 0
            Ok(EAN13::new(format!("0{}", body)).map_err(err)?.encode())
        }
        Symbology::UpcE => upce::modules(value).map_err(|e| encoding_error(symbology, e)),
        Symbology::Itf14 => {
            let body = gtin_body(value, 14, symbology)?;
            let digits = parse_digits(&body).unwrap_or_default();
            // 14 digits with the check appended, so barcoders adds none
            let full = format!("{}{}", body, gtin_check_digit(&digits));
            Ok(TF::interleaved(full).map_err(err)?.encode())
        }
        Symbology::Qr => Err(encoding_error(symbology, "not a linear symbology")),
    }
}

/// Validate a GTIN-style value of `full_len` digits (with check digit) or
/// `full_len - 1` digits (without), returning the digits without the check.
fn gtin_body(value: &str, full_len: usize, symbology: Symbology) -> Result<String, EtiquetaError> {
    let digits = parse_digits(value)
        .ok_or_else(|| encoding_error(symbology, "value must contain only digits"))?;

    if digits.len() == full_len - 1 {
        return Ok(value.to_string());
    }
    if digits.len() != full_len {
        return Err(encoding_error(
            symbology,
            format!("expected {} or {} digits, got {}", full_len - 1, full_len, digits.len()),
        ));
    }

    let (body, check) = digits.split_at(full_len - 1);
    if gtin_check_digit(body) != check[0] {
        return Err(encoding_error(symbology, "check digit mismatch"));
    }
    Ok(value[..full_len - 1].to_string())
}

fn parse_digits(value: &str) -> Option<Vec<u8>> {
    if value.is_empty() {
        return None;
    }
    value
        .chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect()
}

/// Mod-10 check digit with 3,1 weights from the right.
pub(crate) fn gtin_check_digit(body: &[u8]) -> u8 {
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

fn encode_qr(value: &str, width: usize, height: usize) -> Result<Raster, EtiquetaError> {
    use qrcode::QrCode;

    let code =
        QrCode::new(value.as_bytes()).map_err(|e| encoding_error(Symbology::Qr, e))?;
    let size = code.width();
    let mult = (width.min(height) / size).max(1);
    let side = size * mult;
    let out_w = width.max(side);
    let out_h = height.max(side);
    let left = (out_w - side) / 2;
    let top = (out_h - side) / 2;

    let mut raster = Raster::new(out_w, out_h);
    for qy in 0..size {
        for qx in 0..size {
            if code[(qx, qy)] != qrcode::Color::Dark {
                continue;
            }
            for cy in 0..mult {
                for cx in 0..mult {
                    raster.set(left + qx * mult + cx, top + qy * mult + cy);
                }
            }
        }
    }
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &str, sym: Symbology) -> Result<Raster, EtiquetaError> {
        SymbolEncoder.encode(value, sym, 300, 80)
    }

    fn dark_columns(raster: &Raster) -> usize {
        (0..raster.width).filter(|&x| raster.is_dark(x, 0)).count()
    }

    #[test]
    fn test_symbology_parse() {
        assert_eq!(Symbology::parse("EAN13"), Symbology::Ean13);
        assert_eq!(Symbology::parse("upc-a"), Symbology::UpcA);
        assert_eq!(Symbology::parse("UPC_E"), Symbology::UpcE);
        assert_eq!(Symbology::parse("QRCode"), Symbology::Qr);
        assert_eq!(Symbology::parse("pdf417"), Symbology::Code128);
        assert_eq!(Symbology::parse(""), Symbology::Code128);
    }

    #[test]
    fn test_code128_fills_requested_size() {
        let raster = encode("ABC-001", Symbology::Code128).unwrap();
        assert_eq!(raster.width, 300);
        assert_eq!(raster.height, 80);
        assert!(dark_columns(&raster) > 0);
        // Quiet edges: the symbol is centered
        assert!(!raster.is_dark(0, 0));
    }

    #[test]
    fn test_narrow_request_grows_to_one_pixel_modules() {
        let raster = SymbolEncoder.encode("ABC-001", Symbology::Code128, 10, 5).unwrap();
        assert!(raster.width > 10);
        assert_eq!(raster.height, 5);
    }

    #[test]
    fn test_code128_rejects_non_ascii() {
        assert!(matches!(
            encode("café", Symbology::Code128),
            Err(EtiquetaError::Encoding(_))
        ));
    }

    #[test]
    fn test_ean13_with_and_without_check_digit() {
        let with = encode("4006381333931", Symbology::Ean13).unwrap();
        let without = encode("400638133393", Symbology::Ean13).unwrap();
        assert_eq!(with, without);
        assert!(encode("4006381333932", Symbology::Ean13).is_err());
    }

    #[test]
    fn test_ean8() {
        assert!(encode("9638507", Symbology::Ean8).is_ok());
        assert!(encode("96385074", Symbology::Ean8).is_ok());
        assert!(encode("96385075", Symbology::Ean8).is_err());
    }

    #[test]
    fn test_upca() {
        assert!(encode("036000291452", Symbology::UpcA).is_ok());
        assert!(encode("03600029145", Symbology::UpcA).is_ok());
    }

    #[test]
    fn test_upca_rejects_letters() {
        let err = encode("ABC", Symbology::UpcA).unwrap_err();
        assert!(err.to_string().contains("UPC-A"));
    }

    #[test]
    fn test_upce() {
        assert!(encode("01234565", Symbology::UpcE).is_ok());
        assert!(encode("0123456", Symbology::UpcE).is_ok());
        assert!(encode("01234566", Symbology::UpcE).is_err());
    }

    #[test]
    fn test_legacy_designer_names() {
        assert_eq!(Symbology::parse("UPC"), Symbology::UpcA);
        assert_eq!(Symbology::parse("ITF14"), Symbology::Itf14);
        assert_eq!(Symbology::parse("itf"), Symbology::Itf14);
        assert!(!Symbology::Itf14.is_2d());
    }

    #[test]
    fn test_itf14() {
        let with = encode("15400141288763", Symbology::Itf14).unwrap();
        let without = encode("1540014128876", Symbology::Itf14).unwrap();
        assert_eq!(with, without);
        assert!(encode("15400141288764", Symbology::Itf14).is_err());
        assert!(encode("ABC", Symbology::Itf14).is_err());
    }

    #[test]
    fn test_oversized_request_is_refused() {
        let err = SymbolEncoder
            .encode("ABC", Symbology::Code128, 100_000, 100_000)
            .unwrap_err();
        assert!(matches!(err, EtiquetaError::Encoding(_)));
        assert!(SymbolEncoder
            .encode("ABC", Symbology::Qr, usize::MAX, 2)
            .is_err());
    }

    #[test]
    fn test_code39() {
        assert!(encode("CODE-39", Symbology::Code39).is_ok());
    }

    #[test]
    fn test_qr_is_square_and_centered() {
        let raster = SymbolEncoder.encode("https://example.com", Symbology::Qr, 200, 100).unwrap();
        assert_eq!((raster.width, raster.height), (200, 100));
        // Centered horizontally: nothing dark at the left edge
        let first_dark = (0..raster.width).find(|&x| raster.is_dark(x, raster.height / 2));
        assert!(first_dark.is_some_and(|x| x > 0));
    }

    #[test]
    fn test_empty_value_fails() {
        assert!(encode("", Symbology::Code128).is_err());
    }

    #[test]
    fn test_check_digit() {
        assert_eq!(gtin_check_digit(&[4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3]), 1);
        assert_eq!(gtin_check_digit(&[0, 3, 6, 0, 0, 0, 2, 9, 1, 4, 5]), 2);
    }

    #[test]
    fn test_luma_conversion() {
        let raster = encode("A", Symbology::Code128).unwrap();
        let img = raster.to_luma8();
        assert_eq!(img.width() as usize, raster.width);
        assert!(img.pixels().any(|p| p.0[0] == 0));
        assert!(img.pixels().any(|p| p.0[0] == 255));
    }
}
