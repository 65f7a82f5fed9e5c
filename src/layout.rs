//! # Layout and Pagination
//!
//! Decides where each label lands before anything is drawn.
//!
//! Single mode produces one placement at the origin of page 0. Batch mode
//! flows fixed-size tiles row-major across a sheet:
//!
//! ```text
//! page 0                          page 1
//! ┌──────────────────────┐        ┌──────────────────────┐
//! │ [0] [1] [2] [3] [4]  │        │ [n] [n+1] ...        │
//! │ [5] [6] [7] [8] [9]  │        │                      │
//! │ ...                  │        │                      │
//! └──────────────────────┘        └──────────────────────┘
//!       ↑ margin between tiles, none at the sheet edge
//! ```
//!
//! All coordinates are device pixels at the template DPI.

use crate::template::Template;

/// Where one label copy is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub page_index: usize,
    pub offset_x_px: f64,
    pub offset_y_px: f64,
}

impl TilePlacement {
    pub const ORIGIN: Self = Self {
        page_index: 0,
        offset_x_px: 0.0,
        offset_y_px: 0.0,
    };
}

/// Scale and resolution shared by every element of one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub dpi: u32,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl RenderContext {
    /// Unscaled drawing at the template's own DPI.
    pub fn single(template: &Template) -> Self {
        Self {
            dpi: template.dpi.max(1),
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Scale the template canvas to fill one batch tile.
    pub fn for_tile(template: &Template, tile_width_px: f64, tile_height_px: f64) -> Self {
        let canvas_w = template.canvas_width_px().max(1.0);
        let canvas_h = template.canvas_height_px().max(1.0);
        Self {
            dpi: template.dpi.max(1),
            scale_x: tile_width_px.max(1.0) / canvas_w,
            scale_y: tile_height_px.max(1.0) / canvas_h,
        }
    }

    /// Factor for lengths without a direction (stroke widths, radii).
    pub fn uniform_scale(&self) -> f64 {
        self.scale_x.min(self.scale_y)
    }
}

/// Placement for single mode.
pub fn single() -> Vec<TilePlacement> {
    vec![TilePlacement::ORIGIN]
}

/// Row-major tile flow across fixed-size pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowLayout {
    pub tile_width_px: f64,
    pub tile_height_px: f64,
    pub margin_px: f64,
    pub page_width_px: f64,
    pub page_height_px: f64,
}

impl FlowLayout {
    /// Tile and page sizes are clamped to at least 1px, margin to 0.
    pub fn new(
        tile_width_px: f64,
        tile_height_px: f64,
        margin_px: f64,
        page_width_px: f64,
        page_height_px: f64,
    ) -> Self {
        let at_least_one = |v: f64| if v.is_finite() { v.max(1.0) } else { 1.0 };
        Self {
            tile_width_px: at_least_one(tile_width_px),
            tile_height_px: at_least_one(tile_height_px),
            margin_px: if margin_px.is_finite() { margin_px.max(0.0) } else { 0.0 },
            page_width_px: at_least_one(page_width_px),
            page_height_px: at_least_one(page_height_px),
        }
    }

    /// Place `count` tiles in order.
    ///
    /// A tile that overflows an empty page or an empty row stays where it
    /// is, so oversized tiles get one page each instead of looping.
    pub fn place(&self, count: usize) -> Vec<TilePlacement> {
        let mut placements = Vec::with_capacity(count);
        let mut page = 0usize;
        let (mut x, mut y) = (0.0f64, 0.0f64);
        let mut page_used = false;

        for _ in 0..count {
            if page_used && y + self.tile_height_px > self.page_height_px {
                page += 1;
                x = 0.0;
                y = 0.0;
                page_used = false;
            }
            if x > 0.0 && x + self.tile_width_px > self.page_width_px {
                x = 0.0;
                y += self.tile_height_px + self.margin_px;
                if y + self.tile_height_px > self.page_height_px {
                    page += 1;
                    y = 0.0;
                    page_used = false;
                }
            }

            placements.push(TilePlacement {
                page_index: page,
                offset_x_px: x,
                offset_y_px: y,
            });
            if !page_used {
                log::debug!("page {} starts with tile {}", page, placements.len() - 1);
            }
            page_used = true;
            x += self.tile_width_px + self.margin_px;
        }
        placements
    }
}

/// Number of pages a placement list needs; 1 when empty.
pub fn page_count(placements: &[TilePlacement]) -> usize {
    placements.last().map_or(1, |p| p.page_index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4_at_300() -> FlowLayout {
        FlowLayout::new(150.0, 100.0, 10.0, 2480.0, 3508.0)
    }

    #[test]
    fn test_single_is_origin() {
        assert_eq!(single(), vec![TilePlacement::ORIGIN]);
        assert_eq!(page_count(&single()), 1);
    }

    #[test]
    fn test_forty_tiles_fit_one_page() {
        let placements = a4_at_300().place(40);
        assert_eq!(placements.len(), 40);
        assert_eq!(page_count(&placements), 1);

        assert_eq!(placements[0], TilePlacement::ORIGIN);
        // 15 tiles per row: 14 * 160 + 150 = 2390 <= 2480
        assert_eq!(placements[14].offset_x_px, 2240.0);
        assert_eq!(placements[14].offset_y_px, 0.0);
        assert_eq!(placements[15].offset_x_px, 0.0);
        assert_eq!(placements[15].offset_y_px, 110.0);
        assert_eq!(
            placements[39],
            TilePlacement {
                page_index: 0,
                offset_x_px: 1440.0,
                offset_y_px: 220.0
            }
        );
    }

    #[test]
    fn test_layout_is_deterministic() {
        assert_eq!(a4_at_300().place(40), a4_at_300().place(40));
    }

    #[test]
    fn test_page_break() {
        // 31 rows of 15: the 466th tile starts page 1
        let placements = a4_at_300().place(466);
        assert_eq!(
            placements[464],
            TilePlacement {
                page_index: 0,
                offset_x_px: 2240.0,
                offset_y_px: 3300.0
            }
        );
        assert_eq!(placements[465], TilePlacement {
            page_index: 1,
            ..TilePlacement::ORIGIN
        });
        assert_eq!(page_count(&placements), 2);
    }

    #[test]
    fn test_no_rows_is_one_page() {
        assert!(a4_at_300().place(0).is_empty());
        assert_eq!(page_count(&[]), 1);
    }

    #[test]
    fn test_oversized_tile_one_per_page() {
        let layout = FlowLayout::new(500.0, 500.0, 10.0, 200.0, 200.0);
        let placements = layout.place(3);
        let pages: Vec<usize> = placements.iter().map(|p| p.page_index).collect();
        assert_eq!(pages, vec![0, 1, 2]);
        assert!(placements.iter().all(|p| p.offset_x_px == 0.0 && p.offset_y_px == 0.0));
    }

    #[test]
    fn test_clamps_degenerate_sizes() {
        let layout = FlowLayout::new(0.0, -3.0, -1.0, 0.0, f64::NAN);
        assert_eq!(layout.tile_width_px, 1.0);
        assert_eq!(layout.tile_height_px, 1.0);
        assert_eq!(layout.margin_px, 0.0);
        assert_eq!(layout.page_height_px, 1.0);
        assert_eq!(layout.place(2).len(), 2);
    }

    #[test]
    fn test_tile_context_scales_canvas() {
        let template = Template {
            canvas_width_mm: 25.4,
            canvas_height_mm: 25.4,
            dpi: 300,
            ..Default::default()
        };
        let ctx = RenderContext::for_tile(&template, 150.0, 100.0);
        assert!((ctx.scale_x - 0.5).abs() < 1e-9);
        assert!((ctx.scale_y - 100.0 / 300.0).abs() < 1e-9);
        assert_eq!(RenderContext::single(&template).scale_x, 1.0);
    }
}
