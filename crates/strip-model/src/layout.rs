//! Fixed strip grid geometry.
//!
//! A strip is a 4×6 inch print at 300 DPI: a 1200×1800 canvas holding a
//! 2-column × 3-row grid with equal gaps around and between cells, plus an
//! extra margin at the bottom for the footer caption.

use serde::{Deserialize, Serialize};

/// Grid geometry of a strip, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub columns: u32,
    pub rows: u32,
    /// Gap between cells and around the grid edge.
    pub gap: u32,
    /// Extra space below the last row reserved for the footer.
    pub bottom_margin: u32,
}

/// An axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl StripLayout {
    /// The booth's print layout.
    pub const STANDARD: StripLayout = StripLayout {
        canvas_width: 1200,
        canvas_height: 1800,
        columns: 2,
        rows: 3,
        gap: 30,
        bottom_margin: 50,
    };

    /// Number of cells in the grid.
    pub fn capacity(&self) -> usize {
        (self.columns * self.rows) as usize
    }

    /// `(W − (cols + 1)·gap) / cols`
    pub fn cell_width(&self) -> f64 {
        let cols = self.columns as f64;
        (self.canvas_width as f64 - (cols + 1.0) * self.gap as f64) / cols
    }

    /// `(H − (rows + 1)·gap − bottom_margin) / rows`
    pub fn cell_height(&self) -> f64 {
        let rows = self.rows as f64;
        (self.canvas_height as f64 - (rows + 1.0) * self.gap as f64 - self.bottom_margin as f64)
            / rows
    }

    /// Row-major `(column, row)` of a cell index.
    pub fn grid_position(&self, index: usize) -> (usize, usize) {
        let cols = self.columns as usize;
        (index % cols, index / cols)
    }

    /// Rectangle of the cell at `index`, or `None` past the grid's capacity.
    pub fn cell(&self, index: usize) -> Option<CellRect> {
        if index >= self.capacity() {
            return None;
        }
        let (col, row) = self.grid_position(index);
        let gap = self.gap as f64;
        let w = self.cell_width();
        let h = self.cell_height();
        Some(CellRect {
            x: gap + col as f64 * (w + gap),
            y: gap + row as f64 * (h + gap),
            w,
            h,
        })
    }

    /// Caption anchor: horizontal centre and text baseline.
    pub fn footer_anchor(&self) -> (f64, f64) {
        (
            self.canvas_width as f64 / 2.0,
            self.canvas_height as f64 - self.bottom_margin as f64 / 2.0,
        )
    }
}

impl Default for StripLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl CellRect {
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Largest rectangle with the image's aspect ratio that fits inside this
    /// one, centred. Never crops.
    pub fn aspect_fit(&self, image_width: u32, image_height: u32) -> Option<CellRect> {
        if image_width == 0 || image_height == 0 {
            return None;
        }
        let scale = (self.w / image_width as f64).min(self.h / image_height as f64);
        let w = image_width as f64 * scale;
        let h = image_height as f64 * scale;
        Some(CellRect {
            x: self.x + (self.w - w) / 2.0,
            y: self.y + (self.h - h) / 2.0,
            w,
            h,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_standard_cell_geometry() {
        let layout = StripLayout::STANDARD;
        assert!((layout.cell_width() - 555.0).abs() < 1e-9);
        assert!((layout.cell_height() - 1630.0 / 3.0).abs() < 1e-9);
        assert_eq!(layout.capacity(), 6);
    }

    #[test]
    fn test_row_major_positions() {
        let layout = StripLayout::STANDARD;
        assert_eq!(layout.grid_position(0), (0, 0));
        assert_eq!(layout.grid_position(1), (1, 0));
        assert_eq!(layout.grid_position(4), (0, 2));
        assert_eq!(layout.grid_position(5), (1, 2));

        let last = layout.cell(5).unwrap();
        assert!((last.x - 615.0).abs() < 1e-9);
        assert!((last.bottom() - (1800.0 - 80.0)).abs() < 1e-6);
        assert!(layout.cell(6).is_none());
    }

    #[test]
    fn test_footer_anchor_sits_in_bottom_margin() {
        let (x, y) = StripLayout::STANDARD.footer_anchor();
        assert_eq!((x, y), (600.0, 1775.0));
    }

    #[test]
    fn test_square_image_is_bound_by_cell_height() {
        let cell = StripLayout::STANDARD.cell(0).unwrap();
        let fit = cell.aspect_fit(600, 600).unwrap();
        assert!((fit.h - cell.h).abs() < 1e-9);
        assert!((fit.w - cell.h).abs() < 1e-9);
        assert!((fit.y - cell.y).abs() < 1e-9);
        assert!((fit.x - (cell.x + (cell.w - fit.w) / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_wide_image_is_bound_by_cell_width() {
        let cell = StripLayout::STANDARD.cell(3).unwrap();
        let fit = cell.aspect_fit(1920, 1080).unwrap();
        assert!((fit.w - 555.0).abs() < 1e-9);
        assert!((fit.h - 555.0 * 1080.0 / 1920.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_image_has_no_fit() {
        let cell = StripLayout::STANDARD.cell(0).unwrap();
        assert!(cell.aspect_fit(0, 10).is_none());
    }

    proptest! {
        #[test]
        fn prop_cells_stay_inside_canvas(index in 0usize..6) {
            let layout = StripLayout::STANDARD;
            let cell = layout.cell(index).unwrap();
            prop_assert!(cell.x >= 0.0 && cell.y >= 0.0);
            prop_assert!(cell.right() <= layout.canvas_width as f64 + 1e-9);
            prop_assert!(cell.bottom() <= layout.canvas_height as f64 - layout.bottom_margin as f64);
        }

        #[test]
        fn prop_aspect_fit_never_exceeds_cell(w in 1u32..4000, h in 1u32..4000, index in 0usize..6) {
            let cell = StripLayout::STANDARD.cell(index).unwrap();
            let fit = cell.aspect_fit(w, h).unwrap();
            prop_assert!(fit.w <= cell.w + 1e-9);
            prop_assert!(fit.h <= cell.h + 1e-9);
            prop_assert!(fit.x >= cell.x - 1e-9 && fit.right() <= cell.right() + 1e-9);
            prop_assert!(fit.y >= cell.y - 1e-9 && fit.bottom() <= cell.bottom() + 1e-9);
            let ratio_in = w as f64 / h as f64;
            prop_assert!((fit.w / fit.h - ratio_in).abs() < 1e-6 * ratio_in.max(1.0));
        }
    }
}
