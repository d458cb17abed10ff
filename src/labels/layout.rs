use crate::Result;
use anyhow::ensure;
use serde::{Deserialize, Serialize};

/// Geometry of a label sheet. All lengths are millimetres, the font size is points. The defaults
/// describe an A4 sheet of 2×5 cards of 99×55 mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub label_width_mm: f32,
    pub label_height_mm: f32,
    pub top_margin_mm: f32,
    pub side_margin_mm: f32,
    pub column_gap_mm: f32,
    pub logo_height_mm: f32,
    pub font_size_pt: f32,
    pub columns: usize,
    pub rows: usize,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            label_width_mm: 99.0,
            label_height_mm: 55.0,
            top_margin_mm: 10.0,
            side_margin_mm: 5.0,
            column_gap_mm: 3.0,
            logo_height_mm: 14.9,
            font_size_pt: 11.0,
            columns: 2,
            rows: 5,
        }
    }
}

/// Where one label goes. `x_mm`/`y_mm` is the bottom-left corner of the card, measured from the
/// bottom-left corner of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page: usize,
    pub column: usize,
    pub row: usize,
    pub x_mm: f32,
    pub y_mm: f32,
}

impl Placement {
    /// True for the first card of a page, where the vertical position starts over at the top.
    pub fn starts_page(&self) -> bool {
        self.column == 0 && self.row == 0
    }
}

impl LabelLayout {
    /// Rejects layouts that cannot hold a single label.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.columns > 0 && self.rows > 0,
            "A label layout needs at least one column and one row, got {}x{}",
            self.columns,
            self.rows
        );
        ensure!(
            self.label_width_mm > 0.0 && self.label_height_mm > 0.0,
            "Label size must be positive, got {}x{} mm",
            self.label_width_mm,
            self.label_height_mm
        );
        ensure!(
            self.logo_height_mm < self.label_height_mm,
            "The logo ({} mm) must be shorter than the label ({} mm)",
            self.logo_height_mm,
            self.label_height_mm
        );
        Ok(())
    }

    pub fn per_page(&self) -> usize {
        self.columns * self.rows
    }

    /// Number of pages needed for `count` labels. An empty run still has one page.
    pub fn pages(&self, count: usize) -> usize {
        count.div_ceil(self.per_page()).max(1)
    }

    /// Horizontal distance between the left edges of neighboring columns. The usable width is
    /// split evenly, so with the defaults the second column starts just right of the page center.
    fn column_pitch(&self) -> f32 {
        (self.page_width_mm - 2.0 * self.side_margin_mm + self.column_gap_mm) / self.columns as f32
    }

    /// Places `count` labels in reading order: left to right, then top to bottom, starting a new
    /// page after every `per_page()` labels.
    pub fn place(&self, count: usize) -> Vec<Placement> {
        let per_page = self.per_page();
        let pitch = self.column_pitch();
        let top = self.page_height_mm - self.top_margin_mm;
        (0..count)
            .map(|ix| {
                let slot = ix % per_page;
                let column = slot % self.columns;
                let row = slot / self.columns;
                Placement {
                    page: ix / per_page,
                    column,
                    row,
                    x_mm: self.side_margin_mm + column as f32 * pitch,
                    y_mm: top - (row + 1) as f32 * self.label_height_mm,
                }
            })
            .collect()
    }
}
