//! Grid packing of identical labels onto a fixed-size sheet.
//!
//! Each label occupies a cell of `label + 2 * padding` in both directions.
//! Cells are laid out in a grid starting at the sheet origin, without
//! rotation. No trailing padding is required after the last cell.

use serde::{Deserialize, Serialize};

/// How many labels fit on a sheet, and how much of it they use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PackingLayout {
    pub images_per_row: u64,
    pub images_per_column: u64,
    pub total_images: u64,
    pub effective_cell_width: u64,
    pub effective_cell_height: u64,
    pub used_width: u64,
    pub used_height: u64,
    /// Share of the sheet area covered by cells, rounded to 2 decimals
    pub efficiency_percent: f64,
}

impl PackingLayout {
    /// Cell origins plus `padding`, row-major: every column of row 0, then row 1.
    pub fn placements(&self, padding: i64) -> impl Iterator<Item = (i64, i64)> + '_ {
        (0..self.images_per_column).flat_map(move |row| {
            (0..self.images_per_row).map(move |col| {
                (
                    (col * self.effective_cell_width) as i64 + padding,
                    (row * self.effective_cell_height) as i64 + padding,
                )
            })
        })
    }
}

/// Compute the grid capacity of a sheet for one label size.
///
/// Degenerate inputs (negative padding, zero-sized cells or sheet, a label
/// wider than the sheet) give zero capacity rather than an error.
pub fn calculate_capacity(
    label_width: u32,
    label_height: u32,
    sheet_width: u32,
    sheet_height: u32,
    padding: i64,
) -> PackingLayout {
    let cell = |side: u32| (side as i64).saturating_add(padding.saturating_mul(2)).max(0) as u64;
    let effective_cell_width = cell(label_width);
    let effective_cell_height = cell(label_height);

    let fits = |sheet: u32, cell: u64| {
        if padding < 0 || cell == 0 {
            0
        } else {
            sheet as u64 / cell
        }
    };
    let images_per_row = fits(sheet_width, effective_cell_width);
    let images_per_column = fits(sheet_height, effective_cell_height);
    let total_images = images_per_row * images_per_column;

    let sheet_area = sheet_width as f64 * sheet_height as f64;
    let efficiency_percent = if sheet_area > 0.0 {
        let used_area =
            total_images as f64 * effective_cell_width as f64 * effective_cell_height as f64;
        round2(used_area / sheet_area * 100.0)
    } else {
        0.0
    };

    PackingLayout {
        images_per_row,
        images_per_column,
        total_images,
        effective_cell_width,
        effective_cell_height,
        used_width: images_per_row * effective_cell_width,
        used_height: images_per_column * effective_cell_height,
        efficiency_percent,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
