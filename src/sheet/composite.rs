//! # Composite Sheet Generator
//!
//! Tiles one unit label across a white print sheet as many times as the
//! [packing layout](super::packing) allows, then writes the sheet as PNG.
//!
//! ```text
//! (0,0)
//!   ┌─────────────────────────────── sheet ──┐
//!   │  pad                                   │
//!   │ pad ┌──────┐ pad pad ┌──────┐ pad      │
//!   │     │  #1  │         │  #2  │          │
//!   │     └──────┘         └──────┘          │
//!   │ pad ┌──────┐ pad pad ┌──────┐ pad      │
//!   │     │  #3  │         │  #4  │          │
//!   └────────────────────────────────────────┘
//! ```
//!
//! [`create_composite_sheet`] never returns an error: failures are reported
//! through [`CompositeReport::success`] and its message.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{MAX_SHEET_PIXELS, SheetSpec};
use crate::error::LabelError;
use crate::render::color::WHITE;
use crate::render::io::{encode_png, load_image, write_atomic};
use crate::render::surface::Surface;

use super::packing::{PackingLayout, calculate_capacity};

/// Geometry echoed back in a [`CompositeReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetDimensions {
    pub sheet_width: u32,
    pub sheet_height: u32,
    /// Zero when the unit label could not be loaded
    pub label_width: u32,
    pub label_height: u32,
    pub padding: i64,
}

/// Outcome of [`create_composite_sheet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeReport {
    pub success: bool,
    pub message: String,
    pub images_placed: u64,
    /// Absent on failure
    pub output_path: Option<PathBuf>,
    pub dimensions: SheetDimensions,
}

/// A tiled sheet held in memory.
#[derive(Debug, Clone)]
pub struct CompositeSheet {
    pub image: RgbaImage,
    pub images_placed: u64,
    pub layout: PackingLayout,
}

/// Tile `label` over a white sheet, row-major.
///
/// A copy is placed at each layout origin only when it lies fully inside the
/// sheet. Sheets above [`MAX_SHEET_PIXELS`], or whose buffer cannot be
/// allocated, are rejected with [`LabelError::SheetTooLarge`].
pub fn compose_sheet(label: &RgbaImage, spec: SheetSpec) -> Result<CompositeSheet, LabelError> {
    let too_large = || LabelError::SheetTooLarge {
        width: spec.width,
        height: spec.height,
    };
    if u64::from(spec.width) * u64::from(spec.height) > MAX_SHEET_PIXELS {
        return Err(too_large());
    }

    let (label_width, label_height) = label.dimensions();
    let layout = calculate_capacity(label_width, label_height, spec.width, spec.height, spec.padding);
    debug!(
        label_width,
        label_height,
        per_row = layout.images_per_row,
        per_column = layout.images_per_column,
        total = layout.total_images,
        padding = spec.padding,
        "sheet layout"
    );

    let mut sheet = Surface::try_filled(spec.width, spec.height, WHITE).ok_or_else(too_large)?;
    let mut images_placed = 0;

    for (x, y) in layout.placements(spec.padding) {
        let fits_x = x >= 0 && x + label_width as i64 <= spec.width as i64;
        let fits_y = y >= 0 && y + label_height as i64 <= spec.height as i64;
        if fits_x && fits_y {
            sheet.draw_image(label, x, y);
            images_placed += 1;
        }
    }

    Ok(CompositeSheet {
        image: sheet.into_image(),
        images_placed,
        layout,
    })
}

fn write_sheet(
    unit_label_path: &Path,
    output_path: &Path,
    spec: SheetSpec,
) -> Result<(u64, (u32, u32)), (LabelError, Option<(u32, u32)>)> {
    let label = load_image(unit_label_path).map_err(|e| (e, None))?.to_rgba8();
    let dims = label.dimensions();

    let sheet = compose_sheet(&label, spec).map_err(|e| (e, Some(dims)))?;
    let png = encode_png(&sheet.image).map_err(|e| (e, Some(dims)))?;
    write_atomic(output_path, &png).map_err(|e| (e, Some(dims)))?;

    Ok((sheet.images_placed, dims))
}

/// Tile the unit label at `unit_label_path` onto a sheet and write it to `output_path`.
///
/// Parent directories of `output_path` are created. The PNG is encoded fully
/// in memory and renamed into place, so a failed call leaves no partial file.
pub fn create_composite_sheet(
    unit_label_path: &Path,
    output_path: &Path,
    spec: SheetSpec,
) -> CompositeReport {
    let dimensions = |(label_width, label_height): (u32, u32)| SheetDimensions {
        sheet_width: spec.width,
        sheet_height: spec.height,
        label_width,
        label_height,
        padding: spec.padding,
    };

    match write_sheet(unit_label_path, output_path, spec) {
        Ok((images_placed, label_dims)) => {
            info!(
                output = %output_path.display(),
                images_placed,
                padding = spec.padding,
                "composite sheet written"
            );
            CompositeReport {
                success: true,
                message: format!(
                    "Composite image created with {} labels ({}px padding)",
                    images_placed, spec.padding
                ),
                images_placed,
                output_path: Some(output_path.to_path_buf()),
                dimensions: dimensions(label_dims),
            }
        }
        Err((e, label_dims)) => {
            let message = match &e {
                LabelError::Encode(_) | LabelError::Write { .. } | LabelError::Io(_) => {
                    format!("Failed to save composite image: {}", e)
                }
                _ => format!("Error creating composite: {}", e),
            };
            warn!(input = %unit_label_path.display(), "{}", message);
            CompositeReport {
                success: false,
                message,
                images_placed: 0,
                output_path: None,
                dimensions: dimensions(label_dims.unwrap_or((0, 0))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::color::BLACK;
    use image::Rgba;

    #[test]
    fn test_compose_places_full_capacity() {
        let label = RgbaImage::from_pixel(500, 300, BLACK);
        let sheet = compose_sheet(&label, SheetSpec::default()).unwrap();
        assert_eq!(sheet.images_placed, 45);
        assert_eq!(sheet.images_placed, sheet.layout.total_images);
        assert_eq!(sheet.image.dimensions(), (1900, 5000));
    }

    #[test]
    fn test_compose_positions_and_background() {
        let label = RgbaImage::from_pixel(500, 300, BLACK);
        let sheet = compose_sheet(&label, SheetSpec::default()).unwrap();
        let px = |x, y| *sheet.image.get_pixel(x, y);

        // Padding around the first cell
        assert_eq!(px(9, 9), WHITE);
        assert_eq!(px(10, 10), BLACK);
        assert_eq!(px(509, 309), BLACK);
        assert_eq!(px(510, 10), WHITE);
        // Second column starts one cell later
        assert_eq!(px(529, 10), WHITE);
        assert_eq!(px(530, 10), BLACK);
        // Unused strip on the right
        assert_eq!(px(1899, 10), WHITE);
        assert_eq!(px(10, 4999), WHITE);
    }

    #[test]
    fn test_compose_oversized_label() {
        let label = RgbaImage::from_pixel(2000, 2000, BLACK);
        let sheet = compose_sheet(&label, SheetSpec::default()).unwrap();
        assert_eq!(sheet.images_placed, 0);
        assert!(sheet.image.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_transparent_label_keeps_white_sheet() {
        let label = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 0]));
        let sheet = compose_sheet(&label, SheetSpec::new(240, 120, 10)).unwrap();
        assert_eq!(sheet.images_placed, 2);
        assert!(sheet.image.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_compose_rejects_oversized_sheet() {
        let label = RgbaImage::from_pixel(10, 10, BLACK);
        for (width, height) in [(u32::MAX, u32::MAX), (100_000, 100_000), (10_001, 10_000)] {
            let result = compose_sheet(&label, SheetSpec::new(width, height, 10));
            assert!(
                matches!(result, Err(LabelError::SheetTooLarge { width: w, height: h }) if (w, h) == (width, height)),
                "{}x{}",
                width,
                height
            );
        }
    }

    #[test]
    fn test_oversized_sheet_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("label.png");
        std::fs::write(&input, encode_png(&RgbaImage::from_pixel(50, 40, BLACK)).unwrap()).unwrap();
        let output = dir.path().join("sheet.png");

        let report = create_composite_sheet(&input, &output, SheetSpec::new(u32::MAX, u32::MAX, 10));
        assert!(!report.success);
        assert_eq!(
            report.message,
            format!("Error creating composite: Sheet too large: {}x{} px", u32::MAX, u32::MAX)
        );
        assert_eq!(report.images_placed, 0);
        assert_eq!(report.dimensions.label_width, 50);
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_unit_label_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sheet.png");
        let report = create_composite_sheet(
            Path::new("/nonexistent/label.png"),
            &output,
            SheetSpec::default(),
        );

        assert!(!report.success);
        assert!(report.message.starts_with("Error creating composite:"));
        assert_eq!(report.images_placed, 0);
        assert_eq!(report.output_path, None);
        assert_eq!(report.dimensions.label_width, 0);
        assert_eq!(report.dimensions.sheet_width, 1900);
        assert!(!output.exists());
    }

    #[test]
    fn test_unwritable_output_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("label.png");
        std::fs::write(&input, encode_png(&RgbaImage::from_pixel(50, 40, BLACK)).unwrap()).unwrap();

        // A regular file where a directory is needed
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let report = create_composite_sheet(
            &input,
            &blocker.join("sheet.png"),
            SheetSpec::new(200, 200, 0),
        );

        assert!(!report.success);
        assert!(report.message.starts_with("Failed to save composite image:"));
        assert_eq!(report.dimensions.label_width, 50);
        assert_eq!(report.dimensions.label_height, 40);
    }

    #[test]
    fn test_create_composite_sheet_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("label.png");
        std::fs::write(&input, encode_png(&RgbaImage::from_pixel(90, 40, BLACK)).unwrap()).unwrap();
        let output = dir.path().join("sheets/out.png");

        let report = create_composite_sheet(&input, &output, SheetSpec::new(400, 200, 5));
        assert!(report.success, "{}", report.message);
        assert_eq!(report.images_placed, 4 * 4);
        assert_eq!(report.message, "Composite image created with 16 labels (5px padding)");
        assert_eq!(report.output_path.as_deref(), Some(output.as_path()));

        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (400, 200));
    }
}
