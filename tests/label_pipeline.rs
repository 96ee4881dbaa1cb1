//! # Label Pipeline Tests
//!
//! End-to-end checks of the template → unit label → composite sheet pipeline
//! using fixture images generated into a temporary directory.
//!
//! ## Test Coverage
//!
//! - **Unit labels**: natural dimensions, idempotent PNG output, degraded QR
//!   elements, out-of-bounds elements
//! - **Composite sheets**: placement count equals capacity, row-major
//!   placement with padding, deterministic output, oversized sheets

use image::{Rgba, RgbaImage};
use labelpress::config::{RenderConfig, SheetSpec};
use labelpress::render::io::encode_png;
use labelpress::template::{DynamicFieldContext, ElementKind, LabelElement, LabelTemplate};
use labelpress::{
    LabelCompositor, LabelError, calculate_capacity, create_composite_sheet, encode_qr_payload,
    generate_unit_label,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Write a solid PNG fixture and return its path.
fn fixture(dir: &TempDir, name: &str, width: u32, height: u32, color: Rgba<u8>) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, encode_png(&RgbaImage::from_pixel(width, height, color)).unwrap()).unwrap();
    path
}

fn sample_elements() -> Vec<LabelElement> {
    vec![
        LabelElement::qr(10.0, 10.0, 110.0),
        LabelElement::new(ElementKind::RegisterNo, "REG", 130.0, 12.0).size(20.0).bold(),
        LabelElement::new(ElementKind::LotNo, "LOT", 130.0, 40.0).size(16.0),
        LabelElement::new(ElementKind::ExpiryDate, "EXP", 130.0, 62.0).color("#c00"),
        LabelElement::text("Store below 25C", 130.0, 90.0).size(12.0),
    ]
}

fn sample_context() -> DynamicFieldContext {
    DynamicFieldContext {
        register_no: Some("REG-1".to_string()),
        lot_no: Some("L-44".to_string()),
        expiry_date: Some("2027-10-18".to_string()),
        sticker_no: Some("S7".to_string()),
        ..Default::default()
    }
    .with_qr_payload(encode_qr_payload(7, 3, 1700000000000))
}

fn decode(png: &[u8]) -> RgbaImage {
    image::load_from_memory(png).unwrap().to_rgba8()
}

// ============================================================================
// UNIT LABELS
// ============================================================================

#[test]
fn test_unit_label_keeps_base_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let base = fixture(&dir, "base.png", 400, 130, WHITE);

    let png = generate_unit_label(&base, &sample_elements(), &sample_context()).unwrap();
    let image = decode(&png);
    assert_eq!(image.dimensions(), (400, 130));
    assert!(image.pixels().any(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
fn test_render_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let base = fixture(&dir, "base.png", 400, 130, WHITE);

    let first = generate_unit_label(&base, &sample_elements(), &sample_context()).unwrap();
    let second = generate_unit_label(&base, &sample_elements(), &sample_context()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_degraded_qr_matches_placeholder_text() {
    let dir = tempfile::tempdir().unwrap();
    let base = fixture(&dir, "base.png", 300, 80, WHITE);
    let no_payload = DynamicFieldContext::default();

    let degraded = generate_unit_label(
        &base,
        &[LabelElement::qr(12.0, 20.0, 24.0).bold()],
        &no_payload,
    )
    .unwrap();
    let placeholder = generate_unit_label(
        &base,
        &[LabelElement::text("QR Code", 12.0, 20.0).size(24.0).bold()],
        &no_payload,
    )
    .unwrap();

    assert_eq!(decode(&degraded), decode(&placeholder));
    assert!(decode(&degraded).pixels().any(|p| *p != WHITE));
}

#[test]
fn test_out_of_bounds_elements_do_not_fail() {
    let dir = tempfile::tempdir().unwrap();
    let base = fixture(&dir, "base.png", 64, 64, WHITE);
    let elements = vec![
        LabelElement::text("off the edge", 5000.0, 5000.0),
        LabelElement::qr(40.0, 40.0, 200.0),
    ];

    let png = generate_unit_label(&base, &elements, &sample_context()).unwrap();
    assert_eq!(decode(&png).dimensions(), (64, 64));
}

#[test]
fn test_missing_base_image() {
    let result = generate_unit_label(
        Path::new("/nonexistent/base.png"),
        &sample_elements(),
        &sample_context(),
    );
    assert!(matches!(result, Err(LabelError::ImageLoad { .. })));
}

#[test]
fn test_template_file_renders_run_labels() {
    let dir = tempfile::tempdir().unwrap();
    fixture(&dir, "base.png", 300, 140, WHITE);
    let template_path = dir.path().join("template.json");
    fs::write(
        &template_path,
        r#"{
            "id": 12,
            "base_image": "base.png",
            "quantity": 2,
            "created_at_ms": 1700000000000,
            "fields": {"register_no": "REG-1", "sticker_no": "S7"},
            "elements": [
                {"element_id": 1, "x": 10, "y": 10, "size": 120},
                {"element_id": 2, "label": "REG", "x": 140, "y": 10, "size": 18}
            ]
        }"#,
    )
    .unwrap();

    let template = LabelTemplate::load(&template_path).unwrap();
    let config = RenderConfig::default();
    let compositor = LabelCompositor::new(&config);

    let first = compositor
        .render_template(&template, 1, &DynamicFieldContext::default())
        .unwrap();
    let second = compositor
        .render_template(&template, 2, &DynamicFieldContext::default())
        .unwrap();
    let preview = compositor.render_preview(&template).unwrap();

    assert!(first.degraded.is_empty());
    assert_ne!(first.image, second.image, "each label carries its own QR identity");
    assert_eq!(first.image, preview.image);
}

// ============================================================================
// COMPOSITE SHEETS
// ============================================================================

#[test]
fn test_composite_places_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let unit = fixture(&dir, "unit.png", 500, 300, Rgba([0, 0, 0, 255]));
    let output = dir.path().join("out/sheet.png");

    let report = create_composite_sheet(&unit, &output, SheetSpec::default());
    let layout = calculate_capacity(500, 300, 1900, 5000, 10);

    assert!(report.success, "{}", report.message);
    assert_eq!(report.images_placed, 45);
    assert_eq!(report.images_placed, layout.total_images);
    assert_eq!(report.dimensions.label_width, 500);
    assert_eq!(report.dimensions.label_height, 300);

    let sheet = image::open(&output).unwrap().to_rgba8();
    assert_eq!(sheet.dimensions(), (1900, 5000));

    // Every placement origin is inked; the padding just before it is not
    for (x, y) in layout.placements(10) {
        assert_eq!(sheet.get_pixel(x as u32, y as u32).0, [0, 0, 0, 255]);
        assert_eq!(*sheet.get_pixel(x as u32 - 1, y as u32), WHITE);
    }
    // Unused area below the last row
    assert_eq!(*sheet.get_pixel(100, 4900), WHITE);
}

#[test]
fn test_composite_output_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let unit = fixture(&dir, "unit.png", 123, 77, Rgba([30, 60, 90, 255]));
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");

    assert!(create_composite_sheet(&unit, &a, SheetSpec::new(800, 600, 7)).success);
    assert!(create_composite_sheet(&unit, &b, SheetSpec::new(800, 600, 7)).success);
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn test_composite_of_oversized_label_is_blank() {
    let dir = tempfile::tempdir().unwrap();
    let unit = fixture(&dir, "unit.png", 2000, 100, Rgba([0, 0, 0, 255]));
    let output = dir.path().join("sheet.png");

    let report = create_composite_sheet(&unit, &output, SheetSpec::default());
    assert!(report.success);
    assert_eq!(report.images_placed, 0);
    assert_eq!(
        report.message,
        "Composite image created with 0 labels (10px padding)"
    );
}

#[test]
fn test_composite_of_huge_sheet_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let unit = fixture(&dir, "unit.png", 500, 300, Rgba([0, 0, 0, 255]));
    let output = dir.path().join("sheet.png");

    let report = create_composite_sheet(&unit, &output, SheetSpec::new(100_000, 100_000, 10));
    assert!(!report.success);
    assert_eq!(
        report.message,
        "Error creating composite: Sheet too large: 100000x100000 px"
    );
    assert_eq!(report.output_path, None);
    assert!(!output.exists());
}

#[test]
fn test_unit_label_to_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let base = fixture(&dir, "base.png", 400, 130, WHITE);
    let unit = dir.path().join("unit.png");
    fs::write(
        &unit,
        generate_unit_label(&base, &sample_elements(), &sample_context()).unwrap(),
    )
    .unwrap();

    let report = create_composite_sheet(&unit, &dir.path().join("sheet.png"), SheetSpec::default());
    // 420 x 150 cells: 4 per row, 33 rows
    assert_eq!(report.images_placed, 4 * 33);
}
