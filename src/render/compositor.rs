//! # Label Image Compositor
//!
//! Turns a base image plus a list of elements into a unit label:
//!
//! 1. Decode the base image (fatal if missing or undecodable)
//! 2. Allocate a surface at the base image's natural size
//! 3. Draw the base image at (0, 0)
//! 4. Draw the elements in list order, later elements on top
//! 5. Encode as RGBA8 PNG
//!
//! Rendering is deterministic: the same inputs produce byte-identical PNGs.
//!
//! ## Example
//!
//! ```no_run
//! use labelpress::render::compositor::generate_unit_label;
//! use labelpress::template::{DynamicFieldContext, LabelElement};
//! use std::path::Path;
//!
//! let elements = vec![LabelElement::qr(20.0, 20.0, 120.0)];
//! let ctx = DynamicFieldContext::default().with_qr_payload("N3wzfDE3MDAwMDAwMDAwMDA=");
//! let png = generate_unit_label(Path::new("base.png"), &elements, &ctx)?;
//! # Ok::<(), labelpress::LabelError>(())
//! ```

use image::{DynamicImage, RgbaImage};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::error::LabelError;
use crate::template::{DynamicFieldContext, ElementKind, LabelElement, LabelTemplate};

use super::element::ElementRenderer;
use super::io::{encode_png, load_image, write_atomic};
use super::surface::Surface;

/// An element that was drawn in degraded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementDegraded {
    /// Position of the element in the input list
    pub index: usize,
    pub kind: ElementKind,
    pub reason: String,
}

/// A rendered unit label.
#[derive(Debug, Clone)]
pub struct UnitLabelImage {
    pub image: RgbaImage,
    pub degraded: Vec<ElementDegraded>,
}

impl UnitLabelImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn to_png(&self) -> Result<Vec<u8>, LabelError> {
        encode_png(&self.image)
    }

    /// Encode and write the label to `path`.
    pub fn write_png(&self, path: &Path) -> Result<(), LabelError> {
        let png = self.to_png()?;
        write_atomic(path, &png)?;
        info!(path = %path.display(), width = self.width(), height = self.height(), "unit label written");
        Ok(())
    }
}

/// Renders unit labels with a shared configuration.
pub struct LabelCompositor<'a> {
    config: &'a RenderConfig,
}

impl<'a> LabelCompositor<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// Render elements over the base image at `base_path`.
    pub fn render(
        &self,
        base_path: &Path,
        elements: &[LabelElement],
        ctx: &DynamicFieldContext,
    ) -> Result<UnitLabelImage, LabelError> {
        let base = load_image(base_path)?;
        debug!(
            path = %base_path.display(),
            width = base.width(),
            height = base.height(),
            elements = elements.len(),
            "rendering unit label"
        );
        Ok(self.render_on(&base, elements, ctx))
    }

    /// Render elements over an already decoded base image.
    pub fn render_on(
        &self,
        base: &DynamicImage,
        elements: &[LabelElement],
        ctx: &DynamicFieldContext,
    ) -> UnitLabelImage {
        let mut surface = Surface::from_image(base);
        let renderer = ElementRenderer::new(self.config);

        let degraded = elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| {
                renderer
                    .draw(&mut surface, element, ctx)
                    .map(|d| ElementDegraded {
                        index,
                        kind: element.kind,
                        reason: d.to_string(),
                    })
            })
            .collect();

        UnitLabelImage {
            image: surface.into_image(),
            degraded,
        }
    }

    /// Render and encode as PNG.
    pub fn generate(
        &self,
        base_path: &Path,
        elements: &[LabelElement],
        ctx: &DynamicFieldContext,
    ) -> Result<Vec<u8>, LabelError> {
        self.render(base_path, elements, ctx)?.to_png()
    }

    /// Render label `sequence_no` of a template's run.
    ///
    /// Non-empty `overrides` win over the template's own field values.
    pub fn render_template(
        &self,
        template: &LabelTemplate,
        sequence_no: u32,
        overrides: &DynamicFieldContext,
    ) -> Result<UnitLabelImage, LabelError> {
        template.validate()?;
        let ctx = template.context_for(sequence_no, overrides);
        self.render(&template.base_image, &template.elements, &ctx)
    }

    /// Render the preview of a template: its own fields and the first QR identity.
    pub fn render_preview(&self, template: &LabelTemplate) -> Result<UnitLabelImage, LabelError> {
        self.render_template(template, 1, &DynamicFieldContext::default())
    }
}

/// Render a unit label with the default configuration and return PNG bytes.
pub fn generate_unit_label(
    base_path: &Path,
    elements: &[LabelElement],
    ctx: &DynamicFieldContext,
) -> Result<Vec<u8>, LabelError> {
    LabelCompositor::new(&RenderConfig::default()).generate(base_path, elements, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::payload;
    use crate::render::color::{BLACK, WHITE};
    use image::Rgba;
    use tempfile::TempDir;

    fn base_image(dir: &TempDir, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.path().join("base.png");
        let png = encode_png(&RgbaImage::from_pixel(width, height, WHITE)).unwrap();
        std::fs::write(&path, png).unwrap();
        path
    }

    #[test]
    fn test_output_matches_base_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let base = base_image(&dir, 321, 123);
        let config = RenderConfig::default();

        let label = LabelCompositor::new(&config)
            .render(&base, &[LabelElement::text("LOT", 5.0, 5.0)], &DynamicFieldContext::default())
            .unwrap();
        assert_eq!((label.width(), label.height()), (321, 123));
        assert!(label.degraded.is_empty());
    }

    #[test]
    fn test_missing_base_image_is_fatal() {
        let result = generate_unit_label(
            Path::new("/nonexistent/base.png"),
            &[],
            &DynamicFieldContext::default(),
        );
        assert!(matches!(result, Err(LabelError::ImageLoad { .. })));
    }

    #[test]
    fn test_no_elements_reproduces_base() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("base.png");
        let mut img = RgbaImage::from_pixel(8, 8, WHITE);
        img.put_pixel(3, 4, Rgba([10, 20, 30, 255]));
        std::fs::write(&path, encode_png(&img).unwrap()).unwrap();

        let png = generate_unit_label(&path, &[], &DynamicFieldContext::default()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_later_elements_draw_on_top() {
        let config = RenderConfig::default();
        let base = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 100, WHITE));
        let ctx = DynamicFieldContext::default().with_qr_payload(payload::encode(1, 1, 1));

        // Glyph over the QR quiet margin; the top-left pixel is inked either way
        let elements = vec![
            LabelElement::qr(0.0, 0.0, 90.0),
            LabelElement::text("\u{2588}", 0.0, 0.0).size(24.0).color("#ff0000"),
        ];
        let label = LabelCompositor::new(&config).render_on(&base, &elements, &ctx);

        assert_eq!(*label.image.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*label.image.get_pixel(95, 95), WHITE);
        assert!(label.image.pixels().any(|p| *p == BLACK));
    }

    #[test]
    fn test_degraded_elements_are_reported() {
        let config = RenderConfig::default();
        let base = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 40, WHITE));
        let elements = vec![
            LabelElement::text("ok", 0.0, 0.0),
            LabelElement::qr(10.0, 10.0, 20.0),
        ];

        let label =
            LabelCompositor::new(&config).render_on(&base, &elements, &DynamicFieldContext::default());
        assert_eq!(
            label.degraded,
            vec![ElementDegraded {
                index: 1,
                kind: ElementKind::QrCode,
                reason: "no QR payload in context".to_string(),
            }]
        );
    }

    #[test]
    fn test_render_preview_uses_template_fields() {
        let dir = tempfile::tempdir().unwrap();
        base_image(&dir, 300, 150);
        let json = r#"{
            "id": 9,
            "base_image": "base.png",
            "created_at_ms": 1700000000000,
            "fields": {"lot_no": "L-1"},
            "elements": [
                {"kind": "qr_code", "x": 10, "y": 10, "size": 100},
                {"kind": "lot_no", "label": "LOT", "x": 120, "y": 10, "size": 24}
            ]
        }"#;
        let mut template = LabelTemplate::from_json(json).unwrap();
        template.resolve_base_image(dir.path());

        let config = RenderConfig::default();
        let compositor = LabelCompositor::new(&config);
        let preview = compositor.render_preview(&template).unwrap();
        assert!(preview.degraded.is_empty());

        let explicit = compositor
            .render(
                &template.base_image,
                &template.elements,
                &template.fields.clone().with_qr_payload(payload::encode(9, 1, 1700000000000)),
            )
            .unwrap();
        assert_eq!(preview.image, explicit.image);
    }

    #[test]
    fn test_render_template_rejects_invalid_elements() {
        let mut template = LabelTemplate::from_json(
            r#"{"id": 1, "base_image": "/nonexistent.png", "elements": [{"kind": "text", "size": 0}]}"#,
        )
        .unwrap();

        let config = RenderConfig::default();
        let result = LabelCompositor::new(&config).render_preview(&template);
        assert!(matches!(result, Err(LabelError::InvalidTemplate(_))));
    }

    #[test]
    fn test_write_png() {
        let dir = tempfile::tempdir().unwrap();
        let label = UnitLabelImage {
            image: RgbaImage::from_pixel(4, 4, BLACK),
            degraded: Vec::new(),
        };
        let out = dir.path().join("out/label.png");
        label.write_png(&out).unwrap();
        assert_eq!(image::open(&out).unwrap().to_rgba8(), label.image);
    }
}
