//! # Element Renderer
//!
//! Draws one [`LabelElement`] onto a [`Surface`].
//!
//! | Kind | Drawn as |
//! |------|----------|
//! | `QrCode` | `size × size` QR of the target URL, black on white |
//! | `RegisterNo` | `"{register_no}\|{sticker_no}"`, register number alone, or label |
//! | `LotNo`, `ProductionDate`, `ExpiryDate` | dynamic value or label |
//! | `Text` | label |
//!
//! Rendering never fails. A QR element that cannot be encoded is drawn as the
//! text `"QR Code"` in the element's style and reported as a [`Degradation`].
//! Text whose glyphs are too large to rasterize is skipped and reported the
//! same way. Only the part of an element that lands on the surface is
//! rasterized.

use std::borrow::Cow;
use thiserror::Error;
use tracing::warn;

use crate::config::RenderConfig;
use crate::qr::{QrBitmap, target_url};
use crate::template::{DynamicFieldContext, ElementKind, LabelElement};

use super::color::{BLACK, WHITE, parse_hex_color};
use super::font::{Clip, GlyphTooLarge};
use super::surface::Surface;

/// Text drawn in place of a QR code that could not be produced.
pub const QR_PLACEHOLDER: &str = "QR Code";

/// Why an element was drawn in a degraded form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Degradation {
    #[error("no QR payload in context")]
    MissingQrPayload,

    #[error("QR encoding failed: {0}")]
    QrEncode(String),

    #[error("text not drawn: {0}")]
    Text(#[from] GlyphTooLarge),
}

/// Text shown for a text-kind element given the dynamic field values.
pub fn display_text<'a>(element: &'a LabelElement, ctx: &'a DynamicFieldContext) -> Cow<'a, str> {
    let dynamic = match element.kind {
        ElementKind::RegisterNo => match (ctx.register_no(), ctx.sticker_no()) {
            (Some(reg), Some(sticker)) => return Cow::Owned(format!("{}|{}", reg, sticker)),
            (Some(reg), None) => Some(reg),
            (None, _) => None,
        },
        ElementKind::LotNo => ctx.lot_no(),
        ElementKind::ProductionDate => ctx.production_date(),
        ElementKind::ExpiryDate => ctx.expiry_date(),
        ElementKind::Text | ElementKind::QrCode => None,
    };

    Cow::Borrowed(dynamic.unwrap_or(&element.label))
}

/// Draws elements with a shared render configuration.
pub struct ElementRenderer<'a> {
    config: &'a RenderConfig,
}

impl<'a> ElementRenderer<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// Draw `element` onto `surface`.
    ///
    /// Returns the degradation applied, if any.
    pub fn draw(
        &self,
        surface: &mut Surface,
        element: &LabelElement,
        ctx: &DynamicFieldContext,
    ) -> Option<Degradation> {
        match element.kind {
            ElementKind::QrCode => match self.draw_qr(surface, element, ctx) {
                Ok(()) => None,
                Err(degradation) => {
                    warn!(
                        x = element.x,
                        y = element.y,
                        reason = %degradation,
                        "QR element degraded to placeholder text"
                    );
                    if let Err(e) = self.draw_text(surface, element, QR_PLACEHOLDER) {
                        warn!(size = element.size, error = %e, "placeholder text not drawn");
                    }
                    Some(degradation)
                }
            },
            _ => {
                let text = display_text(element, ctx);
                let drawn = self.draw_text(surface, element, &text);
                drawn.err().map(|e| {
                    warn!(
                        x = element.x,
                        y = element.y,
                        size = element.size,
                        error = %e,
                        "text element skipped"
                    );
                    Degradation::from(e)
                })
            }
        }
    }

    fn draw_qr(
        &self,
        surface: &mut Surface,
        element: &LabelElement,
        ctx: &DynamicFieldContext,
    ) -> Result<(), Degradation> {
        let payload = ctx.qr_payload().ok_or(Degradation::MissingQrPayload)?;
        let url = target_url(&self.config.qr_host, payload);
        let bitmap = QrBitmap::encode(&url).map_err(|e| Degradation::QrEncode(e.to_string()))?;

        let size = element.size.round().max(1.0) as u64;
        surface.paint_square(
            element.x.round() as i64,
            element.y.round() as i64,
            size,
            |px, py| if bitmap.sample(size, px, py) { BLACK } else { WHITE },
        );
        Ok(())
    }

    fn draw_text(
        &self,
        surface: &mut Surface,
        element: &LabelElement,
        text: &str,
    ) -> Result<(), GlyphTooLarge> {
        if text.is_empty() {
            return Ok(());
        }

        let color = parse_hex_color(&element.color).unwrap_or_else(|e| {
            warn!(color = %element.color, error = %e, "falling back to black");
            BLACK
        });

        let (x, y) = (element.x.round() as i64, element.y.round() as i64);
        let clip = Clip::surface(x, y, surface.width(), surface.height());
        let mask = self.config.fonts.render(text, element.size, element.bold, clip)?;
        surface.draw_coverage(
            x.saturating_add(mask.x),
            y.saturating_add(mask.y),
            mask.width,
            &mask.data,
            color,
        );
        Ok(())
    }
}
