//! Text rasterization for label elements.
//!
//! Uses the Spleen bitmap font family by default, scaled to the requested
//! pixel size. A TrueType face can be configured instead (see
//! [`super::ttf_font`]).
//!
//! Both paths produce a [`TextMask`]: the coverage of the part of the text
//! box that falls inside a [`Clip`], positioned relative to the text anchor.
//! Only the clipped window is rasterized, so the text box itself may be far
//! larger than the surface.

use ab_glyph::FontArc;
use spleen_font::{FONT_6X12, FONT_12X24, PSF2Font};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::error::LabelError;

use super::ttf_font;

/// A TrueType glyph whose outline is too large to rasterize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("glyph of {width}x{height}px exceeds the rasterizer limit")]
pub struct GlyphTooLarge {
    pub width: u64,
    pub height: u64,
}

/// Visible region in text-box coordinates (origin at the text anchor),
/// half-open on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Clip {
    /// No clipping; the mask covers the whole text box.
    pub const UNBOUNDED: Clip = Clip {
        left: i64::MIN,
        top: i64::MIN,
        right: i64::MAX,
        bottom: i64::MAX,
    };

    /// The part of a `width × height` surface seen from an anchor at (x, y).
    pub fn surface(x: i64, y: i64, width: u32, height: u32) -> Self {
        Clip {
            left: x.saturating_neg(),
            top: y.saturating_neg(),
            right: i64::from(width).saturating_sub(x),
            bottom: i64::from(height).saturating_sub(y),
        }
    }

    /// Blank mask for the intersection with a `width × height` text box, or
    /// None when nothing of the box is visible.
    pub(crate) fn window(&self, width: u64, height: u64) -> Option<TextMask> {
        let left = self.left.max(0);
        let top = self.top.max(0);
        let right = self.right.min(i64::try_from(width).unwrap_or(i64::MAX));
        let bottom = self.bottom.min(i64::try_from(height).unwrap_or(i64::MAX));
        if left >= right || top >= bottom {
            return None;
        }

        let width = usize::try_from(right - left).ok()?;
        let height = usize::try_from(bottom - top).ok()?;
        Some(TextMask {
            x: left,
            y: top,
            width,
            height,
            data: vec![0.0; width.checked_mul(height)?],
        })
    }
}

/// Rendered text as a coverage buffer.
pub struct TextMask {
    /// Offset of the buffer from the text anchor
    pub x: i64,
    pub y: i64,
    pub width: usize,
    pub height: usize,
    /// Coverage values: 0.0 = untouched, 1.0 = fully painted.
    pub data: Vec<f32>,
}

impl TextMask {
    pub fn empty() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&c| c <= 0.0)
    }

    /// Add coverage at text-box position (x, y); positions outside the
    /// buffer are ignored.
    pub(crate) fn accumulate(&mut self, x: i64, y: i64, coverage: f32) {
        let (Ok(cx), Ok(cy)) = (usize::try_from(x - self.x), usize::try_from(y - self.y)) else {
            return;
        };
        if cx < self.width && cy < self.height {
            let idx = cy * self.width + cx;
            self.data[idx] = (self.data[idx] + coverage).min(1.0);
        }
    }
}

/// Text faces available to the renderer.
#[derive(Clone)]
pub enum FontSet {
    /// Built-in Spleen bitmap glyphs
    Bitmap,
    /// TrueType faces; bold falls back to a double strike of `regular`
    Ttf {
        regular: FontArc,
        bold: Option<FontArc>,
    },
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSet::Bitmap => write!(f, "FontSet::Bitmap"),
            FontSet::Ttf { bold, .. } => write!(f, "FontSet::Ttf {{ bold: {} }}", bold.is_some()),
        }
    }
}

impl FontSet {
    /// Load TrueType faces from disk.
    pub fn load_ttf(regular: &Path, bold: Option<&Path>) -> Result<Self, LabelError> {
        Ok(FontSet::Ttf {
            regular: ttf_font::load_font(regular)?,
            bold: bold.map(ttf_font::load_font).transpose()?,
        })
    }

    /// Rasterize the visible part of a single line of text at `pixel_height`.
    pub fn render(
        &self,
        text: &str,
        pixel_height: f32,
        bold: bool,
        clip: Clip,
    ) -> Result<TextMask, GlyphTooLarge> {
        match self {
            FontSet::Bitmap => Ok(render_bitmap_text(text, pixel_height, bold, clip)),
            FontSet::Ttf {
                regular,
                bold: bold_face,
            } => match (bold, bold_face) {
                (true, Some(face)) => ttf_font::render_ttf_text(face, text, pixel_height, false, clip),
                (true, None) => ttf_font::render_ttf_text(regular, text, pixel_height, true, clip),
                (false, _) => ttf_font::render_ttf_text(regular, text, pixel_height, false, clip),
            },
        }
    }
}

/// Source bitmap for a target pixel height.
///
/// Small text samples the 6x12 face, everything else the 12x24 face, so
/// downscaling never drops more than half the source rows.
fn source_font(pixel_height: u64) -> (&'static [u8], usize, usize) {
    if pixel_height < 18 {
        (FONT_6X12, 6, 12)
    } else {
        (FONT_12X24, 12, 24)
    }
}

/// Render text with the Spleen bitmap font.
///
/// Each glyph is nearest-neighbour scaled to a cell `pixel_height` tall and
/// half as wide. Bold is a double strike offset by one pixel.
pub fn render_bitmap_text(text: &str, pixel_height: f32, bold: bool, clip: Clip) -> TextMask {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return TextMask::empty();
    }

    let cell_height = (pixel_height.round().clamp(1.0, u32::MAX as f32) as u64).max(1);
    let (font_data, src_w, src_h) = source_font(cell_height);
    let cell_width = (cell_height * src_w as u64 / src_h as u64).max(1);
    let box_width = (chars.len() as u64)
        .saturating_mul(cell_width)
        .saturating_add(u64::from(bold));

    let Some(mut mask) = clip.window(box_width, cell_height) else {
        return TextMask::empty();
    };
    let (left, top) = (mask.x as u64, mask.y as u64);

    // Glyphs of the characters under the window, one extra on the left for
    // the bold strike
    let first = (left / cell_width).saturating_sub(1) as usize;
    let last = ((left + mask.width as u64 - 1) / cell_width).min(chars.len() as u64 - 1) as usize;
    let mut spleen = PSF2Font::new(font_data).expect("embedded Spleen font is valid");
    let glyphs: Vec<Vec<u8>> = chars[first..=last]
        .iter()
        .map(|&ch| glyph_bitmap(&mut spleen, ch, src_w, src_h).unwrap_or_else(|| box_glyph(src_w, src_h)))
        .collect();

    let ink = |x: u64, sy: usize| -> bool {
        let index = (x / cell_width) as usize;
        if index < first || index > last {
            return false;
        }
        let sx = ((x % cell_width) * src_w as u64 / cell_width) as usize;
        glyphs[index - first][sy * src_w + sx] != 0
    };

    for row in 0..mask.height {
        let sy = ((top + row as u64) * src_h as u64 / cell_height) as usize;
        for col in 0..mask.width {
            let x = left + col as u64;
            if ink(x, sy) || (bold && x > 0 && ink(x - 1, sy)) {
                mask.data[row * mask.width + col] = 1.0;
            }
        }
    }

    mask
}

/// Glyph bitmap (1 = on) for `ch`, or None if the font lacks it.
fn glyph_bitmap(font: &mut PSF2Font, ch: char, src_w: usize, src_h: usize) -> Option<Vec<u8>> {
    let utf8 = ch.to_string();
    let spleen_glyph = font.glyph_for_utf8(utf8.as_bytes())?;

    let mut bitmap = vec![0u8; src_w * src_h];
    for (row_y, row) in spleen_glyph.enumerate() {
        for (col_x, on) in row.enumerate() {
            if row_y < src_h && col_x < src_w {
                bitmap[row_y * src_w + col_x] = u8::from(on);
            }
        }
    }
    Some(bitmap)
}

/// Box outline drawn for characters the font does not cover.
fn box_glyph(width: usize, height: usize) -> Vec<u8> {
    let mut glyph = vec![0u8; width * height];
    for x in 0..width {
        glyph[x] = 1;
        glyph[(height - 1) * width + x] = 1;
    }
    for y in 0..height {
        glyph[y * width] = 1;
        glyph[y * width + width - 1] = 1;
    }
    glyph
}
