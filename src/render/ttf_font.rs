//! TTF font rendering for configured TrueType faces.
//!
//! Renders text to an anti-aliased coverage buffer using ab_glyph. The buffer
//! is then blended onto the label surface with the element's fill color.

use ab_glyph::{Font, FontArc, ScaleFont};
use std::path::Path;

use crate::error::LabelError;

use super::font::{Clip, GlyphTooLarge, TextMask};

/// Largest glyph outline, in pixels, handed to the rasterizer.
pub const MAX_GLYPH_PIXELS: u64 = 4096 * 4096;

/// Load a TrueType/OpenType face from disk.
pub fn load_font(path: &Path) -> Result<FontArc, LabelError> {
    let bytes = std::fs::read(path)
        .map_err(|e| LabelError::Font(format!("Failed to read {}: {}", path.display(), e)))?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| LabelError::Font(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Render the part of `text` inside `clip` using a TTF font.
///
/// The top of the text box is the top of the line box (ascent above the
/// baseline), matching a top text baseline. `fake_bold` strikes the glyphs a
/// second time one pixel to the right. Glyphs outside the clip are skipped;
/// a visible glyph larger than [`MAX_GLYPH_PIXELS`] is an error.
pub fn render_ttf_text(
    font: &FontArc,
    text: &str,
    pixel_height: f32,
    fake_bold: bool,
    clip: Clip,
) -> Result<TextMask, GlyphTooLarge> {
    if text.is_empty() {
        return Ok(TextMask::empty());
    }

    let scaled = font.as_scaled(pixel_height);

    // Layout: compute glyph positions
    let mut glyphs = Vec::new();
    let mut caret_x = 0.0f32;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        let advance = scaled.h_advance(glyph_id);

        glyphs.push((glyph_id, caret_x));
        caret_x += advance;
    }

    let width = (caret_x.ceil() as u64)
        .saturating_add(u64::from(fake_bold))
        .max(1);

    // Compute line height from font metrics
    let ascent = scaled.ascent();
    let descent = scaled.descent();
    let height = ((ascent - descent).ceil() as u64).max(1);
    let baseline_y = ascent;

    let Some(mut mask) = clip.window(width, height) else {
        return Ok(TextMask::empty());
    };
    let strikes: &[i64] = if fake_bold { &[0, 1] } else { &[0] };
    let (win_left, win_top) = (mask.x, mask.y);
    let win_right = win_left + mask.width as i64;
    let win_bottom = win_top + mask.height as i64;

    // Rasterize each visible glyph
    for &(glyph_id, glyph_x) in &glyphs {
        let glyph = glyph_id.with_scale_and_position(
            pixel_height,
            ab_glyph::point(glyph_x, baseline_y),
        );

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        let (min_x, min_y) = (bounds.min.x as i64, bounds.min.y as i64);
        let (max_x, max_y) = (bounds.max.x as i64 + strikes.len() as i64, bounds.max.y as i64);
        if max_x <= win_left || min_x >= win_right || max_y <= win_top || min_y >= win_bottom {
            continue;
        }

        let (glyph_width, glyph_height) = (bounds.width() as u64, bounds.height() as u64);
        if glyph_width.saturating_mul(glyph_height) > MAX_GLYPH_PIXELS {
            return Err(GlyphTooLarge {
                width: glyph_width,
                height: glyph_height,
            });
        }

        outlined.draw(|px, py, coverage| {
            for &offset in strikes {
                mask.accumulate(min_x + px as i64 + offset, min_y + py as i64, coverage);
            }
        });
    }

    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::font::FontSet;

    /// A TrueType face from the host, if one is installed.
    ///
    /// `LABELPRESS_TEST_FONT` overrides the search. Tests that need a face
    /// return early without one.
    fn system_font() -> Option<FontArc> {
        const CANDIDATES: &[&str] = &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
            "/Library/Fonts/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ];

        let path = std::env::var_os("LABELPRESS_TEST_FONT")
            .map(std::path::PathBuf::from)
            .or_else(|| CANDIDATES.iter().map(std::path::PathBuf::from).find(|p| p.exists()))?;
        match load_font(&path) {
            Ok(font) => Some(font),
            Err(e) => {
                eprintln!("skipping: {}", e);
                None
            }
        }
    }

    fn ink(mask: &TextMask) -> f32 {
        mask.data.iter().sum()
    }

    #[test]
    fn test_load_missing_font() {
        let result = load_font(Path::new("/nonexistent/face.ttf"));
        assert!(matches!(result, Err(LabelError::Font(_))));
    }

    #[test]
    fn test_load_invalid_font_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(load_font(&path), Err(LabelError::Font(_))));
    }

    #[test]
    fn test_ttf_text_has_coverage() {
        let Some(font) = system_font() else {
            return;
        };
        let mask = render_ttf_text(&font, "LOT 44", 32.0, false, Clip::UNBOUNDED).unwrap();

        assert_eq!((mask.x, mask.y), (0, 0));
        assert!(mask.width > 32);
        assert!(mask.height >= 32);
        assert_eq!(mask.data.len(), mask.width * mask.height);
        assert!(!mask.is_blank());
        assert!(mask.data.iter().all(|&c| (0.0..=1.0).contains(&c)));
    }

    #[test]
    fn test_ttf_fake_bold_is_wider_and_darker() {
        let Some(font) = system_font() else {
            return;
        };
        let normal = render_ttf_text(&font, "Hello", 24.0, false, Clip::UNBOUNDED).unwrap();
        let bold = render_ttf_text(&font, "Hello", 24.0, true, Clip::UNBOUNDED).unwrap();

        assert_eq!(bold.width, normal.width + 1);
        assert_eq!(bold.height, normal.height);
        assert!(ink(&bold) > ink(&normal));
    }

    #[test]
    fn test_ttf_clipped_window_matches_full_render() {
        let Some(font) = system_font() else {
            return;
        };
        let full = render_ttf_text(&font, "Hello", 40.0, false, Clip::UNBOUNDED).unwrap();
        let clip = Clip {
            left: 7,
            top: 10,
            right: 30,
            bottom: 25,
        };
        let window = render_ttf_text(&font, "Hello", 40.0, false, clip).unwrap();

        assert_eq!((window.x, window.y), (7, 10));
        assert_eq!((window.width, window.height), (23, 15));
        for row in 0..window.height {
            for col in 0..window.width {
                let expected = full.data[(row + 10) * full.width + col + 7];
                assert!((window.data[row * window.width + col] - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_ttf_huge_glyph_is_rejected() {
        let Some(font) = system_font() else {
            return;
        };
        // A window in the middle of a ten-million-pixel "W"
        let clip = Clip {
            left: 5_000_000,
            top: 5_000_000,
            right: 5_000_050,
            bottom: 5_000_050,
        };
        let result = render_ttf_text(&font, "W", 1.0e7, false, clip);
        assert!(matches!(result, Err(GlyphTooLarge { .. })));

        // Off to the side of every glyph nothing is rasterized
        let mask = render_ttf_text(&font, "W", 1.0e7, false, Clip::surface(0, 0, 50, 50)).unwrap();
        assert!(mask.width <= 50 && mask.height <= 50);
    }

    #[test]
    fn test_fontset_ttf_bold_dispatch() {
        let Some(font) = system_font() else {
            return;
        };
        let render = |fonts: &FontSet, bold: bool| fonts.render("Lot 7", 20.0, bold, Clip::UNBOUNDED).unwrap();

        let regular_only = FontSet::Ttf {
            regular: font.clone(),
            bold: None,
        };
        let faked = render_ttf_text(&font, "Lot 7", 20.0, true, Clip::UNBOUNDED).unwrap();
        assert_eq!(render(&regular_only, true).data, faked.data);

        let plain = render_ttf_text(&font, "Lot 7", 20.0, false, Clip::UNBOUNDED).unwrap();
        assert_eq!(render(&regular_only, false).data, plain.data);

        // A configured bold face is used as is, without the double strike
        let with_bold = FontSet::Ttf {
            regular: font.clone(),
            bold: Some(font.clone()),
        };
        let bold = render(&with_bold, true);
        assert_eq!(bold.width, plain.width);
        assert_eq!(bold.data, plain.data);
    }
}
