//! # Drawing Surface
//!
//! An RGBA pixel buffer that every draw call receives explicitly. Nothing is
//! shared between surfaces, so independent renders can run concurrently.
//!
//! All drawing clips silently at the surface edge: coordinates may be
//! negative or beyond the bounds.

use image::{DynamicImage, Rgba, RgbaImage, imageops};

use crate::error::LabelError;

use super::io::encode_png;

/// RGBA drawing surface with a top-left origin.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Surface filled with a single color.
    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, color),
        }
    }

    /// Like [`Surface::filled`], but returns None instead of aborting when the
    /// buffer size overflows or cannot be allocated.
    pub fn try_filled(width: u32, height: u32, color: Rgba<u8>) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?.checked_mul(4)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(len).ok()?;
        buf.resize(len, 0);
        for px in buf.chunks_exact_mut(4) {
            px.copy_from_slice(&color.0);
        }
        RgbaImage::from_raw(width, height, buf).map(|pixels| Self { pixels })
    }

    /// Surface sized to `image`'s natural dimensions with `image` drawn at (0, 0).
    pub fn from_image(image: &DynamicImage) -> Self {
        Self {
            pixels: image.to_rgba8(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    fn in_bounds(&self, x: i64, y: i64) -> Option<(u32, u32)> {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            None
        } else {
            Some((x as u32, y as u32))
        }
    }

    /// Alpha-composite `top` with its top-left corner at (x, y).
    pub fn draw_image(&mut self, top: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(&mut self.pixels, top, x, y);
    }

    /// Blend `color` into one pixel with the given coverage (0.0..=1.0).
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
        let Some((px, py)) = self.in_bounds(x, y) else {
            return;
        };

        let alpha = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }

        let dst = self.pixels.get_pixel_mut(px, py);
        for c in 0..3 {
            let blended = dst[c] as f32 * (1.0 - alpha) + color[c] as f32 * alpha;
            dst[c] = blended.round() as u8;
        }
        let out_alpha = alpha * 255.0 + dst[3] as f32 * (1.0 - alpha);
        dst[3] = out_alpha.round().min(255.0) as u8;
    }

    /// Blend a row-major coverage buffer of the given width at (x, y).
    pub fn draw_coverage(&mut self, x: i64, y: i64, width: usize, coverage: &[f32], color: Rgba<u8>) {
        if width == 0 {
            return;
        }
        for (idx, &c) in coverage.iter().enumerate() {
            if c <= 0.0 {
                continue;
            }
            let cx = (idx % width) as i64;
            let cy = (idx / width) as i64;
            self.blend_pixel(x + cx, y + cy, color, c);
        }
    }

    /// Opaquely paint the visible part of a `size × size` square at (x, y).
    ///
    /// `shade` receives square-relative coordinates and is only called for
    /// pixels inside the surface, so the square may be far larger than it.
    pub fn paint_square(&mut self, x: i64, y: i64, size: u64, shade: impl Fn(u64, u64) -> Rgba<u8>) {
        let extent = i64::try_from(size).unwrap_or(i64::MAX);
        let (x0, y0) = (x.max(0), y.max(0));
        let x1 = x.saturating_add(extent).min(i64::from(self.width()));
        let y1 = y.saturating_add(extent).min(i64::from(self.height()));

        for py in y0..y1 {
            for px in x0..x1 {
                let color = shade(px.abs_diff(x), py.abs_diff(y));
                self.pixels.put_pixel(px as u32, py as u32, color);
            }
        }
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Encode the surface as an RGBA8 PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, LabelError> {
        encode_png(&self.pixels)
    }
}
