//! QR module matrix and its pixel rasterization.

use qrcode::types::QrError;
use qrcode::{Color, QrCode};

/// Quiet margin around the symbol, in modules.
pub const QUIET_MODULES: usize = 1;

/// An encoded QR symbol.
#[derive(Debug, Clone)]
pub struct QrBitmap {
    /// Modules per side (excluding quiet margin)
    width: usize,
    /// Row-major module colors, true = dark
    modules: Vec<bool>,
}

impl QrBitmap {
    /// Encode `data` with the encoder's default error correction level.
    pub fn encode(data: &str) -> Result<Self, QrError> {
        let code = QrCode::new(data.as_bytes())?;
        let width = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();

        Ok(Self { width, modules })
    }

    /// Modules per side, excluding the quiet margin.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the module at (x, y) is dark. Positions outside the symbol are light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.modules[y * self.width + x]
    }

    /// Whether pixel (px, py) of the symbol drawn into a `size × size`
    /// square is dark.
    ///
    /// When the square holds at least one pixel per module, every module gets
    /// the same whole number of pixels and the symbol is centred, with the
    /// leftover strip light. Smaller squares fall back to nearest-neighbour
    /// sampling.
    pub fn sample(&self, size: u64, px: u64, py: u64) -> bool {
        if size == 0 {
            return false;
        }
        let total = (self.width + QUIET_MODULES * 2) as u64;
        let scale = size / total;

        let (mx, my) = if scale >= 1 {
            let offset = (size - scale * total) / 2;
            if px < offset || py < offset {
                return false;
            }
            ((px - offset) / scale, (py - offset) / scale)
        } else {
            (px * total / size, py * total / size)
        };

        let quiet = QUIET_MODULES as u64;
        if mx < quiet || my < quiet || mx >= total || my >= total {
            return false;
        }
        self.is_dark((mx - quiet) as usize, (my - quiet) as usize)
    }
}
