//! # Configuration
//!
//! Defaults for sheet layout and QR targets, plus the runtime settings the
//! CLI and server assemble from their arguments.
//!
//! ## Sheet Defaults
//!
//! | Property | Value |
//! |----------|-------|
//! | Sheet width | 1900 px |
//! | Sheet height | 5000 px |
//! | Padding per side | 10 px |
//! | Largest sheet | 100 000 000 px |
//!
//! ## Usage
//!
//! ```
//! use labelpress::config::SheetSpec;
//!
//! let spec = SheetSpec::default();
//! assert_eq!((spec.width, spec.height, spec.padding), (1900, 5000, 10));
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LabelError;
use crate::render::font::FontSet;

/// Default composite sheet width in pixels.
pub const DEFAULT_SHEET_WIDTH: u32 = 1900;

/// Default composite sheet height in pixels.
pub const DEFAULT_SHEET_HEIGHT: u32 = 5000;

/// Default padding applied on every side of each tiled label.
pub const DEFAULT_PADDING: i64 = 10;

/// Largest composite sheet, in pixels, that will be allocated (400 MB of RGBA).
pub const MAX_SHEET_PIXELS: u64 = 100_000_000;

/// Host embedded in QR target URLs (`https://{host}/info?qrcode=...`).
pub const DEFAULT_QR_HOST: &str = "labels.example.com";

/// Address the HTTP server listens on by default.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// # Sheet Specification
///
/// Target sheet geometry for composite generation.
///
/// ```text
/// ┌──────────────── width ────────────────┐
/// │ pad ┌───────┐ pad pad ┌───────┐ pad   │
/// │     │ label │         │ label │       │
/// │     └───────┘         └───────┘       │
/// └───────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSpec {
    pub width: u32,
    pub height: u32,
    pub padding: i64,
}

impl Default for SheetSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_SHEET_WIDTH,
            height: DEFAULT_SHEET_HEIGHT,
            padding: DEFAULT_PADDING,
        }
    }
}

impl SheetSpec {
    pub fn new(width: u32, height: u32, padding: i64) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }
}

/// Settings shared by every label render.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Host used when building QR target URLs.
    pub qr_host: String,
    /// Text face used for all text elements.
    pub fonts: FontSet,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            qr_host: DEFAULT_QR_HOST.to_string(),
            fonts: FontSet::Bitmap,
        }
    }
}

impl RenderConfig {
    /// Build a render configuration, loading TrueType faces when paths are given.
    ///
    /// Without a regular face the Spleen bitmap font is used and `bold_font`
    /// is ignored.
    pub fn load(
        qr_host: &str,
        font: Option<&Path>,
        bold_font: Option<&Path>,
    ) -> Result<Self, LabelError> {
        let fonts = match font {
            Some(regular) => FontSet::load_ttf(regular, bold_font)?,
            None => FontSet::Bitmap,
        };

        Ok(Self {
            qr_host: qr_host.to_string(),
            fonts,
        })
    }
}
