//! # Rendering Module
//!
//! Everything needed to turn a label template into pixels.
//!
//! ## Modules
//!
//! - [`surface`]: RGBA drawing surface passed explicitly into every draw call
//! - [`element`]: Draws a single label element (text or QR)
//! - [`compositor`]: Base image + elements → unit label PNG
//! - [`font`]: Spleen bitmap text and the configured font set
//! - [`ttf_font`]: Anti-aliased TrueType text via ab_glyph
//! - [`color`]: Hex color parsing
//! - [`io`]: Image decoding, header probing, PNG encoding, atomic writes
//!
//! ## Usage Example
//!
//! ```
//! use image::{DynamicImage, RgbaImage, Rgba};
//! use labelpress::config::RenderConfig;
//! use labelpress::render::LabelCompositor;
//! use labelpress::template::{DynamicFieldContext, LabelElement};
//!
//! let base = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 200, Rgba([255, 255, 255, 255])));
//! let elements = vec![
//!     LabelElement::qr(10.0, 10.0, 120.0),
//!     LabelElement::text("Keep refrigerated", 140.0, 20.0).size(18.0),
//! ];
//! let ctx = DynamicFieldContext::default().with_qr_payload("MXwxfDE=");
//!
//! let config = RenderConfig::default();
//! let label = LabelCompositor::new(&config).render_on(&base, &elements, &ctx);
//! assert_eq!((label.width(), label.height()), (400, 200));
//! ```

pub mod color;
pub mod compositor;
pub mod element;
pub mod font;
pub mod io;
pub mod surface;
pub mod ttf_font;

pub use compositor::{ElementDegraded, LabelCompositor, UnitLabelImage, generate_unit_label};
pub use element::{Degradation, ElementRenderer};
pub use font::FontSet;
pub use io::{ImageDimensions, probe_dimensions};
pub use surface::Surface;
