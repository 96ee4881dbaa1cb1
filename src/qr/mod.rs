//! # QR Codes
//!
//! - [`payload`]: the reversible identifier stored per printed label and
//!   embedded in its QR target URL
//! - [`bitmap`]: QR symbol encoding and rasterization at arbitrary pixel sizes

pub mod bitmap;
pub mod payload;

pub use bitmap::QrBitmap;
pub use payload::{QrPayload, decode, encode, target_url};
