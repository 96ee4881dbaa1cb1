//! # Labelpress - Product Label Composition Library
//!
//! Labelpress renders product labels and lays them out for printing. It
//! provides:
//!
//! - **QR payloads**: reversible per-label identifiers and their lookup URLs
//! - **Unit labels**: base image + text and QR elements → PNG
//! - **Sheet packing**: how many labels fit on a print sheet
//! - **Composite sheets**: a unit label tiled across a white sheet PNG
//!
//! ## Quick Start
//!
//! ```no_run
//! use labelpress::{
//!     config::SheetSpec,
//!     create_composite_sheet, encode_qr_payload, generate_unit_label,
//!     template::{DynamicFieldContext, ElementKind, LabelElement},
//! };
//! use std::path::Path;
//!
//! let elements = vec![
//!     LabelElement::qr(20.0, 20.0, 120.0),
//!     LabelElement::new(ElementKind::LotNo, "LOT", 160.0, 24.0).size(18.0).bold(),
//! ];
//! let ctx = DynamicFieldContext {
//!     lot_no: Some("L-44".to_string()),
//!     ..Default::default()
//! }
//! .with_qr_payload(encode_qr_payload(12, 1, 1700000000000));
//!
//! let png = generate_unit_label(Path::new("base.png"), &elements, &ctx)?;
//! std::fs::write("unit.png", png)?;
//!
//! let report = create_composite_sheet(
//!     Path::new("unit.png"),
//!     Path::new("sheets/12.png"),
//!     SheetSpec::default(),
//! );
//! println!("{}", report.message);
//!
//! # Ok::<(), labelpress::LabelError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`qr`] | Payload codec and QR rasterization |
//! | [`template`] | Templates, elements and dynamic field values |
//! | [`render`] | Drawing surface, element renderer, compositor |
//! | [`sheet`] | Packing calculator and composite generator |
//! | [`server`] | HTTP service |
//! | [`config`] | Defaults and runtime settings |
//! | [`error`] | Error types |

pub mod config;
pub mod error;
pub mod qr;
pub mod render;
pub mod server;
pub mod sheet;
pub mod template;

// Re-exports for convenience
pub use error::LabelError;
pub use qr::payload::encode as encode_qr_payload;
pub use render::{LabelCompositor, UnitLabelImage, generate_unit_label};
pub use sheet::{CompositeReport, PackingLayout, calculate_capacity, create_composite_sheet};
