//! # Print Sheets
//!
//! - [`packing`]: how many copies of a label fit on a sheet
//! - [`composite`]: tiling a unit label onto a sheet PNG

pub mod composite;
pub mod packing;

pub use composite::{CompositeReport, CompositeSheet, SheetDimensions, compose_sheet, create_composite_sheet};
pub use packing::{PackingLayout, calculate_capacity};
