//! # trender-core
//!
//! Core data structures for the trender report exporter.
//!
//! This crate provides the read-side workbook model the extraction engine
//! works against:
//! - [`CellValue`] - Cell scalars (numbers, strings, booleans, dates)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Workbook`], [`Worksheet`] - The document structure
//!
//! ## Example
//!
//! ```rust
//! use trender_core::{Workbook, CellValue};
//!
//! let mut workbook = Workbook::empty();
//! let idx = workbook.add_worksheet_with_name("Sheet1").unwrap();
//! let sheet = workbook.worksheet_mut(idx).unwrap();
//!
//! sheet.set_value_at(0, 0, "Hello");
//! sheet.set_value_at(0, 1, 42.0);
//! assert_eq!(sheet.value_at(0, 1), CellValue::Number(42.0));
//! ```

pub mod address;
pub mod cell;
pub mod error;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use address::{CellAddress, CellRange};
pub use cell::CellValue;
pub use error::{Error, Result};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
