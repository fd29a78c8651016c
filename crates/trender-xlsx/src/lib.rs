//! # trender-xlsx
//!
//! Reads a packaged workbook (`.xlsx`/`.xlsm`) into the
//! [`trender_core::Workbook`] model, and enumerates the raw chart-definition
//! parts stored alongside the worksheets in the same archive.
//!
//! Only cached cell values are read; formulas, styles (beyond date-format
//! detection) and drawing layout are out of scope for the exporter.

mod charts;
mod error;
mod reader;
mod styles;

pub use charts::{chart_parts, read_chart_parts, ChartPart};
pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
