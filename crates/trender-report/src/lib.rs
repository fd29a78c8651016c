//! # trender-report
//!
//! The extraction-and-normalization engine behind the trender exporter.
//!
//! Given a loaded [`trender_core::Workbook`] and the raw chart parts from its
//! package, this crate:
//! - parses each chart part into a [`chart::ChartDefinition`],
//! - resolves the chart's data references back into the workbook,
//! - scans every worksheet for labeled metadata fields and embedded data
//!   tables,
//! - groups worksheets into [`model::Section`]s of [`model::Indicator`]s,
//!   applying the title-casing and domain override rules.
//!
//! The output is a plain serializable value ([`model::ReportPayload`]);
//! writing it anywhere is the caller's business.

pub mod assemble;
pub mod chart;
pub mod error;
pub mod metadata;
pub mod model;
pub mod overrides;
pub mod resolve;
pub mod section;
pub mod slug;
pub mod table;

pub use error::{ReportError, ReportResult};
pub use model::{
    Chart, ChartKind, ChartSeries, Datum, Indicator, ReportPayload, ResolvedValues, Section,
    TableBlock,
};

use trender_core::Workbook;
use trender_xlsx::ChartPart;

/// Run the whole extraction pass: assemble charts from the given parts, then
/// build the ordered section list from the workbook's worksheets.
pub fn extract_sections(workbook: &Workbook, parts: &[ChartPart]) -> Vec<Section> {
    let charts = assemble::assemble_charts(workbook, parts);
    section::build_sections(workbook, charts)
}
