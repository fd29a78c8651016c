//! The report document model.
//!
//! Everything here is write-once: built during a single extraction pass,
//! then serialized. Field order on the serde structs is the payload's key
//! order, which downstream rendering relies on being stable.

use serde::Serialize;

use trender_core::CellValue;

/// A single resolved cell value as it appears in the payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Datum {
    /// Empty cell
    Null,
    /// Boolean cell
    Bool(bool),
    /// Numeric cell
    Number(f64),
    /// Text cell (date cells render as ISO dates)
    Text(String),
}

impl From<&CellValue> for Datum {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => Datum::Null,
            CellValue::Boolean(b) => Datum::Bool(*b),
            CellValue::Number(n) => Datum::Number(*n),
            CellValue::String(s) => Datum::Text(s.clone()),
            CellValue::DateTime(dt) => Datum::Text(dt.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<CellValue> for Datum {
    fn from(value: CellValue) -> Self {
        Datum::from(&value)
    }
}

/// The values of a resolved range.
///
/// A reference spanning exactly one column collapses to a flat sequence;
/// anything wider is a row-major grid. Chart consumers use the flat form
/// directly as categories/values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedValues {
    /// Single-column reference, top-to-bottom
    Flat(Vec<Datum>),
    /// Multi-column reference, row-major
    Grid(Vec<Vec<Datum>>),
}

impl ResolvedValues {
    /// Number of entries along the primary (row) axis
    pub fn len(&self) -> usize {
        match self {
            ResolvedValues::Flat(v) => v.len(),
            ResolvedValues::Grid(rows) => rows.len(),
        }
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reverse along the primary (row) axis
    pub fn reverse(&mut self) {
        match self {
            ResolvedValues::Flat(v) => v.reverse(),
            ResolvedValues::Grid(rows) => rows.reverse(),
        }
    }
}

/// A resolved range: concrete values plus the sheet they came from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRange {
    /// Name of the sheet the reference resolved against
    pub sheet: String,
    /// The values read from the rectangle
    pub values: ResolvedValues,
}

/// Chart type tag, as found in the chart part's plot area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Area,
    Scatter,
    Pie,
    Doughnut,
    Bubble,
}

impl ChartKind {
    /// Recognition priority: when a chart part carries more than one plot
    /// group, the first kind in this order wins.
    pub const PRIORITY: [ChartKind; 7] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Area,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::Doughnut,
        ChartKind::Bubble,
    ];

    /// The payload tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Area => "area",
            ChartKind::Scatter => "scatter",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
            ChartKind::Bubble => "bubble",
        }
    }
}

/// One resolved data series of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    /// Series label ("" when the chart stores none)
    pub name: String,
    /// Resolved series values
    pub values: ResolvedValues,
}

/// A fully resolved chart, keyed by its owning worksheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    /// Stable id, the chart part's file stem
    pub id: String,
    /// Archive path of the chart part
    pub source: String,
    /// Display title, if the chart carries one
    pub title: Option<String>,
    /// The worksheet the chart's data lives on
    pub sheet: String,
    /// Chart type tag
    #[serde(rename = "type")]
    pub kind: ChartKind,
    /// Resolved category axis values, if any
    pub categories: Option<ResolvedValues>,
    /// Resolved series; never empty (a chart without resolved series is
    /// dropped before it gets here)
    pub series: Vec<ChartSeries>,
}

impl Chart {
    /// Reverse the chronological order of categories and of every series
    pub fn flip_chronology(&mut self) {
        if let Some(categories) = &mut self.categories {
            categories.reverse();
        }
        for series in &mut self.series {
            series.values.reverse();
        }
    }
}

/// A contiguous tabular block lifted off a worksheet; row 0 is the header
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TableBlock {
    /// Header row followed by data rows; trailing empty cells are trimmed
    pub rows: Vec<Vec<Option<String>>>,
}

impl TableBlock {
    /// Reverse the data rows, leaving the header in place
    pub fn reverse_data_rows(&mut self) {
        if self.rows.len() > 1 {
            self.rows[1..].reverse();
        }
    }
}

/// One worksheet's extracted content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    /// Display title (normalized heading, or the sheet name)
    pub title: String,
    /// Slug derived from the sheet name
    pub slug: String,
    /// Source worksheet name
    pub sheet: String,
    /// Charts whose data lives on this worksheet
    pub charts: Vec<Chart>,
    /// Extracted table, when the sheet's type field says it holds one
    pub table: Option<TableBlock>,
    /// Raw type field
    pub typ: Option<String>,
    /// Raw heading field
    pub rubrik: Option<String>,
    /// Display subheading (normalized)
    pub underrubrik: Option<String>,
    /// Raw question field
    pub fraga: Option<String>,
    /// Raw comment field
    pub kommentar: Option<String>,
    /// Raw source field
    pub kalla: Option<String>,
}

/// A titled group of indicators, derived from a section-header worksheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Section title (the header sheet's name, spelling-corrected)
    pub title: String,
    /// Slug derived from the header sheet's name
    pub slug: String,
    /// Indicators in workbook order
    pub indicators: Vec<Indicator>,
}

/// The assembled export payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    /// UTC timestamp of the export run, RFC 3339 with seconds precision
    pub generated_at: String,
    /// File name of the source workbook
    pub source_workbook: String,
    /// Convenience count of `sections`
    pub section_count: usize,
    /// Ordered sections
    pub sections: Vec<Section>,
}

impl ReportPayload {
    /// Wrap assembled sections into the export envelope
    pub fn new(generated_at: String, source_workbook: String, sections: Vec<Section>) -> Self {
        Self {
            generated_at,
            source_workbook,
            section_count: sections.len(),
            sections,
        }
    }
}
