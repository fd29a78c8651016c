//! Metadata field scanning.
//!
//! Worksheets carry their descriptive fields as free-form label/value pairs
//! somewhere above, below or beside the data: `Rubrik | Förtroende för...`,
//! or the label with the value in the cell underneath. There is no fixed
//! layout, so each field is located by proximity: find the label token,
//! then probe right, then below.

use trender_core::{CellValue, Worksheet};

/// Scan window: labels are never further down or right than this
const SCAN_ROWS: u32 = 300;
const SCAN_COLS: u16 = 30;

/// How many cells to the right of a label may hold its value
const PROBE_COLS: u16 = 4;

/// The six label tokens, lowercase. The same set doubles as the exclusion
/// list: a label's value is never one of these tokens (that would be an
/// adjacent label, not a value).
pub const LABEL_TOKENS: &[&str] = &[
    "rubrik",
    "underrubrik",
    "fråga",
    "kommentar",
    "typ",
    "källa",
];

/// The descriptive fields of one worksheet; every field is optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetMetadata {
    /// Heading
    pub rubrik: Option<String>,
    /// Subheading
    pub underrubrik: Option<String>,
    /// Question text
    pub fraga: Option<String>,
    /// Comment
    pub kommentar: Option<String>,
    /// Content type ("Diagram" or "Tabell")
    pub typ: Option<String>,
    /// Source attribution
    pub kalla: Option<String>,
}

impl SheetMetadata {
    /// Whether the type field says the sheet holds a table
    pub fn is_table(&self) -> bool {
        self.typ
            .as_deref()
            .map_or(false, |t| t.trim().to_lowercase() == "tabell")
    }
}

/// Scan a worksheet for all six metadata fields
pub fn scan(worksheet: &Worksheet) -> SheetMetadata {
    SheetMetadata {
        rubrik: find_labeled_value(worksheet, "rubrik"),
        underrubrik: find_labeled_value(worksheet, "underrubrik"),
        fraga: find_labeled_value(worksheet, "fråga"),
        kommentar: find_labeled_value(worksheet, "kommentar"),
        typ: find_labeled_value(worksheet, "typ"),
        kalla: find_labeled_value(worksheet, "källa"),
    }
}

/// Find the value paired with a label token.
///
/// The scan is row-major over the bounded window; the first cell whose
/// trimmed text equals the token (case-insensitively) decides the outcome.
/// Its value is the nearest acceptable cell within the next [`PROBE_COLS`]
/// columns of the same row, else the cell directly below. Later
/// occurrences of the label are never consulted.
pub fn find_labeled_value(worksheet: &Worksheet, token: &str) -> Option<String> {
    let rows = worksheet.row_count().min(SCAN_ROWS);
    let cols = worksheet.col_count().min(SCAN_COLS);

    for row in 0..rows {
        for col in 0..cols {
            // Labels are always typed text, never numbers
            let Some(CellValue::String(text)) = worksheet.cell_at(row, col) else {
                continue;
            };
            if text.trim().to_lowercase() != token {
                continue;
            }
            return probe_value(worksheet, row, col);
        }
    }

    None
}

/// Probe for a label's value: right along the row first (the common
/// layout), then the cell below (the stacked layout)
fn probe_value(worksheet: &Worksheet, row: u32, col: u16) -> Option<String> {
    for probe_col in col + 1..=col + PROBE_COLS {
        if let Some(value) = accept_candidate(worksheet.cell_at(row, probe_col)) {
            return Some(value);
        }
    }
    accept_candidate(worksheet.cell_at(row + 1, col))
}

/// A candidate value cell is accepted when it is non-empty and not itself a
/// label token
fn accept_candidate(cell: Option<&CellValue>) -> Option<String> {
    let cell = cell?;
    if cell.is_empty() {
        return None;
    }
    let text = cell.to_string().trim().to_string();
    if text.is_empty() || LABEL_TOKENS.contains(&text.to_lowercase().as_str()) {
        return None;
    }
    Some(text)
}
