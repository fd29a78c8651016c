//! Table block extraction.
//!
//! Table sheets mix free-form metadata rows with one genuine data table.
//! The table is found by its header row (a year column) and extracted until
//! the data runs out or a metadata row interrupts; anything that looks like
//! a label row is filtered, not copied into the block.

use trender_core::{CellValue, Worksheet};

use crate::model::TableBlock;

/// How far down a header row may sit
const HEADER_SCAN_ROWS: u32 = 200;

/// How many rows a block may span, header included
const BLOCK_ROWS: u32 = 100;

/// How many columns a block may span
const BLOCK_COLS: u16 = 50;

/// Cell texts that mark a row as metadata rather than table content.
/// Broader than the six scanned fields: table sheets carry extra labels
/// (units, recoding notes, a second comment) that are just as disqualifying.
const METADATA_ROW_TOKENS: &[&str] = &[
    "rubrik",
    "fråga",
    "kommentar",
    "kommentar2",
    "bortkodning",
    "typ",
    "enhet",
    "källa",
    "underrubrik",
    "frågeformulering",
];

/// Rows whose cell text starts with one of these are metadata even when
/// the label runs on ("Kommentar: ...", "Bortkodning av ...")
const METADATA_ROW_PREFIXES: &[&str] = &["kommentar", "bortkodning"];

/// Extract the data table from a worksheet, if one can be located.
///
/// Returns at least two rows (header + data) or nothing.
pub fn extract_table(worksheet: &Worksheet) -> Option<TableBlock> {
    let header_row = find_header_row(worksheet)?;

    let mut rows = Vec::new();
    let last_row = (header_row + BLOCK_ROWS).min(worksheet.row_count());
    for row in header_row..last_row {
        if let Some(cells) = extract_row(worksheet, row) {
            rows.push(cells);
        }
    }

    (rows.len() >= 2).then_some(TableBlock { rows })
}

/// Locate the header row: the first row whose leading non-empty cell names
/// the year column or is itself a plausible year. Rows carrying a metadata
/// label anywhere are never header candidates.
fn find_header_row(worksheet: &Worksheet) -> Option<u32> {
    let rows = worksheet.row_count().min(HEADER_SCAN_ROWS);
    let cols = worksheet.col_count().min(BLOCK_COLS);

    'rows: for row in 0..rows {
        let mut first_non_empty: Option<String> = None;

        for col in 0..cols {
            let Some(value) = worksheet.cell_at(row, col) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            let text = cell_text(value);
            if METADATA_ROW_TOKENS.contains(&text.to_lowercase().as_str()) {
                continue 'rows;
            }
            if first_non_empty.is_none() {
                first_non_empty = Some(text);
            }
        }

        if first_non_empty.as_deref().map_or(false, is_header_cell) {
            return Some(row);
        }
    }

    None
}

/// Header predicate for the leading cell: contains the year word, or is a
/// 4-digit year between 1980 and 2100
fn is_header_cell(text: &str) -> bool {
    let lower = text.to_lowercase();
    if lower.contains("år") {
        return true;
    }
    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(year) = text.parse::<u32>() {
            return (1980..=2100).contains(&year);
        }
    }
    false
}

/// Extract one row of the block, or nothing when the row is metadata or
/// entirely empty. Trailing empty cells are trimmed.
fn extract_row(worksheet: &Worksheet, row: u32) -> Option<Vec<Option<String>>> {
    let cols = worksheet.col_count().min(BLOCK_COLS);
    let mut cells: Vec<Option<String>> = Vec::with_capacity(cols as usize);

    for col in 0..cols {
        match worksheet.cell_at(row, col) {
            Some(value) if !value.is_empty() => {
                let text = cell_text(value);
                let lower = text.to_lowercase();
                if METADATA_ROW_TOKENS.contains(&lower.as_str())
                    || METADATA_ROW_PREFIXES
                        .iter()
                        .any(|prefix| lower.starts_with(prefix))
                {
                    return None;
                }
                cells.push(Some(text));
            }
            _ => cells.push(None),
        }
    }

    while cells.last().map_or(false, Option::is_none) {
        cells.pop();
    }

    (!cells.is_empty()).then_some(cells)
}

/// Table cell rendering: numbers with integer collapse, dates as their
/// 4-digit year, everything else trimmed text
fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::DateTime(dt) => dt.format("%Y").to_string(),
        other => other.to_string().trim().to_string(),
    }
}
