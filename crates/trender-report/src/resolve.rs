//! Range resolution: from `'Sheet'!$A$1:$B$2` formula references to
//! concrete cell values.

use trender_core::{CellRange, Workbook};

use crate::error::{ReportError, ReportResult};
use crate::model::{Datum, ResolvedRange, ResolvedValues};

/// Split a data reference into sheet name and cell range, stripping the
/// quotes a sheet name with spaces is written with.
pub fn split_sheet_ref(reference: &str) -> ReportResult<(&str, &str)> {
    let (sheet, cells) = reference
        .split_once('!')
        .ok_or_else(|| ReportError::InvalidReference(reference.to_string()))?;
    Ok((sheet.trim_matches('\''), cells))
}

/// Resolve a data reference against the workbook.
///
/// The rectangle is read row-major. A reference spanning exactly one column
/// collapses to a flat sequence - nearly every category/value reference in
/// this domain is a single column, and chart consumers want the flat form.
///
/// A reference to a sheet the workbook does not contain fails with
/// [`ReportError::SheetNotFound`]; the caller drops that chart or series
/// and carries on.
pub fn resolve_range(workbook: &Workbook, reference: &str) -> ReportResult<ResolvedRange> {
    let (sheet_name, cells) = split_sheet_ref(reference)?;
    let worksheet = workbook
        .worksheet_by_name(sheet_name)
        .ok_or_else(|| ReportError::SheetNotFound(sheet_name.to_string()))?;
    let range = CellRange::parse(cells)?;

    let values = if range.col_count() == 1 {
        let col = range.start.col;
        ResolvedValues::Flat(
            (range.start.row..=range.end.row)
                .map(|row| Datum::from(worksheet.value_at(row, col)))
                .collect(),
        )
    } else {
        ResolvedValues::Grid(
            (range.start.row..=range.end.row)
                .map(|row| {
                    (range.start.col..=range.end.col)
                        .map(|col| Datum::from(worksheet.value_at(row, col)))
                        .collect()
                })
                .collect(),
        )
    };

    Ok(ResolvedRange {
        sheet: sheet_name.to_string(),
        values,
    })
}
