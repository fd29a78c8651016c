//! Worksheet type

use std::collections::HashMap;

use crate::address::CellRange;
use crate::cell::CellValue;

/// A worksheet (single sheet in a workbook)
///
/// Storage is a sparse map keyed by (row, col); the used extent grows
/// monotonically as cells are set. Empty cells read as [`CellValue::Empty`].
#[derive(Debug, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Sparse cell storage keyed by (row, col), 0-based
    cells: HashMap<(u32, u16), CellValue>,
    /// Highest row index with a cell, if any
    max_row: Option<u32>,
    /// Highest column index with a cell, if any
    max_col: Option<u16>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: HashMap::new(),
            max_row: None,
            max_col: None,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Get a cell value by row and column indices (0-based), if set
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Get a cell value by indices, [`CellValue::Empty`] when unset
    pub fn value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(&(row, col))
            .cloned()
            .unwrap_or(CellValue::Empty)
    }

    /// Set a cell value by row and column indices (0-based)
    pub fn set_value_at<V: Into<CellValue>>(&mut self, row: u32, col: u16, value: V) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        self.max_row = Some(self.max_row.map_or(row, |r| r.max(row)));
        self.max_col = Some(self.max_col.map_or(col, |c| c.max(col)));
        self.cells.insert((row, col), value);
    }

    /// The smallest rectangle covering every set cell, or None when the
    /// sheet is empty
    pub fn used_range(&self) -> Option<CellRange> {
        match (self.max_row, self.max_col) {
            (Some(r), Some(c)) => Some(CellRange::from_indices(0, 0, r, c)),
            _ => None,
        }
    }

    /// Number of rows in the used extent (0 when empty)
    pub fn row_count(&self) -> u32 {
        self.max_row.map_or(0, |r| r + 1)
    }

    /// Number of columns in the used extent (0 when empty)
    pub fn col_count(&self) -> u16 {
        self.max_col.map_or(0, |c| c + 1)
    }

    /// Check if the sheet has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
