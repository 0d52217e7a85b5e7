//! In-memory sheet: a grid of optional cells addressed 1-based like a spreadsheet.

use crate::models::CellValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<Option<CellValue>>>,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            rows: Vec::new(),
        }
    }

    /// Number of the last row holding anything (0 for an empty sheet).
    pub fn max_row(&self) -> usize {
        self.rows.len()
    }

    /// Number of the last column used in any row.
    pub fn max_column(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Cell at 1-based `row`, `column`.
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        if row == 0 || column == 0 {
            return None;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(column - 1))
            .and_then(|c| c.as_ref())
    }

    /// Text of a cell, `None` when empty.
    pub fn cell_text(&self, row: usize, column: usize) -> Option<String> {
        self.cell(row, column).map(CellValue::as_text)
    }

    /// Store a value at 1-based `row`, `column`, growing the grid as needed.
    pub fn set_cell(&mut self, row: usize, column: usize, value: CellValue) {
        assert!(row > 0 && column > 0, "cells are addressed from 1");
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < column {
            cells.resize_with(column, || None);
        }
        cells[column - 1] = Some(value);
    }

    /// Rows as slices of cells, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<CellValue>]> {
        self.rows.iter().map(|r| r.as_slice())
    }
}
