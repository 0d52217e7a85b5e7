//! Tabular input.
//!
//! - [`Sheet`] - in-memory grid of cells
//! - [`csv`] - CSV reader
//! - [`xlsx`] - XLSX reader

mod csv;
mod sheet;
mod xlsx;

use crate::error::SheetError;
use std::path::Path;

// Re-export public types and functions
pub use self::csv::{read_csv, read_csv_file};
pub use self::xlsx::{
    column_letters, parse_cell_ref, read_xlsx, read_xlsx_file, MAX_COLUMN, MAX_ROW,
};
pub use sheet::Sheet;

#[cfg(test)]
pub(crate) use self::xlsx::tests::build_xlsx;

/// Read `sheet_name` from an `.xlsx` workbook, or a `.csv` file as a sheet of that name.
pub fn read_sheet<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Sheet, SheetError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => read_xlsx_file(path, sheet_name),
        Some("csv") => read_csv_file(path, sheet_name),
        _ => Err(SheetError::UnsupportedFormat(path.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_sheet_rejects_unknown_extension() {
        let err = read_sheet("institutions.ods", "Sheet1").unwrap_err();
        assert!(matches!(err, SheetError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_read_sheet_missing_file() {
        let err = read_sheet("src/tests/test_data/does_not_exist.csv", "Sheet1").unwrap_err();
        assert!(matches!(err, SheetError::Io(_)));
    }
}
