//! Output of processed sheets.
//!
//! - [`csv`] - the sheet with its normalised column, as CSV
//! - [`xlsx`] - the same as a one-sheet workbook
//! - [`json`] - institution records as a JSON array
//! - [`terminal`] - rejection report

mod csv;
mod json;
mod terminal;
mod xlsx;

use crate::error::SheetError;
use crate::input::Sheet;
use std::path::Path;

pub use self::csv::{write_csv, write_csv_file};
pub use self::xlsx::{write_xlsx, write_xlsx_file};
pub use json::write_records;
pub use terminal::report_rejections;

/// Write the sheet to `path`, as a workbook for `.xlsx` or as `.csv`.
pub fn write_sheet_file<P: AsRef<Path>>(sheet: &Sheet, path: P) -> Result<(), SheetError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("xlsx") => write_xlsx_file(sheet, path)?,
        Some("csv") => write_csv_file(sheet, path)?,
        _ => return Err(SheetError::UnsupportedFormat(path.display().to_string())),
    }
    log::info!("Wrote {} rows to {}", sheet.max_row(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sheet_file_rejects_unknown_extension() {
        let sheet = Sheet::new("Sheet1");
        let err = write_sheet_file(&sheet, "out.ods").unwrap_err();
        assert!(matches!(err, SheetError::UnsupportedFormat(_)));
    }
}
