//! CSV sheet reader.

use super::Sheet;
use crate::error::SheetError;
use crate::models::CellValue;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a headerless CSV file into a sheet called `name`.
pub fn read_csv_file<P: AsRef<Path>>(path: P, name: &str) -> Result<Sheet, SheetError> {
    let file = File::open(path)?;
    read_csv(file, name)
}

/// Read headerless CSV into a sheet. Row 1 is the first record.
pub fn read_csv<R: Read>(reader: R, name: &str) -> Result<Sheet, SheetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut sheet = Sheet::new(name);
    for (i, result) in csv_reader.records().enumerate() {
        let record = result?;
        for (col, field) in record.iter().enumerate() {
            if let Some(value) = detect_type(field) {
                sheet.set_cell(i + 1, col + 1, value);
            }
        }
    }
    log::debug!(
        "read_csv({name}) rows={} columns={}",
        sheet.max_row(),
        sheet.max_column()
    );
    Ok(sheet)
}

/// Digit-only fields are numbers, the way a spreadsheet would have stored them.
fn detect_type(field: &str) -> Option<CellValue> {
    if field.is_empty() {
        return None;
    }
    // f64 holds every integer up to 15 digits exactly
    if field.len() <= 15 && field.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = field.parse::<f64>() {
            return Some(CellValue::Number(n));
        }
    }
    Some(CellValue::Text(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_types() {
        let data = "Example University,United Kingdom,a@example.ac.uk,131111008042\n\
                    Other,France,,\"10.0.0.1, 10.0.0.2\"\n";
        let sheet = read_csv(data.as_bytes(), "Sheet1").unwrap();
        assert_eq!(sheet.max_row(), 2);
        assert_eq!(sheet.cell(1, 4), Some(&CellValue::Number(131111008042.0)));
        assert_eq!(
            sheet.cell(2, 4),
            Some(&CellValue::Text("10.0.0.1, 10.0.0.2".to_string()))
        );
        assert_eq!(sheet.cell(2, 3), None);
    }

    #[test]
    fn test_read_csv_ragged_rows() {
        let data = "a\nb,c,d\n";
        let sheet = read_csv(data.as_bytes(), "Sheet1").unwrap();
        assert_eq!(sheet.max_column(), 3);
        assert_eq!(sheet.cell_text(2, 3).as_deref(), Some("d"));
    }

    #[test]
    fn test_detect_type() {
        assert_eq!(detect_type(""), None);
        assert_eq!(detect_type("42"), Some(CellValue::Number(42.0)));
        assert_eq!(detect_type("10.0.0.1"), Some(CellValue::from("10.0.0.1")));
        assert_eq!(
            detect_type("1234567890123456"),
            Some(CellValue::from("1234567890123456"))
        );
    }
}
