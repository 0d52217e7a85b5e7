//! CSV output of a processed sheet.

use crate::error::SheetError;
use crate::input::Sheet;
use std::io::Write;
use std::path::Path;

/// Write the whole sheet to `path` as CSV.
pub fn write_csv_file<P: AsRef<Path>>(sheet: &Sheet, path: P) -> Result<(), SheetError> {
    let file = std::fs::File::create(path)?;
    write_csv(sheet, file)
}

/// Write the sheet as CSV, padding every row to the widest row.
pub fn write_csv<W: Write>(sheet: &Sheet, writer: W) -> Result<(), SheetError> {
    let width = sheet.max_column();
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(false)
        .from_writer(writer);

    for row in sheet.rows() {
        let record: Vec<String> = (0..width)
            .map(|i| {
                row.get(i)
                    .and_then(|c| c.as_ref())
                    .map(|c| c.as_text())
                    .unwrap_or_default()
            })
            .collect();
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}
