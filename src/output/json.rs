//! JSON output of institution records.

use crate::models::InstitutionRecord;
use std::error::Error;
use std::io::Write;

/// Write the records as one JSON array followed by a newline.
pub fn write_records<W: Write>(
    records: &[InstitutionRecord],
    mut writer: W,
) -> Result<(), Box<dyn Error>> {
    serde_json::to_writer(&mut writer, records)
        .map_err(|e| format!("Error serializing JSON: {e}"))?;
    writeln!(writer)?;
    Ok(())
}
