//! Normalise free-text IPv4 address entries from a spreadsheet into CIDR blocks.

pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod output;
pub mod processing;

use normalize::Classifier;
use processing::{build_records, process_sheet, ColumnLayout, CountryCodes, SheetReport};
use std::error::Error;
use std::io::Write;
use std::path::Path;

/// Read a sheet and write the CIDR blocks for `column` into `column + 1`.
pub fn standardise_sheet(
    input: &Path,
    sheet_name: &str,
    column: usize,
    first_row: usize,
) -> Result<(input::Sheet, SheetReport), Box<dyn Error>> {
    let mut sheet = input::read_sheet(input, sheet_name)?;
    let report = process_sheet(&mut sheet, column, first_row, &Classifier::new())?;
    Ok((sheet, report))
}

/// `standardise`: write the processed sheet to `output`, report bad entries on `report_to`.
pub fn run_standardise<W: Write>(
    input: &Path,
    output: &Path,
    sheet_name: &str,
    column: usize,
    first_row: usize,
    report_to: W,
) -> Result<SheetReport, Box<dyn Error>> {
    log::info!("#Start run_standardise({})", input.display());
    let (sheet, report) = standardise_sheet(input, sheet_name, column, first_row)?;
    output::write_sheet_file(&sheet, output)?;
    output::report_rejections(&report.rejected, report_to)?;
    Ok(report)
}

/// `json`: institution records to `out`, bad entries on `report_to`.
pub fn run_json<W: Write, R: Write>(
    input: &Path,
    sheet_name: &str,
    layout: &ColumnLayout,
    first_row: usize,
    out: W,
    report_to: R,
) -> Result<SheetReport, Box<dyn Error>> {
    log::info!("#Start run_json({})", input.display());
    let countries = CountryCodes::load()?;
    let (sheet, report) = standardise_sheet(input, sheet_name, layout.ip_range, first_row)?;
    let records = build_records(&sheet, &report, layout, &countries);
    output::write_records(&records, out)?;
    output::report_rejections(&report.rejected, report_to)?;
    Ok(report)
}
