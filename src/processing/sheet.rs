//! Row and sheet processing: one address cell per row to CIDR blocks.
//!
//! Bad tokens are collected per row and handed back in the [`SheetReport`];
//! a precondition failure or a classifier defect stops the run.

use crate::error::{ClassifyError, NormalizeError};
use crate::input::Sheet;
use crate::models::{CellValue, CidrBlock, RawCellValue};
use crate::normalize::{normalize, CidrRangeParser, Classifier};
use itertools::Itertools;

/// A token that could not be turned into CIDR blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    /// 1-based sheet row the token came from.
    pub row: usize,
    /// The token as it appeared after preprocessing.
    pub token: String,
    pub reason: String,
}

impl Rejected {
    fn new(row: usize, error: &ClassifyError) -> Self {
        Rejected {
            row,
            token: error.token().to_string(),
            reason: error.to_string(),
        }
    }
}

/// Append-only list of rejected tokens, in the order they were met.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RejectionLog {
    entries: Vec<Rejected>,
}

impl RejectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rejected: Rejected) {
        self.entries.push(rejected);
    }

    pub fn extend<I: IntoIterator<Item = Rejected>>(&mut self, rejected: I) {
        self.entries.extend(rejected);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rejected> {
        self.entries.iter()
    }
}

/// Outcome of one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowResult {
    pub row: usize,
    /// Blocks of every accepted token, concatenated in token order.
    pub blocks: Vec<CidrBlock>,
    pub rejected: Vec<Rejected>,
}

impl RowResult {
    /// Text written back next to the address cell.
    pub fn cidr_text(&self) -> String {
        self.blocks.iter().join(",")
    }
}

/// Outcome of a whole sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetReport {
    /// Processed rows in ascending order. Rows with an empty address cell are absent.
    pub rows: Vec<RowResult>,
    pub rejected: RejectionLog,
}

/// Normalise and classify one address cell.
pub fn screen_row<P: CidrRangeParser>(
    row: usize,
    raw: &RawCellValue,
    classifier: &Classifier<P>,
) -> Result<RowResult, NormalizeError> {
    let tokens = normalize(raw).map_err(|e| {
        log::error!("Row {row}: {e}");
        e
    })?;

    let mut result = RowResult {
        row,
        blocks: Vec::new(),
        rejected: Vec::new(),
    };
    for token in tokens {
        record_outcome(&mut result, classifier.classify(&token))?;
    }
    Ok(result)
}

/// Fold one token's classification into the row: blocks are kept, bad input
/// is recorded, a classifier defect stops the row.
fn record_outcome(
    result: &mut RowResult,
    outcome: Result<Vec<CidrBlock>, ClassifyError>,
) -> Result<(), NormalizeError> {
    match outcome {
        Ok(blocks) => result.blocks.extend(blocks),
        Err(e) if e.is_rejection() => {
            log::debug!("Row {}: rejected {:?}: {e}", result.row, e.token());
            result.rejected.push(Rejected::new(result.row, &e));
        }
        Err(e) => return Err(NormalizeError::Defect(e)),
    }
    Ok(())
}

/// Process every row from `first_row` to the last, reading the address from
/// `column` and writing the comma-joined CIDR blocks into `column + 1`.
pub fn process_sheet<P: CidrRangeParser>(
    sheet: &mut Sheet,
    column: usize,
    first_row: usize,
    classifier: &Classifier<P>,
) -> Result<SheetReport, NormalizeError> {
    log::info!(
        "#Start process_sheet({}) column={column} rows={}",
        sheet.name,
        sheet.max_row()
    );
    let mut report = SheetReport::default();

    for row in first_row.max(1)..=sheet.max_row() {
        let Some(raw) = sheet.cell(row, column).map(CellValue::to_raw) else {
            continue;
        };
        let result = screen_row(row, &raw, classifier)?;
        log::info!("Processed row {row}");

        sheet.set_cell(row, column + 1, CellValue::Text(result.cidr_text()));
        report.rejected.extend(result.rejected.iter().cloned());
        report.rows.push(result);
    }

    log::info!(
        "process_sheet({}) rows={} rejected={}",
        sheet.name,
        report.rows.len(),
        report.rejected.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(result: &RowResult) -> Vec<String> {
        result.blocks.iter().map(|b| b.to_string()).collect()
    }

    #[test]
    fn test_screen_row_mixed_cell() {
        let raw = RawCellValue::from("10.0.0.1, 192.168.1.1; 10.0.0.0/30");
        let result = screen_row(1, &raw, &Classifier::new()).unwrap();
        assert_eq!(blocks(&result), vec!["10.0.0.1/32", "10.0.0.0/30"]);
        assert!(result.rejected.is_empty());
        assert_eq!(result.cidr_text(), "10.0.0.1/32,10.0.0.0/30");
    }

    #[test]
    fn test_screen_row_keeps_rejected_token() {
        let raw = RawCellValue::from("not an ip at all; 131.111.8.*");
        let result = screen_row(7, &raw, &Classifier::new()).unwrap();
        assert_eq!(blocks(&result), vec!["131.111.8.0/24"]);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].row, 7);
        assert_eq!(result.rejected[0].token, "not an ip at all");
    }

    #[test]
    fn test_screen_row_number() {
        let raw = RawCellValue::Number(131111008042);
        let result = screen_row(2, &raw, &Classifier::new()).unwrap();
        assert_eq!(blocks(&result), vec!["131.111.8.42/32"]);
    }

    #[test]
    fn test_screen_row_small_number_aborts() {
        let err = screen_row(2, &RawCellValue::Number(12345), &Classifier::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::NumberTooSmall(12345)));
    }

    fn empty_row(row: usize) -> RowResult {
        RowResult {
            row,
            blocks: Vec::new(),
            rejected: Vec::new(),
        }
    }

    #[test]
    fn test_record_outcome_defect_aborts() {
        let mut result = empty_row(4);
        let defect = ClassifyError::Internal {
            token: "10.0.0.1".to_string(),
            details: "shape matched without capture group \"start\"".to_string(),
        };

        let err = record_outcome(&mut result, Err(defect.clone())).unwrap_err();
        assert!(matches!(err, NormalizeError::Defect(e) if e == defect));
        assert!(result.rejected.is_empty());
        assert!(result.blocks.is_empty());
    }

    #[test]
    fn test_record_outcome_rejection_recorded() {
        let mut result = empty_row(4);
        let bad = ClassifyError::Unrecognised {
            token: "nope".to_string(),
        };
        record_outcome(&mut result, Err(bad)).unwrap();
        record_outcome(&mut result, Ok(vec!["10.0.0.0/30".parse().unwrap()])).unwrap();

        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].row, 4);
        assert_eq!(result.rejected[0].token, "nope");
        assert_eq!(blocks(&result), vec!["10.0.0.0/30"]);
    }

    #[test]
    fn test_screen_row_private_only_is_empty() {
        let raw = RawCellValue::from("192.168.1.5");
        let result = screen_row(1, &raw, &Classifier::new()).unwrap();
        assert!(result.blocks.is_empty());
        assert!(result.rejected.is_empty());
        assert_eq!(result.cidr_text(), "");
    }

    #[test]
    fn test_process_sheet_writes_adjacent_column() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_cell(1, 1, CellValue::from("10.0.0.0-10.0.1.255"));
        sheet.set_cell(3, 1, CellValue::from("bogus, 10.1.2-4.*"));
        sheet.set_cell(4, 1, CellValue::from("192.168.0.1"));

        let report = process_sheet(&mut sheet, 1, 1, &Classifier::new()).unwrap();

        assert_eq!(report.rows.len(), 3);
        assert_eq!(
            report.rows.iter().map(|r| r.row).collect::<Vec<_>>(),
            vec![1, 3, 4]
        );
        assert_eq!(sheet.cell_text(1, 2).as_deref(), Some("10.0.0.0/23"));
        assert_eq!(sheet.cell(2, 2), None);
        assert_eq!(
            sheet.cell_text(3, 2).as_deref(),
            Some("10.1.2.0/23,10.1.4.0/24")
        );
        assert_eq!(sheet.cell_text(4, 2).as_deref(), Some(""));

        assert_eq!(report.rejected.len(), 1);
        let rejected: Vec<_> = report.rejected.iter().collect();
        assert_eq!(rejected[0].row, 3);
        assert_eq!(rejected[0].token, "bogus");
    }

    #[test]
    fn test_process_sheet_first_row_skips_header() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_cell(1, 1, CellValue::from("IP addresses"));
        sheet.set_cell(2, 1, CellValue::from("10.0.0.1"));

        let report = process_sheet(&mut sheet, 1, 2, &Classifier::new()).unwrap();
        assert!(report.rejected.is_empty());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(sheet.cell(1, 2), None);
    }

    #[test]
    fn test_process_sheet_precondition_aborts() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_cell(1, 1, CellValue::from("10.0.0.1"));
        sheet.set_cell(2, 1, CellValue::Number(42.0));

        let err = process_sheet(&mut sheet, 1, 1, &Classifier::new()).unwrap_err();
        assert!(matches!(err, NormalizeError::NumberTooSmall(42)));
    }
}
