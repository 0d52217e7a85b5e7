//! Cell values as read from a sheet.

/// A value stored in a sheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

/// The address column of a row, as handed to the text preprocessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCellValue {
    /// An integer, usually a dotted quad a spreadsheet stripped the dots from.
    Number(u64),
    Text(String),
}

impl CellValue {
    /// Integral non-negative numbers become [`RawCellValue::Number`], anything
    /// else is handed on as text.
    pub fn to_raw(&self) -> RawCellValue {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= u64::MAX as f64 => {
                RawCellValue::Number(*n as u64)
            }
            CellValue::Number(n) => RawCellValue::Text(n.to_string()),
            CellValue::Text(s) => RawCellValue::Text(s.clone()),
        }
    }

    /// Text form used when writing the cell back out.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for RawCellValue {
    fn from(s: &str) -> Self {
        RawCellValue::Text(s.to_string())
    }
}
