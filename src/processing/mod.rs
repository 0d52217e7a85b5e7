//! Sheet processing logic.
//!
//! - [`sheet`] - per-row normalisation and the rejection log
//! - [`institutions`] - institution records for JSON output
//! - [`country`] - ISO country-name lookup

mod country;
mod institutions;
mod sheet;

// Re-export public types and functions
pub use country::CountryCodes;
pub use institutions::{build_records, ColumnLayout};
pub use sheet::{process_sheet, screen_row, Rejected, RejectionLog, RowResult, SheetReport};
