//! Assemble institution records from processed rows.

use super::country::CountryCodes;
use super::sheet::SheetReport;
use crate::input::Sheet;
use crate::models::{institution_uuid, InstitutionRecord};

/// 1-based columns holding each institution field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub institution: usize,
    pub country: usize,
    pub contact: usize,
    pub ip_range: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout {
            institution: 1,
            country: 2,
            contact: 3,
            ip_range: 4,
        }
    }
}

/// One record per processed row, in row order.
pub fn build_records(
    sheet: &Sheet,
    report: &SheetReport,
    layout: &ColumnLayout,
    countries: &CountryCodes,
) -> Vec<InstitutionRecord> {
    report
        .rows
        .iter()
        .map(|row| {
            let institution = sheet.cell_text(row.row, layout.institution);
            let country = sheet.cell_text(row.row, layout.country);
            let country_code = country
                .as_deref()
                .and_then(|name| countries.alpha2(name))
                .map(String::from);
            if country.is_some() && country_code.is_none() {
                log::warn!("Row {}: unknown country {:?}", row.row, country);
            }

            InstitutionRecord {
                institution_uuid: institution.as_deref().map(institution_uuid),
                institution,
                country,
                contact: sheet.cell_text(row.row, layout.contact),
                ip_range: row.blocks.clone(),
                country_code,
            }
        })
        .collect()
}
