//! Domain models for address standardisation.
//!
//! - [`CidrBlock`] - IPv4 network with prefix length
//! - [`CellValue`] and [`RawCellValue`] - sheet cell contents
//! - [`InstitutionRecord`] - one row of JSON output

mod cell;
mod cidr;
mod institution;

// Re-export public types
pub use cell::{CellValue, RawCellValue};
pub use cidr::{
    cut_addr, get_cidr_mask, lo_mask, parse_dotted_quad, parse_octet, CidrBlock, MAX_LENGTH,
};
pub use institution::{institution_uuid, InstitutionRecord};
