//! Command line and defaults.
//!
//! Every `json` option can also come from the environment, which `main`
//! fills from a `.env` file when one is present.

use crate::processing::ColumnLayout;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const SHEET_NAME: &str = "Sheet1";
pub const INSTITUTION_COL: u32 = 1;
pub const COUNTRY_COL: u32 = 2;
pub const CONTACT_COL: u32 = 3;
pub const IP_COL: u32 = 4;
pub const FIRST_ROW: u32 = 1;

/// Log config file looked for in the working directory.
pub const LOG_CONFIG_FILE: &str = "log4rs.yml";

#[derive(Parser, Debug)]
#[command(name = "standardise-ip")]
#[command(
    author,
    version,
    about = "Normalise free-text IPv4 addresses and ranges into CIDR blocks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the sheet with CIDR blocks next to the address column, then list bad entries
    Standardise {
        /// Input spreadsheet (xlsx or csv)
        input: PathBuf,

        /// Output CSV file
        output: PathBuf,

        /// Sheet to read
        sheet: String,

        /// Column holding the addresses (1-based)
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        column: u32,

        /// First row to process (1-based)
        #[arg(long, env = "STANDARDISE_FIRST_ROW", default_value_t = FIRST_ROW,
              value_parser = clap::value_parser!(u32).range(1..))]
        first_row: u32,
    },

    /// Print one JSON object per institution row
    Json {
        /// Input spreadsheet (xlsx or csv)
        input: PathBuf,

        #[arg(long, env = "STANDARDISE_SHEET", default_value = SHEET_NAME)]
        sheet: String,

        #[arg(long, env = "STANDARDISE_INSTITUTION_COL", default_value_t = INSTITUTION_COL,
              value_parser = clap::value_parser!(u32).range(1..))]
        institution_col: u32,

        #[arg(long, env = "STANDARDISE_COUNTRY_COL", default_value_t = COUNTRY_COL,
              value_parser = clap::value_parser!(u32).range(1..))]
        country_col: u32,

        #[arg(long, env = "STANDARDISE_CONTACT_COL", default_value_t = CONTACT_COL,
              value_parser = clap::value_parser!(u32).range(1..))]
        contact_col: u32,

        #[arg(long, env = "STANDARDISE_IP_COL", default_value_t = IP_COL,
              value_parser = clap::value_parser!(u32).range(1..))]
        ip_col: u32,

        /// First row to process (1-based)
        #[arg(long, env = "STANDARDISE_FIRST_ROW", default_value_t = FIRST_ROW,
              value_parser = clap::value_parser!(u32).range(1..))]
        first_row: u32,
    },
}

/// Column layout from `json` options.
pub fn column_layout(institution: u32, country: u32, contact: u32, ip_range: u32) -> ColumnLayout {
    ColumnLayout {
        institution: institution as usize,
        country: country as usize,
        contact: contact as usize,
        ip_range: ip_range as usize,
    }
}
