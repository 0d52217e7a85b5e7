//! Error types for address normalisation and sheet I/O.
//!
//! Normalisation errors are split in tiers: a [`ClassifyError`] that
//! [`is_rejection`](ClassifyError::is_rejection) is bad input and gets
//! recorded, everything else aborts the run.

use std::net::Ipv4Addr;
use thiserror::Error;

/// Problems with a single address or an address range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid octet {0:?}")]
    InvalidOctet(String),

    #[error("invalid address {0:?}")]
    InvalidAddress(String),

    #[error("invalid prefix length {0:?}")]
    InvalidPrefix(String),

    #[error("reversed range {start} > {end}")]
    Reversed { start: Ipv4Addr, end: Ipv4Addr },
}

/// The CIDR-range parser could not make sense of a literal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot parse {literal:?} as a CIDR range: {reason}")]
pub struct ParseCidrError {
    pub literal: String,
    pub reason: String,
}

impl ParseCidrError {
    pub fn new(literal: &str, reason: impl ToString) -> Self {
        ParseCidrError {
            literal: literal.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Failure to turn one token into CIDR blocks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// No shape in the catalogue matched.
    #[error("no recognised address shape in {token:?}")]
    Unrecognised { token: String },

    /// A shape matched but its numbers do not form a valid range.
    #[error("malformed range in {token:?}: {source}")]
    Malformed {
        token: String,
        #[source]
        source: RangeError,
    },

    /// A shape matched but the CIDR-range parser refused the literal.
    #[error("rejected {token:?}: {source}")]
    Unparseable {
        token: String,
        #[source]
        source: ParseCidrError,
    },

    /// The classifier itself is broken.
    #[error("classifier defect on {token:?}: {details}")]
    Internal { token: String, details: String },
}

impl ClassifyError {
    /// True for bad input, false for classifier defects.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, ClassifyError::Internal { .. })
    }

    pub fn token(&self) -> &str {
        match self {
            ClassifyError::Unrecognised { token }
            | ClassifyError::Malformed { token, .. }
            | ClassifyError::Unparseable { token, .. }
            | ClassifyError::Internal { token, .. } => token,
        }
    }
}

/// Errors that abort normalisation of a whole run.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A numeric cell too small to be a dotted quad with its dots stripped.
    #[error("spreadsheet number {0} is below 1000000000 and cannot hold an IPv4 address")]
    NumberTooSmall(u64),

    #[error(transparent)]
    Defect(ClassifyError),
}

/// Errors reading or writing a sheet.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing required part: {0}")]
    MissingPart(String),

    #[error("Sheet {0:?} not found")]
    UnknownSheet(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}
