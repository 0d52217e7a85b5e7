//! Address normalisation.
//!
//! - [`preprocess`] - raw cell to candidate tokens
//! - [`classify`] - token shape catalogue and expansion handlers
//! - [`expand`] - address range to minimal CIDR blocks
//! - [`parser`] - canonical CIDR-range parser

pub mod classify;
pub mod expand;
pub mod parser;
pub mod preprocess;

// Re-export public types and functions
pub use classify::{match_shape, Classifier, Shape};
pub use expand::range_to_cidrs;
pub use parser::{CidrRangeParser, StdCidrParser};
pub use preprocess::{normalize, recover_dotted_quad, split_tokens, substitute};
