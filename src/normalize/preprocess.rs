//! Text preprocessing: turn a raw cell into candidate address tokens.

use crate::error::NormalizeError;
use crate::models::RawCellValue;

/// Whole-text replacements, applied top to bottom.
///
/// The words `to`/`and` become range and list separators, every dash-like
/// codepoint becomes an ASCII hyphen.
const SUBSTITUTIONS: [(&str, &str); 17] = [
    ("to", "-"),
    ("and", "&"),
    ("\u{002D}", "-"),
    ("\u{058A}", "-"),
    ("\u{05BE}", "-"),
    ("\u{1400}", "-"),
    ("\u{1806}", "-"),
    ("\u{2011}", "-"),
    ("\u{2012}", "-"),
    ("\u{2013}", "-"),
    ("\u{2014}", "-"),
    ("\u{2015}", "-"),
    ("\u{2E3A}", "-"),
    ("\u{2E3B}", "-"),
    ("\u{FE58}", "-"),
    ("\u{FE63}", "-"),
    ("\u{FF0D}", "-"),
];

const TOKEN_SEPARATORS: [char; 3] = [',', ';', '&'];

/// Smallest number that can be a dotted quad with its dots removed.
pub const MIN_DOTLESS_ADDRESS: u64 = 1_000_000_000;

/// Put the dots back into a number a spreadsheet made out of `a.bbb.ccc.ddd`.
///
/// Groups are `(n / unit) % 1000` for units 1e9, 1e6, 1e3 and 1.
pub fn recover_dotted_quad(n: u64) -> Result<String, NormalizeError> {
    if n < MIN_DOTLESS_ADDRESS {
        return Err(NormalizeError::NumberTooSmall(n));
    }
    let units = [1_000_000_000u64, 1_000_000, 1_000, 1];
    Ok(units
        .iter()
        .map(|unit| (n / unit % 1000).to_string())
        .collect::<Vec<_>>()
        .join("."))
}

/// Apply the substitution table.
pub fn substitute(text: &str) -> String {
    SUBSTITUTIONS
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(*from, to))
}

/// Split on `,` `;` `&`, trim, and drop empty pieces. Order is kept.
pub fn split_tokens(text: &str) -> Vec<String> {
    text.split(TOKEN_SEPARATORS)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

/// Candidate address tokens for one cell.
pub fn normalize(raw: &RawCellValue) -> Result<Vec<String>, NormalizeError> {
    let text = match raw {
        RawCellValue::Number(n) => recover_dotted_quad(*n)?,
        RawCellValue::Text(s) => s.clone(),
    };
    Ok(split_tokens(&substitute(&text)))
}
