//! Shape classification of address tokens.
//!
//! A token is matched against [`Shape::CATALOGUE`] top to bottom and the
//! first shape found anywhere in it decides how it is expanded. Order is
//! priority: specific shapes sit above the general ones that would match a
//! substring of them.

use super::expand::range_to_cidrs;
use super::parser::{CidrRangeParser, StdCidrParser};
use crate::error::{ClassifyError, RangeError};
use crate::models::{parse_dotted_quad, CidrBlock};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// The ways people have written an address or range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `192.168.x.y`, dropped on purpose
    PrivateNetwork,
    /// `a.b.c.d-e.f.g.h`
    HyphenRange,
    /// `a.b.c.d/n`
    Cidr,
    /// `a.b.c-d.*`
    ThirdOctetWildcard,
    /// `a.b.c-d.e`
    ThirdOctetRange,
    /// `a.b.c.*`
    Wildcard,
    /// `a.b.(c-d).(e-f)`
    DoubleBracket,
    /// `a.b.c.d-e`
    FourthOctetRange,
    /// `a.b.c.d[e-f]`
    SquareBracket,
    /// `a.b.c.[e-f]`
    SquareBracketFourth,
    /// `a.b.c.d`
    DottedQuad,
}

/// What to do with the text a shape matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expansion {
    Drop,
    FullRange,
    ThirdOctet,
    DoubleBracket,
    Parser,
}

impl Shape {
    /// Every shape in match priority order.
    pub const CATALOGUE: [Shape; 11] = [
        Shape::PrivateNetwork,
        Shape::HyphenRange,
        Shape::Cidr,
        Shape::ThirdOctetWildcard,
        Shape::ThirdOctetRange,
        Shape::Wildcard,
        Shape::DoubleBracket,
        Shape::FourthOctetRange,
        Shape::SquareBracket,
        Shape::SquareBracketFourth,
        Shape::DottedQuad,
    ];

    fn pattern(self) -> &'static str {
        match self {
            Shape::PrivateNetwork => r"192\.168\..*\..*",
            Shape::HyphenRange => {
                r"(?P<start>[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})-(?P<end>[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3})"
            }
            Shape::Cidr => r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}/[0-9]{1,2}",
            Shape::ThirdOctetWildcard => {
                r"(?P<prefix>[0-9]{1,3}\.[0-9]{1,3})\.(?P<lo>[0-9]{1,3})-(?P<hi>[0-9]{1,3})\.(?P<last>\*)"
            }
            Shape::ThirdOctetRange => {
                r"(?P<prefix>[0-9]{1,3}\.[0-9]{1,3})\.(?P<lo>[0-9]{1,3})-(?P<hi>[0-9]{1,3})\.(?P<last>[0-9]{1,3})"
            }
            Shape::Wildcard => r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.\*",
            Shape::DoubleBracket => {
                r"(?P<prefix>[0-9]{1,3}\.[0-9]{1,3})\.\((?P<lo3>[0-9]{1,3})-(?P<hi3>[0-9]{1,3})\)\.\((?P<lo4>[0-9]{1,3})-(?P<hi4>[0-9]{1,3})\)"
            }
            Shape::FourthOctetRange => {
                r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}-[0-9]{1,3}"
            }
            Shape::SquareBracket => {
                r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]\[[0-9]{1,3}-[0-9]{1,3}\]"
            }
            Shape::SquareBracketFourth => {
                r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.\[[0-9]{1,3}-[0-9]{1,3}\]"
            }
            Shape::DottedQuad => r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}",
        }
    }

    fn expansion(self) -> Expansion {
        match self {
            Shape::PrivateNetwork => Expansion::Drop,
            Shape::HyphenRange => Expansion::FullRange,
            Shape::ThirdOctetWildcard | Shape::ThirdOctetRange => Expansion::ThirdOctet,
            Shape::DoubleBracket => Expansion::DoubleBracket,
            Shape::Cidr
            | Shape::Wildcard
            | Shape::FourthOctetRange
            | Shape::SquareBracket
            | Shape::SquareBracketFourth
            | Shape::DottedQuad => Expansion::Parser,
        }
    }
}

lazy_static! {
    static ref SHAPE_PATTERNS: Vec<(Shape, Regex)> = Shape::CATALOGUE
        .iter()
        .map(|shape| (*shape, Regex::new(shape.pattern()).expect("Invalid Regex?")))
        .collect();
}

/// Find the first catalogue shape in `token` (whitespace already removed).
pub fn match_shape(token: &str) -> Option<(Shape, Captures<'_>)> {
    SHAPE_PATTERNS
        .iter()
        .find_map(|(shape, pattern)| pattern.captures(token).map(|caps| (*shape, caps)))
}

/// Turns address tokens into CIDR blocks.
#[derive(Debug, Default, Clone)]
pub struct Classifier<P = StdCidrParser> {
    parser: P,
}

impl Classifier<StdCidrParser> {
    pub fn new() -> Self {
        Classifier {
            parser: StdCidrParser,
        }
    }
}

impl<P: CidrRangeParser> Classifier<P> {
    pub fn with_parser(parser: P) -> Self {
        Classifier { parser }
    }

    /// CIDR blocks for one token. Private addresses give an empty list.
    ///
    /// Errors carry the token as given. [`ClassifyError::Internal`] means the
    /// classifier is broken and is logged here before being returned.
    pub fn classify(&self, token: &str) -> Result<Vec<CidrBlock>, ClassifyError> {
        let compact: String = token.chars().filter(|c| !c.is_whitespace()).collect();

        let Some((shape, caps)) = match_shape(&compact) else {
            log::debug!("classify({token:?}) no shape matched");
            return Err(ClassifyError::Unrecognised {
                token: token.to_string(),
            });
        };
        log::debug!(
            "classify({token:?}) matched {shape:?} on {:?}",
            &caps[0]
        );

        let result = self.expand(shape, &caps, token);
        if let Err(e @ ClassifyError::Internal { .. }) = &result {
            log::error!("Unhandled classifier error: {e}");
        }
        result
    }

    fn expand(
        &self,
        shape: Shape,
        caps: &Captures,
        token: &str,
    ) -> Result<Vec<CidrBlock>, ClassifyError> {
        let malformed = |source: RangeError| ClassifyError::Malformed {
            token: token.to_string(),
            source,
        };

        match shape.expansion() {
            Expansion::Drop => Ok(Vec::new()),
            Expansion::FullRange => {
                let start = parse_dotted_quad(group(caps, "start", token)?).map_err(malformed)?;
                let end = parse_dotted_quad(group(caps, "end", token)?).map_err(malformed)?;
                range_to_cidrs(start, end).map_err(malformed)
            }
            Expansion::ThirdOctet => third_octet(caps, token).map_err(malformed_or_defect(token)),
            Expansion::DoubleBracket => {
                double_bracket(caps, token).map_err(malformed_or_defect(token))
            }
            Expansion::Parser => {
                let literal = group_at(caps, 0, token)?;
                self.parser
                    .parse(literal)
                    .map_err(|source| ClassifyError::Unparseable {
                        token: token.to_string(),
                        source,
                    })
            }
        }
    }
}

/// Errors from the range handlers: bad numbers or a missing capture group.
enum HandlerError {
    Range(RangeError),
    Defect(ClassifyError),
}

impl From<RangeError> for HandlerError {
    fn from(e: RangeError) -> Self {
        HandlerError::Range(e)
    }
}

impl From<ClassifyError> for HandlerError {
    fn from(e: ClassifyError) -> Self {
        HandlerError::Defect(e)
    }
}

fn malformed_or_defect(token: &str) -> impl Fn(HandlerError) -> ClassifyError + '_ {
    move |e| match e {
        HandlerError::Range(source) => ClassifyError::Malformed {
            token: token.to_string(),
            source,
        },
        HandlerError::Defect(defect) => defect,
    }
}

/// `a.b.c-d.*` is `a.b.c.0`..`a.b.d.255`, `a.b.c-d.e` is `a.b.c.e`..`a.b.d.e`.
fn third_octet(caps: &Captures, token: &str) -> Result<Vec<CidrBlock>, HandlerError> {
    let prefix = group(caps, "prefix", token)?;
    let lo = group(caps, "lo", token)?;
    let hi = group(caps, "hi", token)?;
    let last = group(caps, "last", token)?;

    let (first_last, end_last) = if last == "*" { ("0", "255") } else { (last, last) };
    let start = parse_dotted_quad(&format!("{prefix}.{lo}.{first_last}"))?;
    let end = parse_dotted_quad(&format!("{prefix}.{hi}.{end_last}"))?;
    Ok(range_to_cidrs(start, end)?)
}

/// `a.b.(c-d).(e-f)` is the linear range `a.b.c.e`..`a.b.d.f`.
///
/// This is not the cartesian product of the two octet ranges; it matches
/// how these entries have always been read.
fn double_bracket(caps: &Captures, token: &str) -> Result<Vec<CidrBlock>, HandlerError> {
    let prefix = group(caps, "prefix", token)?;
    let start = parse_dotted_quad(&format!(
        "{prefix}.{}.{}",
        group(caps, "lo3", token)?,
        group(caps, "lo4", token)?
    ))?;
    let end = parse_dotted_quad(&format!(
        "{prefix}.{}.{}",
        group(caps, "hi3", token)?,
        group(caps, "hi4", token)?
    ))?;
    Ok(range_to_cidrs(start, end)?)
}

fn group<'t>(caps: &Captures<'t>, name: &str, token: &str) -> Result<&'t str, ClassifyError> {
    caps.name(name)
        .map(|m| m.as_str())
        .ok_or_else(|| ClassifyError::Internal {
            token: token.to_string(),
            details: format!("shape matched without capture group {name:?}"),
        })
}

fn group_at<'t>(caps: &Captures<'t>, index: usize, token: &str) -> Result<&'t str, ClassifyError> {
    caps.get(index)
        .map(|m| m.as_str())
        .ok_or_else(|| ClassifyError::Internal {
            token: token.to_string(),
            details: format!("shape matched without capture group {index}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseCidrError;

    fn classify(token: &str) -> Vec<String> {
        Classifier::new()
            .classify(token)
            .unwrap_or_else(|e| panic!("{token}: {e}"))
            .iter()
            .map(|b| b.to_string())
            .collect()
    }

    fn shape_of(token: &str) -> Option<Shape> {
        match_shape(token).map(|(shape, _)| shape)
    }

    #[test]
    fn test_catalogue_order() {
        assert_eq!(shape_of("192.168.1.5"), Some(Shape::PrivateNetwork));
        assert_eq!(shape_of("10.0.0.1-10.0.0.9"), Some(Shape::HyphenRange));
        assert_eq!(shape_of("10.0.0.0/30"), Some(Shape::Cidr));
        assert_eq!(shape_of("10.1.2-4.*"), Some(Shape::ThirdOctetWildcard));
        assert_eq!(shape_of("10.1.2-4.7"), Some(Shape::ThirdOctetRange));
        assert_eq!(shape_of("10.1.2.*"), Some(Shape::Wildcard));
        assert_eq!(shape_of("10.1.(2-3).(0-255)"), Some(Shape::DoubleBracket));
        assert_eq!(shape_of("10.1.2.3-9"), Some(Shape::FourthOctetRange));
        assert_eq!(shape_of("10.1.2.1[0-9]"), Some(Shape::SquareBracket));
        assert_eq!(shape_of("10.1.2.[0-9]"), Some(Shape::SquareBracketFourth));
        assert_eq!(shape_of("10.1.2.3"), Some(Shape::DottedQuad));
        assert_eq!(shape_of("not an ip"), None);
    }

    #[test]
    fn test_shape_found_inside_noise() {
        assert_eq!(shape_of("EZProxyIP10.1.2.3"), Some(Shape::DottedQuad));
        assert_eq!(classify("(10.0.0.0/30)"), vec!["10.0.0.0/30"]);
        assert_eq!(classify("host 10.1.2.3 only"), vec!["10.1.2.3/32"]);
    }

    #[test]
    fn test_private_network_dropped() {
        assert_eq!(classify("192.168.1.5"), Vec::<String>::new());
        assert_eq!(classify("192.168.0.0/16"), Vec::<String>::new());
    }

    #[test]
    fn test_hyphen_range() {
        assert_eq!(classify("10.0.0.0-10.0.1.255"), vec!["10.0.0.0/23"]);
        assert_eq!(classify("10.0.0.0 - 10.0.1.255"), vec!["10.0.0.0/23"]);
    }

    #[test]
    fn test_third_octet_wildcard() {
        assert_eq!(classify("10.1.2-4.*"), vec!["10.1.2.0/23", "10.1.4.0/24"]);
    }

    #[test]
    fn test_third_octet_range() {
        // 10.1.2.7 .. 10.1.3.7
        assert_eq!(
            classify("10.1.2-3.7"),
            vec![
                "10.1.2.7/32",
                "10.1.2.8/29",
                "10.1.2.16/28",
                "10.1.2.32/27",
                "10.1.2.64/26",
                "10.1.2.128/25",
                "10.1.3.0/29"
            ]
        );
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(classify("131.111.8.*"), vec!["131.111.8.0/24"]);
    }

    #[test]
    fn test_double_bracket_is_linear() {
        assert_eq!(classify("10.1.(2-3).(0-255)"), vec!["10.1.2.0/23"]);
        assert_eq!(
            classify("10.1.(2-3).(128-127)"),
            vec!["10.1.2.128/25", "10.1.3.0/25"]
        );
    }

    #[test]
    fn test_fourth_octet_and_brackets() {
        assert_eq!(classify("10.1.2.4-7"), vec!["10.1.2.4/30"]);
        assert_eq!(classify("10.1.2.2[0-3]"), vec!["10.1.2.20/30"]);
        assert_eq!(classify("10.1.2.[64-127]"), vec!["10.1.2.64/26"]);
    }

    #[test]
    fn test_unrecognised_keeps_token() {
        let err = Classifier::new().classify("not an ip at all").unwrap_err();
        assert_eq!(
            err,
            ClassifyError::Unrecognised {
                token: "not an ip at all".to_string()
            }
        );
        assert!(err.is_rejection());
    }

    #[test]
    fn test_reversed_range_is_rejection() {
        let err = Classifier::new().classify("10.0.1.0-10.0.0.0").unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Malformed {
                source: RangeError::Reversed { .. },
                ..
            }
        ));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_out_of_range_octet_is_rejection() {
        let err = Classifier::new().classify("10.1.2-300.*").unwrap_err();
        assert!(matches!(err, ClassifyError::Malformed { .. }));
        let err = Classifier::new().classify("10.1.2.999").unwrap_err();
        assert!(matches!(err, ClassifyError::Unparseable { .. }));
        assert_eq!(err.token(), "10.1.2.999");
    }

    struct RefusingParser;

    impl CidrRangeParser for RefusingParser {
        fn parse(&self, literal: &str) -> Result<Vec<CidrBlock>, ParseCidrError> {
            Err(ParseCidrError::new(literal, "refused"))
        }
    }

    #[test]
    fn test_parser_is_pluggable() {
        let classifier = Classifier::with_parser(RefusingParser);
        let err = classifier.classify("10.1.2.3").unwrap_err();
        assert!(matches!(err, ClassifyError::Unparseable { .. }));
        // handled without the parser
        assert_eq!(
            classifier.classify("10.1.2-3.*").unwrap(),
            vec!["10.1.2.0/23".parse::<CidrBlock>().unwrap()]
        );
    }
}
