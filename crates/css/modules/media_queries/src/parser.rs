//! Media query parsing.
//! Spec: <https://www.w3.org/TR/mediaqueries-4/#mq-syntax>
//!
//! Splitting happens on raw text at parenthesis depth zero: commas first, then
//! ` and `, then a leading `not`. Because of that order `not A and B` parses as
//! `(not A) and B`. Only a single parenthesised clause is handed to `cssparser`.

use crate::{FeatureName, FeatureValue, MediaFeature, MediaQuery, ParseError, RangeKind};
use cssparser::{ParseError as CssParseError, ParseErrorKind, Parser, ParserInput, Token};
use log::trace;

/// Media types that may prefix a query. They do not affect evaluation.
const MEDIA_TYPES: [&str; 3] = ["screen", "all", "print"];

/// Length units accepted after a `width`/`height` value. The number is used as-is.
const LENGTH_UNITS: [&str; 3] = ["px", "em", "rem"];

/// Why a single clause was rejected by the token-level parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClauseError {
    UnknownFeature,
    BadValue,
}

fn clause_error<'i>(input: &Parser<'i, '_>, kind: ClauseError) -> CssParseError<'i, ClauseError> {
    input.new_custom_error(kind)
}

/// Parse a media query list into a predicate tree.
///
/// # Errors
/// Returns a [`ParseError`] naming the first offending fragment when any part of
/// the query is empty, names an unsupported feature, or is not a `(feature: value)` clause.
pub fn parse_media_query(input: &str) -> Result<MediaQuery, ParseError> {
    let parsed = parse_query_text(input);
    trace!("parsed media query {input:?}: {parsed:?}");
    parsed
}

fn parse_query_text(text: &str) -> Result<MediaQuery, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    if is_bare_media_type(trimmed) {
        return Ok(MediaQuery::AllMedia);
    }
    let remainder = strip_media_type_prefix(trimmed);

    if let Some(parts) = split_top_level(remainder, ",") {
        return fold_parts(&parts, MediaQuery::or);
    }
    if let Some(parts) = split_top_level(remainder, " and ") {
        return fold_parts(&parts, MediaQuery::and);
    }
    if let Some(operand) = strip_keyword(remainder, "not").and_then(skip_required_whitespace) {
        return parse_query_text(operand).map(MediaQuery::negate);
    }
    parse_feature_clause(remainder)
}

/// Parse every part and left-fold with `combine`. Any failing part fails the whole.
fn fold_parts(
    parts: &[&str],
    combine: fn(MediaQuery, MediaQuery) -> MediaQuery,
) -> Result<MediaQuery, ParseError> {
    let mut folded: Option<MediaQuery> = None;
    for part in parts {
        let node = parse_query_text(part)?;
        folded = Some(match folded {
            Some(acc) => combine(acc, node),
            None => node,
        });
    }
    folded.ok_or(ParseError::Empty)
}

fn is_bare_media_type(text: &str) -> bool {
    MEDIA_TYPES
        .iter()
        .any(|media_type| text.eq_ignore_ascii_case(media_type))
}

/// Strip a leading `<media-type> and ` prefix, if present.
fn strip_media_type_prefix(text: &str) -> &str {
    for media_type in MEDIA_TYPES {
        if let Some(rest) = strip_keyword(text, media_type)
            .and_then(skip_required_whitespace)
            .and_then(|rest| strip_keyword(rest, "and"))
            .and_then(skip_required_whitespace)
        {
            return rest;
        }
    }
    text
}

/// ASCII case-insensitive prefix strip.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if head.eq_ignore_ascii_case(keyword) {
        text.get(keyword.len()..)
    } else {
        None
    }
}

/// Requires at least one whitespace character, then skips all of them.
fn skip_required_whitespace(text: &str) -> Option<&str> {
    text.starts_with(char::is_whitespace)
        .then(|| text.trim_start())
}

/// Split `text` on `separator` (ASCII case-insensitive) wherever the parenthesis
/// depth is zero. Returns `None` when the separator never occurs at the top level.
pub(crate) fn split_top_level<'a>(text: &'a str, separator: &str) -> Option<Vec<&'a str>> {
    let bytes = text.as_bytes();
    let separator_bytes = separator.as_bytes();
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    let mut index = 0;

    while let Some(&byte) = bytes.get(index) {
        match byte {
            b'(' => depth = depth.saturating_add(1),
            b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        let at_separator = depth == 0
            && bytes
                .get(index..index.saturating_add(separator_bytes.len()))
                .is_some_and(|window| window.eq_ignore_ascii_case(separator_bytes));
        if at_separator {
            parts.push(text.get(start..index)?);
            index = index.saturating_add(separator_bytes.len());
            start = index;
        } else {
            index = index.saturating_add(1);
        }
    }

    if parts.is_empty() {
        return None;
    }
    parts.push(text.get(start..)?);
    Some(parts)
}

/// Parse one `(feature: value)` clause.
fn parse_feature_clause(clause: &str) -> Result<MediaQuery, ParseError> {
    let clause = clause.trim();
    let mut input = ParserInput::new(clause);
    let mut parser = Parser::new(&mut input);
    parse_clause_tokens(&mut parser)
        .map(MediaQuery::Feature)
        .map_err(|error| match error.kind {
            ParseErrorKind::Custom(ClauseError::UnknownFeature) => {
                ParseError::UnsupportedFeature {
                    fragment: clause.to_owned(),
                }
            }
            ParseErrorKind::Custom(ClauseError::BadValue) | ParseErrorKind::Basic(_) => {
                ParseError::Malformed {
                    fragment: clause.to_owned(),
                }
            }
        })
}

fn parse_clause_tokens<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<MediaFeature, CssParseError<'i, ClauseError>> {
    parser.expect_parenthesis_block()?;
    let feature = parser.parse_nested_block(parse_feature_body)?;
    parser.expect_exhausted()?;
    Ok(feature)
}

/// Parse the inside of a clause: `<name> : <value>`.
fn parse_feature_body<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<MediaFeature, CssParseError<'i, ClauseError>> {
    let ident = input.expect_ident()?.to_ascii_lowercase();
    let (range, name) = split_range_prefix(&ident)
        .ok_or_else(|| clause_error(input, ClauseError::UnknownFeature))?;
    input.expect_colon()?;
    let value = match name {
        FeatureName::Width | FeatureName::Height => parse_length_value(input)?,
        FeatureName::AspectRatio => parse_ratio_value(input)?,
        FeatureName::Orientation
        | FeatureName::Hover
        | FeatureName::Pointer
        | FeatureName::PrefersColorScheme
        | FeatureName::PrefersReducedMotion
        | FeatureName::PrefersContrast => parse_keyword_value(input, name)?,
    };
    Ok(MediaFeature { name, range, value })
}

/// Split `min-`/`max-` off a feature name. Only range features accept a prefix.
fn split_range_prefix(ident: &str) -> Option<(RangeKind, FeatureName)> {
    let (range, base) = if let Some(rest) = ident.strip_prefix("min-") {
        (RangeKind::Min, rest)
    } else if let Some(rest) = ident.strip_prefix("max-") {
        (RangeKind::Max, rest)
    } else {
        (RangeKind::Exact, ident)
    };
    let name = FeatureName::from_ident(base)?;
    (range == RangeKind::Exact || name.is_range()).then_some((range, name))
}

/// `<number>` optionally followed by `px`, `em` or `rem`. Units are not converted.
fn parse_length_value<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<FeatureValue, CssParseError<'i, ClauseError>> {
    let length = match *input.next()? {
        Token::Number {
            has_sign: false,
            value,
            ..
        } => Some(value),
        Token::Dimension {
            has_sign: false,
            value,
            ref unit,
            ..
        } if LENGTH_UNITS
            .iter()
            .any(|known| unit.eq_ignore_ascii_case(known)) =>
        {
            Some(value)
        }
        _ => None,
    };
    length
        .filter(|value| *value >= 0.0)
        .map(FeatureValue::Number)
        .ok_or_else(|| clause_error(input, ClauseError::BadValue))
}

/// `<int> / <int>`, divided out into a single number.
fn parse_ratio_value<'i>(
    input: &mut Parser<'i, '_>,
) -> Result<FeatureValue, CssParseError<'i, ClauseError>> {
    let numerator = parse_ratio_term(input)?;
    input.expect_delim('/')?;
    let denominator = parse_ratio_term(input)?;
    if denominator == 0 {
        return Err(clause_error(input, ClauseError::BadValue));
    }
    Ok(FeatureValue::Number(numerator as f32 / denominator as f32))
}

fn parse_ratio_term<'i>(input: &mut Parser<'i, '_>) -> Result<i32, CssParseError<'i, ClauseError>> {
    let term = match *input.next()? {
        Token::Number {
            has_sign: false,
            int_value: Some(int_value),
            ..
        } => Some(int_value),
        _ => None,
    };
    term.filter(|int_value| *int_value >= 0)
        .ok_or_else(|| clause_error(input, ClauseError::BadValue))
}

fn parse_keyword_value<'i>(
    input: &mut Parser<'i, '_>,
    name: FeatureName,
) -> Result<FeatureValue, CssParseError<'i, ClauseError>> {
    let keyword = input.expect_ident()?.to_ascii_lowercase();
    if name.keywords().contains(&keyword.as_str()) {
        Ok(FeatureValue::Keyword(keyword))
    } else {
        Err(clause_error(input, ClauseError::BadValue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_respects_parenthesis_depth() {
        let parts = split_top_level("(a, b), (c)", ",");
        assert_eq!(parts, Some(vec!["(a, b)", " (c)"]));
    }

    #[test]
    fn split_is_case_insensitive() {
        let parts = split_top_level("(a) AND (b) and (c)", " and ");
        assert_eq!(parts, Some(vec!["(a)", "(b)", "(c)"]));
    }

    #[test]
    fn split_without_separator_is_none() {
        assert_eq!(split_top_level("(min-width: 5px)", ","), None);
        assert_eq!(split_top_level("(a and b)", " and "), None);
    }

    #[test]
    fn media_type_prefix_is_stripped() {
        assert_eq!(strip_media_type_prefix("screen and (a)"), "(a)");
        assert_eq!(strip_media_type_prefix("PRINT   and   (a)"), "(a)");
        assert_eq!(strip_media_type_prefix("screenand (a)"), "screenand (a)");
        assert_eq!(strip_media_type_prefix("(a)"), "(a)");
    }

    #[test]
    fn range_prefix_only_on_range_features() {
        assert_eq!(
            split_range_prefix("min-width"),
            Some((RangeKind::Min, FeatureName::Width))
        );
        assert_eq!(
            split_range_prefix("max-aspect-ratio"),
            Some((RangeKind::Max, FeatureName::AspectRatio))
        );
        assert_eq!(split_range_prefix("min-orientation"), None);
        assert_eq!(split_range_prefix("color"), None);
    }
}
