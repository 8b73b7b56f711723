//! vCard value parsers.

use chrono::NaiveDate;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::vcard::core::{Address, Organization, StructuredName};

/// Unescapes a vCard text value.
///
/// vCard escapes: \n, \N (newline), \, (comma), \; (semicolon), \\ (backslash)
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('n' | 'N') => {
                    chars.next();
                    result.push('\n');
                }
                Some(&(escaped @ (',' | ';' | '\\'))) => {
                    chars.next();
                    result.push(escaped);
                }
                _ => result.push(c),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Splits a structured value on unescaped semicolons.
#[must_use]
pub fn split_structured(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ';' => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    parts.push(&s[start..]);
    parts
}

/// Splits a component value on unescaped commas, unescaping each part.
#[must_use]
pub fn split_component(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('n' | 'N') => {
                    chars.next();
                    current.push('\n');
                }
                Some(&(escaped @ (',' | ';' | '\\'))) => {
                    chars.next();
                    current.push(escaped);
                }
                _ => current.push(c),
            }
        } else if c == ',' {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    parts.push(current);
    parts
}

fn component(parts: &[&str], index: usize) -> Vec<String> {
    parts
        .get(index)
        .map(|s| split_component(s))
        .unwrap_or_default()
}

/// Parses a structured name (N property).
///
/// N has 5 components: family;given;additional;prefixes;suffixes
///
/// ## Errors
/// Returns an error if the value has more than five components.
pub fn parse_structured_name(value: &str, line_num: usize) -> ParseResult<StructuredName> {
    let parts = split_structured(value);
    if parts.len() > 5 {
        return Err(ParseError::invalid_value(
            line_num,
            format!("N has {} components, expected at most 5", parts.len()),
        ));
    }

    Ok(StructuredName {
        family: component(&parts, 0),
        given: component(&parts, 1),
        additional: component(&parts, 2),
        prefixes: component(&parts, 3),
        suffixes: component(&parts, 4),
    })
}

/// Parses an address (ADR property).
///
/// ADR has 7 components: PO Box;Extended;Street;Locality;Region;PostalCode;Country
///
/// ## Errors
/// Returns an error if the value has more than seven components.
pub fn parse_address(value: &str, line_num: usize) -> ParseResult<Address> {
    let parts = split_structured(value);
    if parts.len() > 7 {
        return Err(ParseError::invalid_value(
            line_num,
            format!("ADR has {} components, expected at most 7", parts.len()),
        ));
    }

    Ok(Address {
        po_box: component(&parts, 0),
        extended: component(&parts, 1),
        street: component(&parts, 2),
        locality: component(&parts, 3),
        region: component(&parts, 4),
        postal_code: component(&parts, 5),
        country: component(&parts, 6),
    })
}

/// Parses an organization (ORG property).
#[must_use]
pub fn parse_organization(value: &str) -> Organization {
    let parts = split_structured(value);

    let name = parts.first().map(|s| unescape_text(s)).unwrap_or_default();
    let units = parts.iter().skip(1).map(|s| unescape_text(s)).collect();

    Organization { name, units }
}

/// Parses a calendar date (BDAY).
///
/// Accepts `YYYY-MM-DD`, `YYYYMMDD`, and date-times whose date part is one of
/// those. Truncated forms without a year (`--MMDD`) cannot be represented as a
/// full date and are rejected.
///
/// ## Errors
/// Returns an error if the value is not a complete calendar date.
pub fn parse_date(value: &str, line_num: usize) -> ParseResult<NaiveDate> {
    let s = value.trim();
    let date_part = s.split_once('T').map_or(s, |(date, _)| date);

    let invalid = |reason: &str| {
        ParseError::new(
            ParseErrorKind::InvalidDate,
            line_num,
            format!("not a complete date: {s} ({reason})"),
        )
    };

    if date_part.starts_with("--") {
        return Err(invalid("no year"));
    }

    let extended = if date_part.len() == 8 && date_part.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &date_part[..4], &date_part[4..6], &date_part[6..])
    } else {
        date_part.to_string()
    };

    NaiveDate::parse_from_str(&extended, "%Y-%m-%d").map_err(|err| invalid(&err.to_string()))
}
