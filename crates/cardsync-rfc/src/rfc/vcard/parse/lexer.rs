//! vCard lexer for line unfolding and content line parsing.
//!
//! vCard uses the same folding/unfolding rules as iCalendar (RFC 5545 §3.1).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::vcard::core::VCardParameter;

/// Unfolds a vCard document by removing line continuations.
///
/// Line continuations are CRLF followed by a single space or tab.
/// Also handles bare LF for lenient parsing. Every logical line in the
/// output ends in a bare LF.
#[must_use]
pub fn unfold(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
                if matches!(chars.peek(), Some(' ' | '\t')) {
                    chars.next();
                } else {
                    result.push('\n');
                }
            } else {
                result.push(c);
            }
        } else if c == '\n' {
            if matches!(chars.peek(), Some(' ' | '\t')) {
                chars.next();
            } else {
                result.push('\n');
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// One unfolded line with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub number: usize,
    pub text: String,
}

/// Unfolds `input` and splits it into non-blank logical lines.
///
/// A quoted-printable value ending in a soft line break (`=`) continues on
/// the next physical line even without leading whitespace (vCard 2.1). The
/// break is kept as CRLF inside the joined line so the value still decodes.
#[must_use]
pub fn logical_lines(input: &str) -> Vec<LogicalLine> {
    let mut lines: Vec<LogicalLine> = Vec::new();
    let mut soft_break = false;

    for (idx, text) in unfold(input).split('\n').enumerate() {
        if soft_break && let Some(last) = lines.last_mut() {
            last.text.push_str("\r\n");
            last.text.push_str(text);
            soft_break = ends_with_soft_break(&last.text);
            continue;
        }
        if text.trim().is_empty() {
            continue;
        }
        soft_break = ends_with_soft_break(text);
        lines.push(LogicalLine {
            number: idx + 1,
            text: text.to_string(),
        });
    }

    lines
}

fn ends_with_soft_break(line: &str) -> bool {
    line.trim_end().ends_with('=') && is_quoted_printable(line)
}

/// Whether the line header declares `ENCODING=QUOTED-PRINTABLE`, or the bare
/// vCard 2.1 `QUOTED-PRINTABLE` parameter.
fn is_quoted_printable(line: &str) -> bool {
    let header = line.split_once(':').map_or(line, |(header, _)| header);
    header.split(';').skip(1).any(|param| {
        let value = match param.split_once('=') {
            Some((name, value)) if name.trim().eq_ignore_ascii_case("ENCODING") => value,
            Some(_) => "",
            None => param,
        };
        value.trim().eq_ignore_ascii_case("QUOTED-PRINTABLE")
    })
}

/// A parsed content line before value interpretation.
#[derive(Debug, Clone)]
pub struct ContentLine {
    /// Property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name (uppercase).
    pub name: String,
    /// Parameters.
    pub params: Vec<VCardParameter>,
    /// Raw value string.
    pub value: String,
}

impl ContentLine {
    /// Returns the first parameter with the given (uppercase) name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&VCardParameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// All TYPE values across every TYPE parameter, in order.
    pub fn type_values(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|p| p.name == "TYPE")
            .flat_map(|p| p.values.iter())
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Parses a single content line into its components.
///
/// Format: `[group.]name[;param[=value]]*:value`
///
/// A parameter without `=` is a vCard 2.1 bare TYPE value.
///
/// ## Errors
/// Returns an error if the line is missing the colon separator or the
/// property name is invalid.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let colon_pos = find_value_separator(line).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            "missing colon separator",
        )
    })?;

    let (name_params, value) = line.split_at(colon_pos);
    let value = &value[1..];

    let (group, name_params) = parse_group(name_params);

    let (name, params_str) = match name_params.split_once(';') {
        Some((name, params)) => (name, Some(params)),
        None => (name_params, None),
    };

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            format!("invalid property name: {name}"),
        ));
    }

    let params = params_str.map(parse_parameters).unwrap_or_default();

    Ok(ContentLine {
        group: group.map(String::from),
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

/// Finds the colon that separates name/params from value.
///
/// Quoted parameter values may contain colons.
fn find_value_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i),
            _ => {}
        }
    }

    None
}

/// Parses optional group prefix.
fn parse_group(s: &str) -> (Option<&str>, &str) {
    // A dot inside the parameter list is not a group separator.
    let head = s.split(';').next().unwrap_or(s);
    if let Some(dot_pos) = head.find('.') {
        let potential_group = &s[..dot_pos];
        if !potential_group.is_empty()
            && potential_group
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return (Some(potential_group), &s[dot_pos + 1..]);
        }
    }
    (None, s)
}

/// Parses parameter string into parameters.
fn parse_parameters(s: &str) -> Vec<VCardParameter> {
    let mut params = Vec::new();
    let mut remaining = s;

    while !remaining.is_empty() {
        let (param, rest) = parse_single_parameter(remaining);
        if let Some(param) = param {
            params.push(param);
        }
        remaining = rest;
    }

    params
}

/// Parses a single parameter and returns the remaining string.
fn parse_single_parameter(s: &str) -> (Option<VCardParameter>, &str) {
    let name_end = s.find(['=', ';']).unwrap_or(s.len());
    let name = s[..name_end].trim();

    if s[name_end..].starts_with('=') {
        let (values, remaining) = parse_param_values(&s[name_end + 1..]);
        let param = (!name.is_empty()).then(|| VCardParameter::multi(name, values));
        return (param, remaining);
    }

    let remaining = s.get(name_end + 1..).unwrap_or("");
    let param = (!name.is_empty()).then(|| VCardParameter::type_param(name));
    (param, remaining)
}

/// Parses parameter values (comma-separated, possibly quoted).
fn parse_param_values(s: &str) -> (Vec<String>, &str) {
    let mut values = Vec::new();
    let mut chars = s.chars().peekable();
    let mut current_value = String::new();
    let mut in_quotes = false;
    let mut consumed = 0;

    while let Some(&c) = chars.peek() {
        consumed += c.len_utf8();

        match c {
            '"' => {
                chars.next();
                in_quotes = !in_quotes;
            }
            ',' if !in_quotes => {
                chars.next();
                values.push(std::mem::take(&mut current_value));
            }
            ';' if !in_quotes => {
                chars.next();
                if !current_value.is_empty() || !values.is_empty() {
                    values.push(current_value);
                }
                return (values, &s[consumed..]);
            }
            '^' => {
                // RFC 6868 caret encoding
                chars.next();
                if let Some(&next) = chars.peek() {
                    consumed += next.len_utf8();
                    chars.next();
                    match next {
                        'n' => current_value.push('\n'),
                        '\'' => current_value.push('"'),
                        '^' => current_value.push('^'),
                        _ => {
                            current_value.push('^');
                            current_value.push(next);
                        }
                    }
                } else {
                    current_value.push('^');
                }
            }
            _ => {
                chars.next();
                current_value.push(c);
            }
        }
    }

    if !current_value.is_empty() || !values.is_empty() {
        values.push(current_value);
    }

    (values, "")
}
