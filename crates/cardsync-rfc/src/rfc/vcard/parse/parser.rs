//! vCard decoder: content lines to a [`ContactRecord`].

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{ContentLine, LogicalLine, logical_lines, parse_content_line};
use super::values::{
    parse_address, parse_date, parse_organization, parse_structured_name, split_component,
    unescape_text,
};
use crate::rfc::vcard::core::{
    ContactContext, ContactRecord, EmailAddress, PhoneNumber, PhoneSubType, PostalAddress,
    PostalSubType, VCardVersion, WebAddress, types,
};

/// A decoded vCard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedVCard {
    /// Declared VERSION (3.0 when absent or unknown).
    pub version: VCardVersion,
    /// Properties mapped into the canonical record.
    pub contact: ContactRecord,
    /// Unfolded lines the record has no field for, in original order.
    pub unsupported_properties: Vec<String>,
}

/// Decodes the first vCard in `input`.
///
/// Text before `BEGIN:VCARD` and anything after the matching `END:VCARD` is
/// ignored.
///
/// ## Errors
///
/// Returns an error if there is no `BEGIN:VCARD` or the card is not
/// terminated. Lines inside the card that are not content lines are kept in
/// `unsupported_properties`.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn decode_vcard(input: &str) -> ParseResult<DecodedVCard> {
    let lines = logical_lines(input);
    let mut iter = lines.iter();

    let begin = iter
        .by_ref()
        .find(|line| is_marker(&line.text, "BEGIN"))
        .ok_or_else(|| ParseError::missing_property(1, "BEGIN:VCARD"))?;

    let mut decoded = DecodedVCard::default();
    let mut nested = 0_usize;
    let mut last_line = begin.number;

    while let Some(LogicalLine { number, text }) = iter.next() {
        last_line = *number;

        if is_marker(text, "END") {
            if nested == 0 {
                trailing_cards(iter.as_slice());
                return Ok(decoded);
            }
            nested -= 1;
            decoded.unsupported_properties.push(text.clone());
            continue;
        }
        if is_marker(text, "BEGIN") {
            nested += 1;
        }
        if nested > 0 {
            decoded.unsupported_properties.push(text.clone());
            continue;
        }

        let line = match parse_content_line(text, *number) {
            Ok(line) => line,
            Err(error) => {
                tracing::warn!(%error, "keeping malformed line verbatim");
                decoded.unsupported_properties.push(text.clone());
                continue;
            }
        };
        if !apply_property(&mut decoded, &line, *number) {
            decoded.unsupported_properties.push(text.clone());
        }
    }

    Err(ParseError::new(
        ParseErrorKind::UnexpectedEof,
        last_line,
        "missing END:VCARD",
    ))
}

fn is_marker(text: &str, keyword: &str) -> bool {
    text.trim()
        .split_once(':')
        .is_some_and(|(name, value)| {
            name.eq_ignore_ascii_case(keyword) && value.eq_ignore_ascii_case("VCARD")
        })
}

fn trailing_cards(rest: &[LogicalLine]) {
    let extra = rest.iter().filter(|line| is_marker(&line.text, "BEGIN")).count();
    if extra > 0 {
        tracing::warn!(extra, "payload holds more than one vCard, only the first is used");
    }
}

/// Maps one property into the record. Returns `false` when the line must be
/// kept verbatim instead.
fn apply_property(decoded: &mut DecodedVCard, line: &ContentLine, line_num: usize) -> bool {
    if is_encoded(line) {
        return false;
    }

    let contact = &mut decoded.contact;
    match line.name.as_str() {
        "VERSION" => {
            if let Some(version) = VCardVersion::parse(&line.value) {
                decoded.version = version;
            } else {
                tracing::warn!(value = %line.value, "unknown vCard version");
            }
            true
        }
        "UID" => set_once(&mut contact.uid, non_empty(unescape_text(line.value.trim()))),
        "FN" => set_once(
            &mut contact.display_label,
            non_empty(unescape_text(line.value.trim())),
        ),
        "N" => set_once(
            &mut contact.name,
            parse_structured_name(&line.value, line_num).ok(),
        ),
        "NICKNAME" => {
            let names: Vec<_> = split_component(&line.value)
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
            if names.is_empty() {
                return false;
            }
            contact.nicknames.extend(names);
            true
        }
        "TEL" => apply_phone(contact, line),
        "EMAIL" => apply_email(contact, line),
        "ADR" => {
            let Ok(address) = parse_address(&line.value, line_num) else {
                return false;
            };
            if address.is_empty() {
                return false;
            }
            let mut postal = PostalAddress {
                address,
                preferred: has_pref_param(line),
                ..PostalAddress::default()
            };
            for token in line.type_values() {
                if token.eq_ignore_ascii_case(types::PREF) {
                    postal.preferred = true;
                } else if let Some(context) = ContactContext::from_token(token) {
                    postal.contexts.push(context);
                } else {
                    postal.sub_types.push(PostalSubType::from_token(token));
                }
            }
            contact.addresses.push(postal);
            true
        }
        "ORG" => set_once(
            &mut contact.organization,
            Some(parse_organization(&line.value)).filter(|org| !org.name.is_empty()),
        ),
        "TITLE" => set_once(&mut contact.title, non_empty(unescape_text(line.value.trim()))),
        "ROLE" => set_once(&mut contact.role, non_empty(unescape_text(line.value.trim()))),
        "URL" => {
            let Some(url) = non_empty(line.value.trim().to_string()) else {
                return false;
            };
            let contexts = line
                .type_values()
                .filter(|token| !token.eq_ignore_ascii_case(types::PREF))
                .map(context_or_custom)
                .collect();
            contact.urls.push(WebAddress { url, contexts });
            true
        }
        "BDAY" => {
            if contact.birthday.is_some() {
                return false;
            }
            match parse_date(&line.value, line_num) {
                Ok(date) => {
                    contact.birthday = Some(date);
                    true
                }
                Err(error) => {
                    tracing::debug!(%error, "keeping BDAY verbatim");
                    false
                }
            }
        }
        "NOTE" => {
            let Some(note) = non_empty(unescape_text(&line.value)) else {
                return false;
            };
            contact.notes.push(note);
            true
        }
        _ => false,
    }
}

fn apply_phone(contact: &mut ContactRecord, line: &ContentLine) -> bool {
    let raw = line.value.trim();
    let number = raw
        .get(..4)
        .filter(|scheme| scheme.eq_ignore_ascii_case("tel:"))
        .map_or(raw, |_| &raw[4..]);
    let Some(number) = non_empty(number.trim().to_string()) else {
        return false;
    };

    let mut phone = PhoneNumber {
        number,
        preferred: has_pref_param(line),
        ..PhoneNumber::default()
    };
    for token in line.type_values() {
        if token.eq_ignore_ascii_case(types::PREF) {
            phone.preferred = true;
        } else if let Some(context) = ContactContext::from_token(token) {
            phone.contexts.push(context);
        } else {
            phone.sub_types.push(PhoneSubType::from_token(token));
        }
    }
    contact.phone_numbers.push(phone);
    true
}

fn apply_email(contact: &mut ContactRecord, line: &ContentLine) -> bool {
    let Some(address) = non_empty(line.value.trim().to_string()) else {
        return false;
    };

    let mut email = EmailAddress {
        address,
        preferred: has_pref_param(line),
        ..EmailAddress::default()
    };
    for token in line.type_values() {
        if token.eq_ignore_ascii_case(types::PREF) {
            email.preferred = true;
        } else if !token.eq_ignore_ascii_case(types::INTERNET) {
            email.contexts.push(context_or_custom(token));
        }
    }
    contact.email_addresses.push(email);
    true
}

fn context_or_custom(token: &str) -> ContactContext {
    ContactContext::from_token(token).unwrap_or_else(|| ContactContext::Custom(token.to_string()))
}

fn has_pref_param(line: &ContentLine) -> bool {
    line.param("PREF").is_some()
}

const ENCODINGS: [&str; 3] = ["QUOTED-PRINTABLE", "BASE64", "B"];

/// Inline QUOTED-PRINTABLE or BASE64 payloads are not decoded. vCard 2.1
/// also writes the encoding as a bare parameter, which lexes as a TYPE value.
fn is_encoded(line: &ContentLine) -> bool {
    let declared = line
        .param("ENCODING")
        .is_some_and(|encoding| ENCODINGS.iter().any(|name| encoding.has_value(name)));
    declared
        || line
            .type_values()
            .any(|token| ENCODINGS[..2].iter().any(|name| token.eq_ignore_ascii_case(name)))
}

fn set_once<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(value) if slot.is_none() => {
            *slot = Some(value);
            true
        }
        _ => false,
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
