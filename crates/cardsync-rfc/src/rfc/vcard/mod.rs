//! vCard decoding (RFC 2426, RFC 6350).
//!
//! This module turns one vCard payload, as fetched from a `CardDAV` server,
//! into a [`ContactRecord`] plus the property lines the record has no field
//! for.
//!
//! ## Usage
//!
//! ```rust
//! use cardsync_rfc::rfc::vcard::decode_vcard;
//!
//! let input = "\
//! BEGIN:VCARD\r\n\
//! VERSION:3.0\r\n\
//! FN:John Doe\r\n\
//! X-SHOESIZE:44\r\n\
//! END:VCARD\r\n";
//!
//! let decoded = decode_vcard(input).unwrap();
//! assert_eq!(decoded.contact.display_label.as_deref(), Some("John Doe"));
//! assert_eq!(decoded.unsupported_properties, vec!["X-SHOESIZE:44"]);
//! ```
//!
//! ## Round-Trip Fidelity
//!
//! Every line that is not mapped into the record is kept verbatim (after
//! unfolding) and in order, so it can be written back unchanged on upload.
//!
//! ## Submodules
//!
//! - [`core`] - Contact record, structured values and parameters
//! - [`parse`] - Lexer, value parsers and the decoder

pub mod core;
pub mod parse;

pub use core::{
    Address, ContactContext, ContactRecord, EmailAddress, Organization, PhoneNumber,
    PhoneSubType, PostalAddress, PostalSubType, StructuredName, VCardParameter, VCardVersion,
    WebAddress,
};
pub use parse::{DecodedVCard, ParseError, ParseErrorKind, ParseResult, decode_vcard};
