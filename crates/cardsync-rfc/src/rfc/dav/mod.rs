//! `WebDAV` multistatus response handling (RFC 4918, RFC 6352, RFC 6578).
//!
//! - [`core`] - names, hrefs, status lines and the per-resource records
//! - [`parse`] - the tolerant multistatus reader

pub mod core;
pub mod parse;

pub use core::{
    CARDDAV_NS, CS_NS, DAV_NS, Href, Multistatus, Namespace, PropertyValue, QName,
    ResourceRecord, Status,
};
pub use parse::{ParseError, ParseErrorKind, ParseResult, parse_multistatus, read_multistatus};
