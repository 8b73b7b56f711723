//! `WebDAV` multistatus XML parsing.
//!
//! This module reads PROPFIND and REPORT response bodies using the
//! `quick-xml` crate.

mod error;
mod multistatus;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use multistatus::{parse_multistatus, read_multistatus};
