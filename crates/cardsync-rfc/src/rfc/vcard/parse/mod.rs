//! vCard parsing.
//!
//! ## Features
//!
//! - Accepts vCard 2.1, 3.0 and 4.0
//! - Handles line folding/unfolding, CRLF or bare LF
//! - Parses property groups (item1.TEL)
//! - vCard 2.1 bare TYPE parameters (`TEL;HOME;CELL:`)
//! - RFC 6868 caret encoding for parameters

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{ContentLine, LogicalLine, logical_lines, parse_content_line, unfold};
pub use parser::{DecodedVCard, decode_vcard};
pub use values::{
    parse_address, parse_date, parse_organization, parse_structured_name, split_component,
    split_structured, unescape_text,
};
