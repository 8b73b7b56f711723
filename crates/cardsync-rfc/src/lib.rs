//! Protocol layer for cardsync: `WebDAV` multistatus reading and vCard decoding.

pub mod error;
pub mod rfc;
