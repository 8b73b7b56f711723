//! Reconciliation layer.
//!
//! Turns parsed server responses into classified changes against a
//! [`snapshot::CorrelationSnapshot`], and derives the stable local identity of
//! each fetched contact.

pub mod carddav;
pub mod error;
pub mod session;
pub mod snapshot;
