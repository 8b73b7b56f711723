//! Shared building blocks for the cardsync workspace.
//!
//! Holds configuration loading, the core error type and the small enums and
//! constants that every other layer agrees on.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
