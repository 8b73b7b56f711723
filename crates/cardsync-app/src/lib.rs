//! Diagnostics front-end: replays captured server responses through the
//! extractors.

pub mod replay;
