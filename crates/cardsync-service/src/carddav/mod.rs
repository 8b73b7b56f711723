//! `CardDAV` response interpretation.
//!
//! - [`identity`] - GUID derivation and legacy GUID migration
//! - [`service`] - one extractor per response kind

pub mod identity;
pub mod service;
