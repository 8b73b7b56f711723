#![allow(clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Loading captured responses from `fixtures/`
//! - Seeding a correlation snapshot the way an earlier sync left it

use cardsync_test::component::service::snapshot::CorrelationSnapshot;
use cardsync_test::fixture;

/// Addressbook used by every contact fixture.
pub const BOOK: &str = "/addressbooks/johndoe/contacts/";

/// Account the contact-data fixtures are parsed for.
pub const ACCOUNT: u32 = 7357;

/// Reads a fixture, panicking with the file name if it is missing.
#[must_use]
pub fn load(name: &str) -> Vec<u8> {
    fixture(name).expect("fixture should be readable")
}

/// Builds a snapshot tracking `(uri, guid, etag)` entries under [`BOOK`].
#[must_use]
pub fn tracked(entries: &[(&str, &str, &str)]) -> CorrelationSnapshot {
    let mut snapshot = CorrelationSnapshot::new();
    for (uri, guid, etag) in entries {
        snapshot.record_contact(BOOK, uri, guid, Some(*etag));
    }
    snapshot
}

/// Absolute uri of a member of [`BOOK`].
#[must_use]
pub fn member(name: &str) -> String {
    format!("{BOOK}{name}")
}
