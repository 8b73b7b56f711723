//! Tests for change classification.
//!
//! Verifies the sync-token and ETag-based strategies against captured
//! responses and a seeded snapshot.

use cardsync_test::component::service::carddav::service::{
    ContactInformation, parse_contact_metadata, parse_sync_token_delta,
};
use cardsync_test::component::service::snapshot::CorrelationSnapshot;

use super::helpers::{BOOK, load, member, tracked};

#[test_log::test]
fn sync_token_delta_empty_response() {
    let delta = parse_sync_token_delta(&load("synctokendelta_empty.xml"), &CorrelationSnapshot::new());
    assert_eq!(delta.sync_token, "");
    assert!(delta.contacts.is_empty());
}

#[test_log::test]
fn sync_token_delta_single_addition() {
    let delta = parse_sync_token_delta(
        &load("synctokendelta_single-well-formed-addition.xml"),
        &CorrelationSnapshot::new(),
    );
    assert_eq!(delta.sync_token, "");
    assert_eq!(
        delta.contacts,
        vec![ContactInformation::addition(member("newcard.vcf"), "\"33441-34321\"")]
    );
}

#[test_log::test]
fn sync_token_delta_addition_modification_removal() {
    let snapshot = tracked(&[
        (member("updatedcard.vcf").as_str(), "updatedcard_guid", "\"33541-00000\""),
        (member("deletedcard.vcf").as_str(), "deletedcard_guid", "\"1-1\""),
    ]);
    let delta = parse_sync_token_delta(
        &load("synctokendelta_single-well-formed-add-mod-rem.xml"),
        &snapshot,
    );

    assert_eq!(delta.sync_token, "http://sabredav.org/ns/sync/5001");
    assert_eq!(
        delta.contacts,
        vec![
            ContactInformation::addition(member("newcard.vcf"), "\"33441-34321\""),
            ContactInformation::modification(
                member("updatedcard.vcf"),
                "updatedcard_guid",
                "\"33541-34696\""
            ),
            ContactInformation::deletion(member("deletedcard.vcf"), "deletedcard_guid"),
        ]
    );
}

#[test_log::test]
fn sync_token_delta_drops_untracked_removal() {
    let delta = parse_sync_token_delta(
        &load("synctokendelta_single-well-formed-add-mod-rem.xml"),
        &CorrelationSnapshot::new(),
    );
    assert_eq!(delta.contacts.len(), 2);
    assert!(delta.contacts.iter().all(|change| change.guid.is_none()));
}

#[test_log::test]
fn contact_metadata_empty_response() {
    let snapshot = tracked(&[(member("a.vcf").as_str(), "guid-a", "\"1\"")]);
    let changes = parse_contact_metadata(&load("contactmetadata_empty.xml"), BOOK, &snapshot);
    assert!(changes.is_empty());
}

#[test_log::test]
fn contact_metadata_addition_modification_removal_unchanged() {
    let snapshot = tracked(&[
        (member("updatedcard.vcf").as_str(), "updatedcard_guid", "\"0002-0001\""),
        (member("deletedcard.vcf").as_str(), "deletedcard_guid", "\"0003-0001\""),
        (member("unchangedcard.vcf").as_str(), "unchangedcard_guid", "\"0004-0001\""),
    ]);
    let xml = load("contactmetadata_single-well-formed-add-mod-rem-unch.xml");

    let changes = parse_contact_metadata(&xml, BOOK, &snapshot);
    assert_eq!(
        changes,
        vec![
            ContactInformation::addition(member("newcard.vcf"), "\"0001-0001\""),
            ContactInformation::modification(
                member("updatedcard.vcf"),
                "updatedcard_guid",
                "\"0002-0002\""
            ),
            ContactInformation::deletion(member("deletedcard.vcf"), "deletedcard_guid"),
        ]
    );

    assert_eq!(parse_contact_metadata(&xml, BOOK, &snapshot), changes);
}
