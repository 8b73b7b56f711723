//! Tests for contact data parsing and identity assignment.

use cardsync_test::component::rfc::vcard::{ContactContext, PhoneSubType};
use cardsync_test::component::service::carddav::identity::AccountContext;
use cardsync_test::component::service::carddav::service::parse_contact_data;
use cardsync_test::component::service::session::SyncSession;
use cardsync_test::component::service::snapshot::CorrelationSnapshot;

use super::helpers::{ACCOUNT, BOOK, load, member, tracked};

const TESTY_GUID: &str = "7357:AB:/addressbooks/johndoe/contacts/:testy-testperson-uid";

#[test_log::test]
fn contact_data_empty_response() {
    let contacts = parse_contact_data(
        &load("contactdata_empty.xml"),
        BOOK,
        &AccountContext::new(ACCOUNT),
        &CorrelationSnapshot::new(),
    )
    .expect("account is configured");
    assert!(contacts.is_empty());
}

#[test_log::test]
fn contact_data_single_contact() {
    let contacts = parse_contact_data(
        &load("contactdata_single-well-formed.xml"),
        BOOK,
        &AccountContext::new(ACCOUNT),
        &CorrelationSnapshot::new(),
    )
    .expect("account is configured");

    let uri = member("testytestperson.vcf");
    assert_eq!(contacts.keys().collect::<Vec<_>>(), vec![&uri]);

    let full = &contacts[&uri];
    assert_eq!(full.etag, "\"0001-0001\"");
    assert_eq!(full.unsupported_properties, vec!["X-UNSUPPORTED-TEST-PROPERTY:7357"]);

    let contact = &full.contact;
    assert_eq!(contact.guid.as_deref(), Some(TESTY_GUID));
    assert_eq!(contact.display_label.as_deref(), Some("Testy Testperson"));
    let name = contact.name.as_ref().expect("N is present");
    assert_eq!(name.given, vec!["Testy"]);
    assert_eq!(name.family, vec!["Testperson"]);

    assert_eq!(contact.phone_numbers.len(), 1);
    let phone = &contact.phone_numbers[0];
    assert_eq!(phone.number, "555333111");
    assert_eq!(phone.contexts, vec![ContactContext::Home]);
    assert_eq!(phone.sub_types, vec![PhoneSubType::Mobile]);
}

#[test_log::test]
fn session_migrates_legacy_guid_before_parsing() {
    let uri = member("testytestperson.vcf");
    let snapshot = tracked(&[(uri.as_str(), "testy-testperson-uid", "\"0000-0001\"")]);
    let mut session = SyncSession::new(AccountContext::new(ACCOUNT), snapshot);

    let contacts = session
        .contact_data(&load("contactdata_single-well-formed.xml"), BOOK)
        .expect("account is configured");
    assert_eq!(contacts[&uri].contact.guid.as_deref(), Some(TESTY_GUID));
    assert_eq!(session.snapshot().guid_for_uri(&uri), Some(TESTY_GUID));

    session.record_fetched(BOOK, &contacts);
    let snapshot = session.commit();
    assert_eq!(snapshot.etag_for_guid(TESTY_GUID), Some("\"0001-0001\""));
    assert_eq!(snapshot.etag_for_guid("testy-testperson-uid"), None);
}
