//! Tests for the discovery extractors.
//!
//! Verifies principal, home set and addressbook listing against captured
//! PROPFIND responses.

use cardsync_test::component::core::types::ResponseType;
use cardsync_test::component::service::carddav::service::{
    AddressBookInformation, parse_addressbook_home, parse_addressbook_information,
    parse_user_principal,
};

use super::helpers::load;

#[test_log::test]
fn user_principal_empty_response() {
    let (path, response_type) = parse_user_principal(&load("userprincipal_empty.xml"));
    assert_eq!(path, "");
    assert_eq!(response_type, ResponseType::UserPrincipal);
}

#[test_log::test]
fn user_principal_well_formed() {
    let (path, response_type) = parse_user_principal(&load("userprincipal_single-well-formed.xml"));
    assert_eq!(path, "/principals/users/johndoe/");
    assert_eq!(response_type, ResponseType::UserPrincipal);
}

#[test_log::test]
fn user_principal_redirected_to_home() {
    let (path, response_type) =
        parse_user_principal(&load("addressbookhome_single-well-formed.xml"));
    assert_eq!(path, "/addressbooks/johndoe/");
    assert_eq!(response_type, ResponseType::AddressbookHome);
}

#[test_log::test]
fn user_principal_redirected_to_addressbooks() {
    let (path, response_type) =
        parse_user_principal(&load("addressbookinformation_single-well-formed.xml"));
    assert_eq!(path, "");
    assert_eq!(response_type, ResponseType::AddressbookInformation);
}

#[test_log::test]
fn addressbook_home_responses() {
    assert_eq!(parse_addressbook_home(&load("addressbookhome_empty.xml")), "");
    assert_eq!(
        parse_addressbook_home(&load("addressbookhome_single-well-formed.xml")),
        "/addressbooks/johndoe/"
    );
}

#[test_log::test]
fn addressbook_information_empty_response() {
    let books = parse_addressbook_information(&load("addressbookinformation_empty.xml"), "");
    assert!(books.is_empty());
}

#[test_log::test]
fn addressbook_information_well_formed() {
    let books = parse_addressbook_information(
        &load("addressbookinformation_single-well-formed.xml"),
        "/addressbooks/johndoe/",
    );
    assert_eq!(
        books,
        vec![AddressBookInformation {
            url: "/addressbooks/johndoe/contacts/".into(),
            display_name: "My Address Book".into(),
            ctag: "3145".into(),
            sync_token: Some("http://sabredav.org/ns/sync-token/3145".into()),
        }]
    );
}

#[test_log::test]
fn addressbook_information_skips_contacts() {
    let books = parse_addressbook_information(
        &load("addressbookinformation_addressbook-plus-contact.xml"),
        "/addressbooks/johndoe/",
    );
    assert_eq!(
        books,
        vec![AddressBookInformation {
            url: "/addressbooks/johndoe/contacts/".into(),
            display_name: "Contacts".into(),
            ctag: "12345".into(),
            sync_token: None,
        }]
    );
}

#[test_log::test]
fn addressbook_information_skips_principal_and_calendar() {
    let books = parse_addressbook_information(
        &load("addressbookinformation_addressbook-calendar-principal.xml"),
        "/dav/johndoe/",
    );
    assert_eq!(
        books,
        vec![AddressBookInformation {
            url: "/dav/johndoe/contacts.vcf/".into(),
            display_name: "Contacts".into(),
            ctag: "22222".into(),
            sync_token: None,
        }]
    );
}
