//! Tests for the replay driver.

use cardsync_test::component::core::config::Settings;
use cardsync_test::component::core::types::ResponseType;
use cardsync_test::component::replay::{ReplayArgs, run};
use cardsync_test::fixture_dir;

use super::helpers::BOOK;

fn settings() -> Settings {
    Settings::from_toml_str("[sync]\naccount_id = 7357\n").expect("valid settings")
}

fn args(kind: ResponseType, fixture: &str, url: &str) -> ReplayArgs {
    ReplayArgs {
        kind,
        response_file: fixture_dir().join(fixture),
        snapshot_file: None,
        addressbook_url: url.to_string(),
    }
}

#[test_log::test]
fn every_empty_fixture_replays() {
    for (kind, fixture) in [
        (ResponseType::UserPrincipal, "userprincipal_empty.xml"),
        (ResponseType::AddressbookHome, "addressbookhome_empty.xml"),
        (ResponseType::AddressbookInformation, "addressbookinformation_empty.xml"),
        (ResponseType::SyncTokenDelta, "synctokendelta_empty.xml"),
        (ResponseType::ContactMetadata, "contactmetadata_empty.xml"),
        (ResponseType::ContactData, "contactdata_empty.xml"),
    ] {
        let output = run(&args(kind, fixture, BOOK), &settings());
        assert!(output.is_ok(), "{fixture} failed to replay");
    }
}

#[test_log::test]
fn contact_data_replay_returns_updated_snapshot() {
    let output = run(
        &args(ResponseType::ContactData, "contactdata_single-well-formed.xml", BOOK),
        &settings(),
    )
    .expect("replay succeeds");

    let guid = "7357:AB:/addressbooks/johndoe/contacts/:testy-testperson-uid";
    assert_eq!(
        output["snapshot"]["uri_to_guid"]["/addressbooks/johndoe/contacts/testytestperson.vcf"],
        guid
    );
    assert_eq!(output["snapshot"]["guid_to_etag"][guid], "\"0001-0001\"");
}

#[test_log::test]
fn missing_response_file_is_an_error() {
    assert!(run(&args(ResponseType::UserPrincipal, "no-such-file.xml", ""), &settings()).is_err());
}
