//! Contact data extractor for addressbook-multiget responses.

use std::collections::BTreeMap;

use cardsync_rfc::error::RfcError;
use cardsync_rfc::rfc::dav::core::{carddav_props, dav_props};
use cardsync_rfc::rfc::dav::read_multistatus;
use cardsync_rfc::rfc::vcard::{ContactRecord, DecodedVCard, decode_vcard};
use serde::{Deserialize, Serialize};

use crate::carddav::identity::{AccountContext, derive_guid, is_scoped_guid};
use crate::error::ServiceResult;
use crate::snapshot::CorrelationSnapshot;

/// One fetched contact with its identity and version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullContactInformation {
    /// Canonical record; `guid` is always set.
    pub contact: ContactRecord,
    /// Property lines the record has no field for, verbatim and in order.
    pub unsupported_properties: Vec<String>,
    pub etag: String,
}

/// ## Summary
/// Decodes every vCard of a multiget response and assigns its GUID.
///
/// A uri the snapshot already maps to a scoped GUID keeps that GUID, so a
/// contact whose UID changed on the server is still updated in place.
/// Otherwise the GUID is derived from the account, the addressbook and the
/// UID (see [`derive_guid`]). Legacy GUIDs are not re-keyed here; run
/// [`crate::carddav::identity::migrate_legacy_guids`] first.
///
/// Resources without `address-data` or whose vCard cannot be decoded are
/// skipped.
///
/// ## Errors
/// Returns [`crate::error::ServiceError::MissingAccount`] when `account` has
/// no account identifier.
#[tracing::instrument(skip(xml, account, snapshot), fields(xml_len = xml.len()))]
pub fn parse_contact_data(
    xml: &[u8],
    addressbook_url: &str,
    account: &AccountContext,
    snapshot: &CorrelationSnapshot,
) -> ServiceResult<BTreeMap<String, FullContactInformation>> {
    let account_id = account.account_id()?;
    let multistatus = read_multistatus(xml);
    let mut contacts = BTreeMap::new();

    for record in &multistatus.responses {
        let uri = record.href.as_str();
        if record.href.is_collection() || record.is_removed() {
            continue;
        }

        let Some(body) = record.property(&carddav_props::address_data()) else {
            tracing::warn!(%uri, "Resource has no address-data, skipping");
            continue;
        };
        let decoded = match decode_body(&body.text) {
            Ok(decoded) => decoded,
            Err(error) => {
                tracing::warn!(%uri, %error, "Skipping undecodable vCard");
                continue;
            }
        };

        let DecodedVCard {
            mut contact,
            unsupported_properties,
            ..
        } = decoded;

        let guid = match snapshot.guid_for_uri(uri) {
            Some(known) if is_scoped_guid(known) => known.to_string(),
            known => {
                if let Some(legacy) = known {
                    tracing::debug!(%uri, %legacy, "Uri still mapped to a legacy GUID");
                }
                derive_guid(account_id, addressbook_url, contact.uid.as_deref(), uri)
            }
        };
        contact.guid = Some(guid);

        let etag = record
            .text(&dav_props::getetag())
            .unwrap_or_default()
            .to_string();

        tracing::trace!(%uri, guid = ?contact.guid, "Decoded contact");
        contacts.insert(
            uri.to_string(),
            FullContactInformation {
                contact,
                unsupported_properties,
                etag,
            },
        );
    }

    tracing::debug!(count = contacts.len(), "Parsed contact data");
    Ok(contacts)
}

fn decode_body(text: &str) -> ServiceResult<DecodedVCard> {
    // Servers indent address-data; a leading blank would read as a fold.
    Ok(decode_vcard(text.trim_start()).map_err(RfcError::from)?)
}

#[cfg(test)]
mod tests {
    use cardsync_rfc::rfc::vcard::{ContactContext, PhoneSubType};

    use super::*;
    use crate::error::ServiceError;

    const BOOK: &str = "/addressbooks/johndoe/contacts/";

    fn multiget(members: &[(&str, &str, &str)]) -> String {
        let body: String = members
            .iter()
            .map(|(href, etag, vcard)| {
                format!(
                    r#"<d:response><d:href>{href}</d:href><d:propstat><d:prop><d:getetag>{etag}</d:getetag><card:address-data>{vcard}</card:address-data></d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>"#
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?><d:multistatus xmlns:d="DAV:" xmlns:card="urn:ietf:params:xml:ns:carddav">{body}</d:multistatus>"#
        )
    }

    const TESTY: &str = "BEGIN:VCARD&#13;\nVERSION:3.0&#13;\nUID:testy-testperson-uid&#13;\nFN:Testy Testperson&#13;\nN:Testperson;Testy;;;&#13;\nTEL;TYPE=HOME,CELL:555333111&#13;\nX-UNSUPPORTED-TEST-PROPERTY:7357&#13;\nEND:VCARD&#13;\n";

    #[test]
    fn decodes_contact_with_identity_and_etag() {
        let xml = multiget(&[("/addressbooks/johndoe/contacts/testy.vcf", "\"0001-0001\"", TESTY)]);
        let contacts =
            parse_contact_data(xml.as_bytes(), BOOK, &AccountContext::new(7357), &CorrelationSnapshot::new())
                .unwrap();

        let full = &contacts["/addressbooks/johndoe/contacts/testy.vcf"];
        assert_eq!(full.etag, "\"0001-0001\"");
        assert_eq!(
            full.contact.guid.as_deref(),
            Some("7357:AB:/addressbooks/johndoe/contacts/:testy-testperson-uid")
        );
        assert_eq!(full.contact.display_label.as_deref(), Some("Testy Testperson"));
        assert_eq!(full.contact.phone_numbers[0].contexts, vec![ContactContext::Home]);
        assert_eq!(full.contact.phone_numbers[0].sub_types, vec![PhoneSubType::Mobile]);
        assert_eq!(full.unsupported_properties, vec!["X-UNSUPPORTED-TEST-PROPERTY:7357"]);
    }

    #[test]
    fn missing_account_is_an_error() {
        let result = parse_contact_data(b"", BOOK, &AccountContext::unconfigured(), &CorrelationSnapshot::new());
        assert!(matches!(result, Err(ServiceError::MissingAccount)));
    }

    #[test]
    fn empty_body_yields_no_contacts() {
        let contacts =
            parse_contact_data(b"", BOOK, &AccountContext::new(1), &CorrelationSnapshot::new()).unwrap();
        assert!(contacts.is_empty());
    }

    #[test_log::test]
    fn undecodable_vcard_is_skipped() {
        let xml = multiget(&[
            ("/addressbooks/johndoe/contacts/bad.vcf", "\"1\"", "BEGIN:VCARD\nFN:No end\n"),
            ("/addressbooks/johndoe/contacts/good.vcf", "\"2\"", "BEGIN:VCARD\nFN:Fine\nEND:VCARD\n"),
        ]);
        let contacts =
            parse_contact_data(xml.as_bytes(), BOOK, &AccountContext::new(1), &CorrelationSnapshot::new())
                .unwrap();
        assert_eq!(contacts.len(), 1);
        assert!(contacts.contains_key("/addressbooks/johndoe/contacts/good.vcf"));
    }

    #[test_log::test]
    fn invalid_utf8_body_does_not_drop_the_batch() {
        let mut xml = multiget(&[(
            "/addressbooks/johndoe/contacts/good.vcf",
            "\"1\"",
            "BEGIN:VCARD\nFN:Good\nEND:VCARD\n",
        )])
        .into_bytes();
        let latin1 = b"<d:response><d:href>/addressbooks/johndoe/contacts/latin1.vcf</d:href><d:propstat><d:prop><d:getetag>\"2\"</d:getetag><card:address-data>BEGIN:VCARD\nFN:Ren\xe9\nEND:VCARD\n</card:address-data></d:prop><d:status>HTTP/1.1 200 OK</d:status></d:propstat></d:response>";
        let close = xml.len() - "</d:multistatus>".len();
        xml.splice(close..close, latin1.iter().copied());

        let contacts =
            parse_contact_data(&xml, BOOK, &AccountContext::new(1), &CorrelationSnapshot::new()).unwrap();
        assert_eq!(
            contacts["/addressbooks/johndoe/contacts/good.vcf"].contact.display_label.as_deref(),
            Some("Good")
        );
        assert_eq!(
            contacts["/addressbooks/johndoe/contacts/latin1.vcf"].contact.display_label.as_deref(),
            Some("Ren\u{fffd}")
        );
    }

    #[test_log::test]
    fn quoted_printable_contact_is_kept() {
        let xml = multiget(&[
            ("/addressbooks/johndoe/contacts/good.vcf", "\"1\"", "BEGIN:VCARD\nFN:Good\nEND:VCARD\n"),
            (
                "/addressbooks/johndoe/contacts/qp.vcf",
                "\"2\"",
                "BEGIN:VCARD\nVERSION:2.1\nFN:Qp\nNOTE;ENCODING=QUOTED-PRINTABLE:first line=0D=0A=\nsecond line\nEND:VCARD\n",
            ),
        ]);
        let contacts =
            parse_contact_data(xml.as_bytes(), BOOK, &AccountContext::new(1), &CorrelationSnapshot::new())
                .unwrap();

        assert_eq!(contacts.len(), 2);
        let qp = &contacts["/addressbooks/johndoe/contacts/qp.vcf"];
        assert_eq!(qp.contact.display_label.as_deref(), Some("Qp"));
        assert_eq!(
            qp.unsupported_properties,
            vec!["NOTE;ENCODING=QUOTED-PRINTABLE:first line=0D=0A=\r\nsecond line"]
        );
    }

    #[test]
    fn missing_uid_uses_href_token() {
        let xml = multiget(&[("/addressbooks/johndoe/contacts/anon.vcf", "\"1\"", "BEGIN:VCARD\nFN:Anon\nEND:VCARD\n")]);
        let account = AccountContext::new(1);
        let first = parse_contact_data(xml.as_bytes(), BOOK, &account, &CorrelationSnapshot::new()).unwrap();
        let second = parse_contact_data(xml.as_bytes(), BOOK, &account, &CorrelationSnapshot::new()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first["/addressbooks/johndoe/contacts/anon.vcf"].contact.guid,
            Some(derive_guid(1, BOOK, None, "/addressbooks/johndoe/contacts/anon.vcf"))
        );
    }

    #[test]
    fn known_scoped_guid_is_kept() {
        let uri = "/addressbooks/johndoe/contacts/testy.vcf";
        let mut snapshot = CorrelationSnapshot::new();
        let existing = derive_guid(7357, BOOK, Some("old-uid"), uri);
        snapshot.record_contact(BOOK, uri, &existing, Some("\"0\""));

        let xml = multiget(&[(uri, "\"0001-0001\"", TESTY)]);
        let contacts = parse_contact_data(xml.as_bytes(), BOOK, &AccountContext::new(7357), &snapshot).unwrap();
        assert_eq!(contacts[uri].contact.guid, Some(existing));
    }
}
