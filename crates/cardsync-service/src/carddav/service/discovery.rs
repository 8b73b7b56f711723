//! Discovery extractors: principal, addressbook home and addressbook list.
//!
//! Each one is a thin projection over [`read_multistatus`]. Malformed or empty
//! bodies yield empty results.

use cardsync_core::types::ResponseType;
use cardsync_rfc::rfc::dav::core::{carddav_props, cs_props, dav_props};
use cardsync_rfc::rfc::dav::{Href, Multistatus, QName, read_multistatus};
use serde::{Deserialize, Serialize};

/// One addressbook collection found under the home set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBookInformation {
    /// Collection href as reported by the server.
    pub url: String,
    pub display_name: String,
    /// `CS:getctag`, empty when not reported.
    pub ctag: String,
    /// `DAV:sync-token`; absent when the collection has no incremental sync.
    pub sync_token: Option<String>,
}

/// ## Summary
/// Extracts the `current-user-principal` href from a principal PROPFIND.
///
/// Some servers answer the well-known URL with the home set or the
/// addressbook collections directly. Those bodies are tagged with the phase
/// they actually belong to, so the caller can skip ahead:
///
/// - `addressbook-home-set` present: returns the home path and
///   [`ResponseType::AddressbookHome`]
/// - addressbook collections present: returns an empty path and
///   [`ResponseType::AddressbookInformation`]
#[must_use]
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_user_principal(xml: &[u8]) -> (String, ResponseType) {
    let multistatus = read_multistatus(xml);

    if let Some(principal) = first_href(&multistatus, &dav_props::current_user_principal()) {
        tracing::debug!(%principal, "Found current-user-principal");
        return (principal, ResponseType::UserPrincipal);
    }

    if let Some(home) = first_href(&multistatus, &carddav_props::addressbook_home_set()) {
        tracing::debug!(%home, "Principal response carried the addressbook home");
        return (home, ResponseType::AddressbookHome);
    }

    let addressbook = carddav_props::addressbook();
    if multistatus
        .responses
        .iter()
        .any(|record| record.has_resource_type(&addressbook))
    {
        tracing::debug!("Principal response listed addressbook collections");
        return (String::new(), ResponseType::AddressbookInformation);
    }

    (String::new(), ResponseType::UserPrincipal)
}

/// ## Summary
/// Extracts the `addressbook-home-set` href from a principal PROPFIND.
///
/// Returns an empty string if the server did not report one.
#[must_use]
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_addressbook_home(xml: &[u8]) -> String {
    let multistatus = read_multistatus(xml);
    first_href(&multistatus, &carddav_props::addressbook_home_set()).unwrap_or_default()
}

/// ## Summary
/// Lists the addressbook collections of a depth-1 PROPFIND on the home set.
///
/// Only resources whose `resourcetype` contains `CARDDAV:addressbook` are
/// kept, and the home collection itself is skipped. Server order is
/// preserved.
#[must_use]
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_addressbook_information(xml: &[u8], home_path: &str) -> Vec<AddressBookInformation> {
    let multistatus = read_multistatus(xml);
    let home = Href::from_server(home_path);
    let addressbook = carddav_props::addressbook();

    let books: Vec<_> = multistatus
        .responses
        .iter()
        .filter(|record| {
            if !record.has_resource_type(&addressbook) {
                tracing::trace!(href = %record.href, "Skipping non-addressbook resource");
                return false;
            }
            !record.href.same_resource(&home)
        })
        .map(|record| AddressBookInformation {
            url: record.href.as_str().to_string(),
            display_name: record
                .text(&dav_props::displayname())
                .unwrap_or_default()
                .to_string(),
            ctag: record
                .text(&cs_props::getctag())
                .unwrap_or_default()
                .to_string(),
            sync_token: record.text(&dav_props::sync_token()).map(str::to_string),
        })
        .collect();

    tracing::debug!(count = books.len(), "Discovered addressbooks");
    books
}

/// Text of the first href inside the first occurrence of `name`.
fn first_href(multistatus: &Multistatus, name: &QName) -> Option<String> {
    multistatus
        .responses
        .iter()
        .filter_map(|record| record.property(name))
        .find_map(|value| value.first_href())
        .map(str::to_string)
}
