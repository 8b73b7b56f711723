//! Change classification against the correlation snapshot.
//!
//! Two strategies produce the same [`ContactInformation`] stream:
//! - [`parse_sync_token_delta`] reads an RFC 6578 sync-collection report,
//!   where the server names deletions explicitly
//! - [`parse_contact_metadata`] reads a depth-1 ETag PROPFIND, where
//!   deletions are inferred from what the server no longer lists

use std::collections::BTreeSet;

use cardsync_rfc::rfc::dav::core::dav_props;
use cardsync_rfc::rfc::dav::{Href, ResourceRecord, read_multistatus};
use serde::{Deserialize, Serialize};

use crate::snapshot::CorrelationSnapshot;

/// Outcome of classifying one remote resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModificationType {
    /// Unchanged since the snapshot; never emitted.
    #[default]
    Uninitialized,
    Addition,
    Modification,
    Deletion,
}

/// One classified change.
///
/// `guid` is set whenever the snapshot knew the resource. `etag` is unset only
/// for deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInformation {
    pub mod_type: ModificationType,
    pub uri: String,
    pub guid: Option<String>,
    pub etag: Option<String>,
}

impl ContactInformation {
    #[must_use]
    pub fn addition(uri: impl Into<String>, etag: impl Into<String>) -> Self {
        Self {
            mod_type: ModificationType::Addition,
            uri: uri.into(),
            guid: None,
            etag: Some(etag.into()),
        }
    }

    #[must_use]
    pub fn modification(
        uri: impl Into<String>,
        guid: impl Into<String>,
        etag: impl Into<String>,
    ) -> Self {
        Self {
            mod_type: ModificationType::Modification,
            uri: uri.into(),
            guid: Some(guid.into()),
            etag: Some(etag.into()),
        }
    }

    #[must_use]
    pub fn deletion(uri: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            mod_type: ModificationType::Deletion,
            uri: uri.into(),
            guid: Some(guid.into()),
            etag: None,
        }
    }

    #[must_use]
    pub fn unchanged(uri: impl Into<String>, guid: impl Into<String>) -> Self {
        Self {
            mod_type: ModificationType::Uninitialized,
            uri: uri.into(),
            guid: Some(guid.into()),
            etag: None,
        }
    }
}

/// Result of a sync-collection report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTokenDelta {
    /// New token; empty when the server sent none, which means the next sync
    /// has to fall back to full reconciliation.
    pub sync_token: String,
    pub contacts: Vec<ContactInformation>,
}

/// ## Summary
/// Classifies the members of a sync-collection REPORT response.
///
/// - 404/410 status: [`ModificationType::Deletion`] of the tracked GUID
/// - otherwise: [`ModificationType::Modification`] when the uri is tracked,
///   [`ModificationType::Addition`] when it is not
///
/// A removed uri that was never tracked has nothing to delete locally and is
/// dropped.
#[must_use]
#[tracing::instrument(skip(xml, snapshot), fields(xml_len = xml.len()))]
pub fn parse_sync_token_delta(xml: &[u8], snapshot: &CorrelationSnapshot) -> SyncTokenDelta {
    let multistatus = read_multistatus(xml);
    let mut contacts = Vec::new();

    for record in &multistatus.responses {
        if record.href.is_collection() {
            tracing::trace!(href = %record.href, "Skipping collection member");
            continue;
        }
        let uri = record.href.as_str();
        let guid = snapshot.guid_for_uri(uri);

        let change = if record.is_removed() {
            let Some(guid) = guid else {
                tracing::debug!(%uri, "Ignoring deletion of untracked resource");
                continue;
            };
            ContactInformation::deletion(uri, guid)
        } else if record.status.is_some_and(|status| !status.is_success()) {
            tracing::warn!(%uri, status = ?record.status, "Skipping resource with unexpected status");
            continue;
        } else {
            let etag = etag_of(record);
            match guid {
                Some(guid) => ContactInformation::modification(uri, guid, etag),
                None => ContactInformation::addition(uri, etag),
            }
        };

        tracing::trace!(%uri, mod_type = ?change.mod_type, "Classified resource");
        contacts.push(change);
    }

    let sync_token = multistatus
        .sync_token
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if sync_token.is_empty() {
        tracing::debug!("Sync report carried no sync-token");
    }

    SyncTokenDelta {
        sync_token,
        contacts,
    }
}

/// ## Summary
/// Reconciles a depth-1 ETag PROPFIND of one addressbook with the snapshot.
///
/// Reported resources become additions (untracked), modifications (ETag
/// differs from the stored one) or are dropped as unchanged. Every GUID
/// stored under the addressbook that no reported resource matched is then
/// emitted as a deletion without ETag.
///
/// A body with no response at all (not even the addressbook itself) is
/// treated as unusable and infers nothing.
///
/// The snapshot is only read, so running this twice on the same inputs gives
/// the same output.
#[must_use]
#[tracing::instrument(skip(xml, snapshot), fields(xml_len = xml.len()))]
pub fn parse_contact_metadata(
    xml: &[u8],
    addressbook_url: &str,
    snapshot: &CorrelationSnapshot,
) -> Vec<ContactInformation> {
    let multistatus = read_multistatus(xml);
    if multistatus.is_empty() {
        tracing::warn!("Metadata response listed nothing, skipping reconciliation");
        return Vec::new();
    }

    let addressbook = Href::from_server(addressbook_url);
    let mut matched = BTreeSet::new();
    let mut changes = Vec::new();

    for record in &multistatus.responses {
        if record.href.same_resource(&addressbook) || record.href.is_collection() {
            continue;
        }
        if record.status.is_some_and(|status| !status.is_success()) {
            tracing::debug!(href = %record.href, status = ?record.status, "Treating resource as not reported");
            continue;
        }

        let uri = record.href.as_str();
        let etag = etag_of(record);
        let change = match snapshot.guid_for_uri(uri) {
            None => ContactInformation::addition(uri, etag),
            Some(guid) => {
                matched.insert(guid.to_string());
                if snapshot.etag_for_guid(guid) == Some(etag.as_str()) {
                    ContactInformation::unchanged(uri, guid)
                } else {
                    ContactInformation::modification(uri, guid, etag)
                }
            }
        };

        tracing::trace!(%uri, mod_type = ?change.mod_type, "Classified resource");
        changes.push(change);
    }

    let uris = snapshot.uris_by_guid();
    for guid in snapshot.guids_in(addressbook_url) {
        if matched.contains(guid) {
            continue;
        }
        match uris.get(guid) {
            Some(&uri) => changes.push(ContactInformation::deletion(uri, guid)),
            None => tracing::debug!(%guid, "Tracked GUID has no uri, nothing to delete"),
        }
    }

    changes.retain(|change| change.mod_type != ModificationType::Uninitialized);
    tracing::debug!(count = changes.len(), "Reconciled addressbook metadata");
    changes
}

fn etag_of(record: &ResourceRecord) -> String {
    record
        .text(&dav_props::getetag())
        .unwrap_or_default()
        .to_string()
}
