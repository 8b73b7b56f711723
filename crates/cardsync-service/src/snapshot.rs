//! Session-scoped correlation state for one account.
//!
//! The snapshot is loaded from the local datastore when a session starts,
//! consulted read-only by the extractors, and updated through the helpers
//! below once a stage has completed. It is never shared between two
//! sessions of the same account.

use std::collections::{BTreeMap, BTreeSet};

use cardsync_rfc::rfc::dav::Href;
use serde::{Deserialize, Serialize};

/// Known remote resources of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationSnapshot {
    /// Resource href to local GUID.
    pub uri_to_guid: BTreeMap<String, String>,
    /// Local GUID to the last ETag seen for it.
    pub guid_to_etag: BTreeMap<String, String>,
    /// Addressbook key (see [`addressbook_key`]) to the GUIDs stored under it.
    pub addressbook_guids: BTreeMap<String, BTreeSet<String>>,
}

/// Normalises an addressbook URL into the key used by the snapshot and by
/// derived GUIDs: the path only, with a trailing slash.
#[must_use]
pub fn addressbook_key(addressbook_url: &str) -> String {
    Href::from_server(addressbook_url).with_trailing_slash().0
}

impl CorrelationSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.uri_to_guid.is_empty() && self.addressbook_guids.values().all(BTreeSet::is_empty)
    }

    /// ## Summary
    /// Parses a snapshot previously written with [`Self::to_json`].
    ///
    /// ## Errors
    /// Returns the `serde_json` error if the document does not describe a snapshot.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// ## Summary
    /// Serialises the snapshot for the datastore.
    ///
    /// ## Errors
    /// Returns the `serde_json` error if serialisation fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Looks up the GUID remembered for `uri`.
    ///
    /// Falls back to a decoded, trailing-slash-insensitive comparison when the
    /// server spells the href differently from the stored one.
    #[must_use]
    pub fn guid_for_uri(&self, uri: &str) -> Option<&str> {
        if let Some(guid) = self.uri_to_guid.get(uri) {
            return Some(guid);
        }

        let wanted = Href::from_server(uri);
        self.uri_to_guid
            .iter()
            .find(|(known, _)| Href::from_server(known).same_resource(&wanted))
            .map(|(_, guid)| guid.as_str())
    }

    /// Returns the remembered uri of `guid`.
    #[must_use]
    pub fn uri_for_guid(&self, guid: &str) -> Option<&str> {
        self.uri_to_guid
            .iter()
            .find(|(_, known)| *known == guid)
            .map(|(uri, _)| uri.as_str())
    }

    /// Index from GUID to uri, for passes that resolve many GUIDs at once.
    #[must_use]
    pub fn uris_by_guid(&self) -> BTreeMap<&str, &str> {
        self.uri_to_guid
            .iter()
            .map(|(uri, guid)| (guid.as_str(), uri.as_str()))
            .collect()
    }

    #[must_use]
    pub fn etag_for_guid(&self, guid: &str) -> Option<&str> {
        self.guid_to_etag.get(guid).map(String::as_str)
    }

    /// GUIDs stored under the addressbook, in sorted order.
    pub fn guids_in(&self, addressbook_url: &str) -> impl Iterator<Item = &str> {
        self.addressbook_guids
            .get(&addressbook_key(addressbook_url))
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// ## Summary
    /// Remembers that `uri` in the addressbook holds the contact `guid`.
    ///
    /// ## Side Effects
    /// A different GUID previously mapped to `uri` is forgotten entirely.
    pub fn record_contact(
        &mut self,
        addressbook_url: &str,
        uri: &str,
        guid: &str,
        etag: Option<&str>,
    ) {
        if let Some(previous) = self.uri_to_guid.get(uri).cloned()
            && previous != guid
        {
            self.forget_guid(&previous);
        }

        self.uri_to_guid.insert(uri.to_string(), guid.to_string());
        if let Some(etag) = etag {
            self.set_etag(guid, etag);
        }
        self.addressbook_guids
            .entry(addressbook_key(addressbook_url))
            .or_default()
            .insert(guid.to_string());
    }

    /// ## Summary
    /// Drops every trace of `guid`.
    ///
    /// Returns the uri that was mapped to it, if any.
    pub fn forget_guid(&mut self, guid: &str) -> Option<String> {
        let uri = self.uri_for_guid(guid).map(str::to_string);
        self.uri_to_guid.retain(|_, known| known != guid);
        self.guid_to_etag.remove(guid);
        for guids in self.addressbook_guids.values_mut() {
            guids.remove(guid);
        }
        uri
    }

    pub fn set_etag(&mut self, guid: &str, etag: &str) {
        self.guid_to_etag.insert(guid.to_string(), etag.to_string());
    }

    /// ## Summary
    /// Replaces `old` with `new` in every map.
    ///
    /// An ETag already stored for `new` is kept over the one of `old`.
    pub fn rekey_guid(&mut self, old: &str, new: &str) {
        if old == new {
            return;
        }

        for known in self.uri_to_guid.values_mut() {
            if known == old {
                *known = new.to_string();
            }
        }
        if let Some(etag) = self.guid_to_etag.remove(old) {
            self.guid_to_etag.entry(new.to_string()).or_insert(etag);
        }
        for guids in self.addressbook_guids.values_mut() {
            if guids.remove(old) {
                guids.insert(new.to_string());
            }
        }
    }
}
