//! Stable local identities for remote contacts.
//!
//! A server UID is only unique within one addressbook, so the local GUID
//! embeds the account and the addressbook path:
//!
//! ```text
//! <account>:AB:<addressbook-path>:<uid>
//! ```
//!
//! Contacts without a UID get a name-based UUID of their href instead.
//! Older snapshots keyed contacts by the bare UID or by `<account>:<uid>`;
//! [`migrate_legacy_guids`] re-keys those in place.

use std::collections::BTreeSet;

use cardsync_core::config::SyncConfig;
use cardsync_core::constants::{ADDRESSBOOK_GUID_INFIX, ADDRESSBOOK_GUID_MARKER, GUID_SEPARATOR};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::snapshot::{CorrelationSnapshot, addressbook_key};

/// Account the parsed contacts belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountContext {
    account_id: Option<u32>,
}

impl AccountContext {
    #[must_use]
    pub const fn new(account_id: u32) -> Self {
        Self {
            account_id: Some(account_id),
        }
    }

    /// A context without an account; identity derivation will fail.
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self { account_id: None }
    }

    #[must_use]
    pub const fn from_settings(sync: &SyncConfig) -> Self {
        Self {
            account_id: sync.account_id,
        }
    }

    /// ## Summary
    /// Returns the account identifier.
    ///
    /// ## Errors
    /// Returns [`ServiceError::MissingAccount`] if none is configured.
    pub fn account_id(&self) -> ServiceResult<u32> {
        self.account_id.ok_or(ServiceError::MissingAccount)
    }
}

/// Deterministic stand-in for a missing UID.
#[must_use]
pub fn fallback_token(href: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, href.as_bytes()).to_string()
}

/// ## Summary
/// Derives the GUID of a contact.
///
/// `uid` wins when present and non-blank; otherwise the href is hashed with
/// [`fallback_token`].
#[must_use]
pub fn derive_guid(account_id: u32, addressbook_url: &str, uid: Option<&str>, href: &str) -> String {
    let token = uid
        .map(str::trim)
        .filter(|uid| !uid.is_empty())
        .map_or_else(|| fallback_token(href), str::to_string);

    format!(
        "{account_id}{ADDRESSBOOK_GUID_INFIX}{}{GUID_SEPARATOR}{token}",
        addressbook_key(addressbook_url)
    )
}

/// Returns whether `guid` already carries an account and addressbook scope.
#[must_use]
pub fn is_scoped_guid(guid: &str) -> bool {
    guid.split_once(GUID_SEPARATOR)
        .is_some_and(|(account, rest)| {
            !account.is_empty()
                && account.bytes().all(|b| b.is_ascii_digit())
                && rest
                    .strip_prefix(ADDRESSBOOK_GUID_MARKER)
                    .is_some_and(|rest| rest.starts_with(GUID_SEPARATOR))
        })
}

/// Returns the server UID a legacy GUID stands for, or `None` for a GUID
/// that is already scoped.
#[must_use]
pub fn legacy_uid(guid: &str, account_id: u32) -> Option<&str> {
    if guid.is_empty() || is_scoped_guid(guid) {
        return None;
    }

    let account_prefix = format!("{account_id}{GUID_SEPARATOR}");
    Some(
        guid.strip_prefix(account_prefix.as_str())
            .filter(|uid| !uid.is_empty())
            .unwrap_or(guid),
    )
}

/// What a migration pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// `(legacy, scoped)` GUID pairs, in the order they were re-keyed.
    pub rekeyed: Vec<(String, String)>,
}

impl MigrationReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rekeyed.is_empty()
    }
}

/// ## Summary
/// Re-keys legacy GUIDs of one addressbook to the scoped form.
///
/// Candidates are the GUIDs stored under the addressbook and those mapped
/// from a uri inside it. Running the migration again finds nothing left to
/// change.
///
/// ## Side Effects
/// Rewrites every snapshot map that mentions a legacy GUID.
#[tracing::instrument(skip(snapshot))]
pub fn migrate_legacy_guids(
    snapshot: &mut CorrelationSnapshot,
    account_id: u32,
    addressbook_url: &str,
) -> MigrationReport {
    let book_path = addressbook_key(addressbook_url);
    let mut seen = BTreeSet::new();
    let candidates: Vec<&str> = snapshot
        .guids_in(addressbook_url)
        .chain(
            snapshot
                .uri_to_guid
                .iter()
                .filter(|(uri, _)| uri.starts_with(&book_path))
                .map(|(_, guid)| guid.as_str()),
        )
        .filter(|guid| seen.insert(*guid))
        .collect();

    let uris = snapshot.uris_by_guid();
    let rekeys: Vec<(String, String)> = candidates
        .into_iter()
        .filter_map(|legacy| {
            let uid = legacy_uid(legacy, account_id)?;
            let href = uris.get(legacy).copied().unwrap_or_default();
            Some((
                legacy.to_string(),
                derive_guid(account_id, addressbook_url, Some(uid), href),
            ))
        })
        .collect();

    let mut report = MigrationReport::default();
    for (legacy, scoped) in rekeys {
        tracing::trace!(%legacy, %scoped, "Re-keying legacy GUID");
        snapshot.rekey_guid(&legacy, &scoped);
        report.rekeyed.push((legacy, scoped));
    }

    if !report.is_empty() {
        tracing::info!(count = report.rekeyed.len(), "Migrated legacy contact GUIDs");
    }
    report
}
