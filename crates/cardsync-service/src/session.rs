//! One sync session of one account.
//!
//! The session owns the account's [`CorrelationSnapshot`] for its whole
//! lifetime. Extractors only read it; the orchestrator applies results through
//! [`SyncSession::record_fetched`] and [`SyncSession::apply_deletions`] and
//! hands the snapshot back to the datastore with [`SyncSession::commit`] once
//! every stage succeeded.

use std::collections::{BTreeMap, BTreeSet};

use cardsync_core::config::Settings;

use crate::carddav::identity::{AccountContext, MigrationReport, migrate_legacy_guids};
use crate::carddav::service::{
    ContactInformation, FullContactInformation, ModificationType, SyncTokenDelta,
    parse_contact_data, parse_contact_metadata, parse_sync_token_delta,
};
use crate::error::ServiceResult;
use crate::snapshot::{CorrelationSnapshot, addressbook_key};

#[derive(Debug)]
pub struct SyncSession {
    account: AccountContext,
    snapshot: CorrelationSnapshot,
    migrate_legacy_guids: bool,
    migrated: BTreeSet<String>,
}

impl SyncSession {
    #[must_use]
    pub fn new(account: AccountContext, snapshot: CorrelationSnapshot) -> Self {
        Self {
            account,
            snapshot,
            migrate_legacy_guids: true,
            migrated: BTreeSet::new(),
        }
    }

    /// ## Summary
    /// Creates a session configured from `settings`.
    ///
    /// ## Errors
    /// Returns [`crate::error::ServiceError::CoreError`] if the settings are invalid.
    pub fn from_settings(settings: &Settings, snapshot: CorrelationSnapshot) -> ServiceResult<Self> {
        settings.validate()?;
        Ok(Self {
            migrate_legacy_guids: settings.sync.migrate_legacy_guids,
            ..Self::new(AccountContext::from_settings(&settings.sync), snapshot)
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> &CorrelationSnapshot {
        &self.snapshot
    }

    #[must_use]
    pub fn sync_token_delta(&self, xml: &[u8]) -> SyncTokenDelta {
        parse_sync_token_delta(xml, &self.snapshot)
    }

    #[must_use]
    pub fn contact_metadata(&self, xml: &[u8], addressbook_url: &str) -> Vec<ContactInformation> {
        parse_contact_metadata(xml, addressbook_url, &self.snapshot)
    }

    /// ## Summary
    /// Runs the legacy GUID migration for `addressbook_url` unless it already
    /// ran in this session or is disabled.
    ///
    /// Returns `None` when nothing was attempted.
    ///
    /// ## Errors
    /// Returns [`crate::error::ServiceError::MissingAccount`] without an account.
    pub fn migrate_addressbook(&mut self, addressbook_url: &str) -> ServiceResult<Option<MigrationReport>> {
        let key = addressbook_key(addressbook_url);
        if !self.migrate_legacy_guids || self.migrated.contains(&key) {
            return Ok(None);
        }
        let account_id = self.account.account_id()?;
        self.migrated.insert(key);
        Ok(Some(migrate_legacy_guids(
            &mut self.snapshot,
            account_id,
            addressbook_url,
        )))
    }

    /// ## Summary
    /// Parses a multiget response, migrating the addressbook's legacy GUIDs
    /// first if this is its first contact-data parse of the session.
    ///
    /// ## Errors
    /// Returns [`crate::error::ServiceError::MissingAccount`] without an account.
    pub fn contact_data(
        &mut self,
        xml: &[u8],
        addressbook_url: &str,
    ) -> ServiceResult<BTreeMap<String, FullContactInformation>> {
        self.account.account_id()?;
        self.migrate_addressbook(addressbook_url)?;
        parse_contact_data(xml, addressbook_url, &self.account, &self.snapshot)
    }

    /// Stores the identity and ETag of freshly fetched contacts.
    pub fn record_fetched(
        &mut self,
        addressbook_url: &str,
        contacts: &BTreeMap<String, FullContactInformation>,
    ) {
        for (uri, full) in contacts {
            if let Some(guid) = full.contact.guid.as_deref() {
                self.snapshot
                    .record_contact(addressbook_url, uri, guid, Some(&full.etag));
            }
        }
    }

    /// Forgets every contact the changes mark as deleted.
    pub fn apply_deletions(&mut self, changes: &[ContactInformation]) {
        for change in changes {
            if change.mod_type != ModificationType::Deletion {
                continue;
            }
            if let Some(guid) = change.guid.as_deref() {
                self.snapshot.forget_guid(guid);
            }
        }
    }

    /// Ends the session and returns the snapshot to persist.
    #[must_use]
    pub fn commit(self) -> CorrelationSnapshot {
        self.snapshot
    }
}
