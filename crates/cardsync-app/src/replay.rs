//! Replays one captured response body through the matching extractor.
//!
//! ```text
//! cardsync-replay <kind> <response-file> [snapshot.json] [addressbook-url]
//! ```
//!
//! `kind` is one of the [`ResponseType`] names (`user-principal`,
//! `addressbook-home`, `addressbook-information`, `sync-token-delta`,
//! `contact-metadata`, `contact-data`). For `addressbook-information` the
//! addressbook URL argument is the home path.

use std::path::PathBuf;

use anyhow::{Context, bail};
use cardsync_core::config::Settings;
use cardsync_core::types::ResponseType;
use cardsync_service::carddav::service::{
    parse_addressbook_home, parse_addressbook_information, parse_user_principal,
};
use cardsync_service::session::SyncSession;
use cardsync_service::snapshot::CorrelationSnapshot;
use serde_json::{Value, json};

const USAGE: &str = "usage: cardsync-replay <kind> <response-file> [snapshot.json] [addressbook-url]";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayArgs {
    pub kind: ResponseType,
    pub response_file: PathBuf,
    pub snapshot_file: Option<PathBuf>,
    pub addressbook_url: String,
}

impl ReplayArgs {
    /// ## Summary
    /// Parses the arguments following the program name.
    ///
    /// An empty snapshot path (`""`) means "no snapshot".
    ///
    /// ## Errors
    /// Returns an error for a missing argument or an unknown kind.
    pub fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut args = args.into_iter();

        let kind_name = args.next().context(USAGE)?;
        let kind = ResponseType::from_name(&kind_name)
            .with_context(|| format!("unknown response kind `{kind_name}`\n{USAGE}"))?;
        let response_file = args.next().map(PathBuf::from).context(USAGE)?;
        let snapshot_file = args.next().filter(|path| !path.is_empty()).map(PathBuf::from);
        let addressbook_url = args.next().unwrap_or_default();

        if let Some(extra) = args.next() {
            bail!("unexpected argument `{extra}`\n{USAGE}");
        }

        Ok(Self {
            kind,
            response_file,
            snapshot_file,
            addressbook_url,
        })
    }
}

/// ## Summary
/// Reads the files named by `args` and replays the response.
///
/// ## Errors
/// Returns an error if a file cannot be read, the snapshot is not valid JSON,
/// or the extractor reports caller misuse.
pub fn run(args: &ReplayArgs, settings: &Settings) -> anyhow::Result<Value> {
    let body = std::fs::read(&args.response_file)
        .with_context(|| format!("reading {}", args.response_file.display()))?;

    let snapshot = match &args.snapshot_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            CorrelationSnapshot::from_json(&json)
                .with_context(|| format!("parsing snapshot {}", path.display()))?
        }
        None => CorrelationSnapshot::new(),
    };

    replay(args.kind, &body, snapshot, &args.addressbook_url, settings)
}

/// ## Summary
/// Runs `body` through the extractor for `kind` and renders the result.
///
/// ## Errors
/// Returns an error for invalid settings, or for `contact-data` without a
/// configured account.
#[tracing::instrument(skip(body, snapshot, settings), fields(body_len = body.len()))]
pub fn replay(
    kind: ResponseType,
    body: &[u8],
    snapshot: CorrelationSnapshot,
    addressbook_url: &str,
    settings: &Settings,
) -> anyhow::Result<Value> {
    let mut session = SyncSession::from_settings(settings, snapshot)?;

    let output = match kind {
        ResponseType::UserPrincipal => {
            let (path, response_type) = parse_user_principal(body);
            json!({ "path": path, "response_type": response_type })
        }
        ResponseType::AddressbookHome => json!({ "path": parse_addressbook_home(body) }),
        ResponseType::AddressbookInformation => {
            json!(parse_addressbook_information(body, addressbook_url))
        }
        ResponseType::SyncTokenDelta => json!(session.sync_token_delta(body)),
        ResponseType::ContactMetadata => json!(session.contact_metadata(body, addressbook_url)),
        ResponseType::ContactData => {
            let contacts = session.contact_data(body, addressbook_url)?;
            session.record_fetched(addressbook_url, &contacts);
            json!({ "contacts": contacts, "snapshot": session.commit() })
        }
    };

    Ok(output)
}
