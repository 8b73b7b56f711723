use serde::{Deserialize, Serialize};

/// Discovery phase that produced (or was detected in) a server response.
///
/// Travels next to parse results so the orchestrator can notice when a server
/// answered a different question than the one asked, e.g. returning the
/// addressbook home set straight from the principal URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    UserPrincipal,
    AddressbookHome,
    AddressbookInformation,
    SyncTokenDelta,
    ContactMetadata,
    ContactData,
}

impl ResponseType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserPrincipal => "user-principal",
            Self::AddressbookHome => "addressbook-home",
            Self::AddressbookInformation => "addressbook-information",
            Self::SyncTokenDelta => "sync-token-delta",
            Self::ContactMetadata => "contact-metadata",
            Self::ContactData => "contact-data",
        }
    }

    /// Parses the kebab-case name used on the command line.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::UserPrincipal,
            Self::AddressbookHome,
            Self::AddressbookInformation,
            Self::SyncTokenDelta,
            Self::ContactMetadata,
            Self::ContactData,
        ]
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
