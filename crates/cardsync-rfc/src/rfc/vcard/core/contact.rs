//! Canonical contact record.
//!
//! A fixed set of well-known optional fields. Anything a vCard carries beyond
//! these stays outside the record as raw property lines.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::parameter::types;
use super::structured::{Address, Organization, StructuredName};

/// vCard format version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VCardVersion {
    /// vCard 2.1
    V21,
    /// vCard 3.0 (RFC 2426)
    #[default]
    V30,
    /// vCard 4.0 (RFC 6350)
    V40,
}

impl VCardVersion {
    /// Parses a VERSION value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "2.1" => Some(Self::V21),
            "3.0" => Some(Self::V30),
            "4.0" => Some(Self::V40),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V21 => "2.1",
            Self::V30 => "3.0",
            Self::V40 => "4.0",
        }
    }
}

/// Context a communication detail applies to.
///
/// TYPE tokens outside the fixed set are kept verbatim in `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactContext {
    Home,
    Work,
    Other,
    Custom(String),
}

impl ContactContext {
    /// Maps a context token; `None` if the token is not a context.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        [
            (types::HOME, Self::Home),
            (types::WORK, Self::Work),
            (types::OTHER, Self::Other),
        ]
        .into_iter()
        .find_map(|(name, context)| token.eq_ignore_ascii_case(name).then_some(context))
    }
}

/// Kind of telephone line (TEL TYPE values).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhoneSubType {
    Voice,
    Mobile,
    Fax,
    Pager,
    Video,
    Car,
    BulletinBoardSystem,
    Modem,
    MessagingCapable,
    Textphone,
    Isdn,
    Pcs,
    Custom(String),
}

impl PhoneSubType {
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        const TABLE: [(&str, PhoneSubType); 13] = [
            (types::VOICE, PhoneSubType::Voice),
            (types::CELL, PhoneSubType::Mobile),
            (types::FAX, PhoneSubType::Fax),
            (types::PAGER, PhoneSubType::Pager),
            (types::VIDEO, PhoneSubType::Video),
            (types::CAR, PhoneSubType::Car),
            (types::BBS, PhoneSubType::BulletinBoardSystem),
            (types::MODEM, PhoneSubType::Modem),
            (types::MSG, PhoneSubType::MessagingCapable),
            (types::TEXT, PhoneSubType::MessagingCapable),
            (types::TEXTPHONE, PhoneSubType::Textphone),
            (types::ISDN, PhoneSubType::Isdn),
            (types::PCS, PhoneSubType::Pcs),
        ];

        TABLE
            .into_iter()
            .find_map(|(name, sub_type)| token.eq_ignore_ascii_case(name).then_some(sub_type))
            .unwrap_or_else(|| Self::Custom(token.to_string()))
    }
}

/// Kind of postal address (vCard 3.0 ADR TYPE values).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostalSubType {
    Domestic,
    International,
    Postal,
    Parcel,
    Custom(String),
}

impl PostalSubType {
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            types::DOM => Self::Domestic,
            types::INTL => Self::International,
            types::POSTAL => Self::Postal,
            types::PARCEL => Self::Parcel,
            _ => Self::Custom(token.to_string()),
        }
    }
}

/// A telephone number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub number: String,
    pub contexts: Vec<ContactContext>,
    pub sub_types: Vec<PhoneSubType>,
    pub preferred: bool,
}

/// An email address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub address: String,
    /// Contexts; unknown TYPE tokens land here as [`ContactContext::Custom`].
    pub contexts: Vec<ContactContext>,
    pub preferred: bool,
}

/// A postal address with its TYPE information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub address: Address,
    pub contexts: Vec<ContactContext>,
    pub sub_types: Vec<PostalSubType>,
    pub preferred: bool,
}

/// A URL associated with the contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAddress {
    pub url: String,
    /// Contexts; unknown TYPE tokens land here as [`ContactContext::Custom`].
    pub contexts: Vec<ContactContext>,
}

/// Canonical form of one remote contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Durable local identity, filled in once the contact is correlated.
    pub guid: Option<String>,
    /// Server-side UID property.
    pub uid: Option<String>,
    /// Formatted name (FN).
    pub display_label: Option<String>,
    pub name: Option<StructuredName>,
    pub nicknames: Vec<String>,
    pub phone_numbers: Vec<PhoneNumber>,
    pub email_addresses: Vec<EmailAddress>,
    pub addresses: Vec<PostalAddress>,
    pub organization: Option<Organization>,
    pub title: Option<String>,
    pub role: Option<String>,
    pub urls: Vec<WebAddress>,
    pub birthday: Option<NaiveDate>,
    pub notes: Vec<String>,
}

impl ContactRecord {
    /// Returns the label to show for this contact: FN, else the structured name.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.display_label.clone().or_else(|| {
            self.name
                .as_ref()
                .map(StructuredName::display_name)
                .filter(|name| !name.is_empty())
        })
    }
}
