//! Multistatus response records as read from a server.

use super::href::Href;
use super::namespace::{QName, dav_props};
use super::status::Status;

/// A multistatus document (RFC 4918 §13) flattened into per-resource records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multistatus {
    /// One record per reported href, in document order.
    pub responses: Vec<ResourceRecord>,
    /// Top-level `DAV:sync-token` of a sync-collection report.
    pub sync_token: Option<String>,
}

impl Multistatus {
    /// Creates an empty multistatus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no resource was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

/// Value of a single property element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyValue {
    /// Concatenated text of the element and its descendants.
    pub text: String,
    /// Names of the direct child elements (e.g. `resourcetype` members).
    pub children: Vec<QName>,
    /// Text of nested `DAV:href` elements, in order.
    pub hrefs: Vec<String>,
}

impl PropertyValue {
    /// Returns the trimmed text content.
    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Returns the first nested href, or the trimmed text when the server put
    /// the path directly inside the property.
    #[must_use]
    pub fn first_href(&self) -> Option<&str> {
        self.hrefs
            .iter()
            .map(|href| href.trim())
            .find(|href| !href.is_empty())
            .or_else(|| Some(self.trimmed()).filter(|text| !text.is_empty()))
    }

    /// Returns whether a direct child element matches `name`.
    #[must_use]
    pub fn has_child(&self, name: &QName) -> bool {
        self.children.iter().any(|child| child.matches(name))
    }
}

/// Properties and status reported for one href.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    /// The resource href.
    pub href: Href,
    /// Response-level status (status-only responses such as sync deletions).
    pub status: Option<Status>,
    /// Properties from successful propstats, in document order.
    pub properties: Vec<(QName, PropertyValue)>,
}

impl ResourceRecord {
    /// Returns the value of the property named `name`.
    #[must_use]
    pub fn property(&self, name: &QName) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(candidate, _)| candidate == name)
            .or_else(|| {
                self.properties
                    .iter()
                    .find(|(candidate, _)| candidate.matches(name))
            })
            .map(|(_, value)| value)
    }

    /// Returns the trimmed text of a property, if present and non-empty.
    #[must_use]
    pub fn text(&self, name: &QName) -> Option<&str> {
        self.property(name)
            .map(PropertyValue::trimmed)
            .filter(|text| !text.is_empty())
    }

    /// Returns whether `resourcetype` lists `member`.
    #[must_use]
    pub fn has_resource_type(&self, member: &QName) -> bool {
        self.property(&dav_props::resourcetype())
            .is_some_and(|value| value.has_child(member))
    }

    /// Returns whether the server reported this resource as gone.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.status.is_some_and(|status| status.is_removed())
    }
}
