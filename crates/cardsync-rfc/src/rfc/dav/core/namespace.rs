//! XML namespace and qualified name types.

use std::borrow::Cow;

/// `DAV:` namespace URI.
pub const DAV_NS: &str = "DAV:";

/// `CardDAV` namespace URI.
pub const CARDDAV_NS: &str = "urn:ietf:params:xml:ns:carddav";

/// `CalendarServer` (Apple) namespace URI, home of `getctag`.
pub const CS_NS: &str = "http://calendarserver.org/ns/";

/// An XML namespace.
///
/// An empty URI stands for a prefix the document never declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(pub Cow<'static, str>);

impl Namespace {
    /// `DAV:` namespace.
    pub const DAV: Self = Self(Cow::Borrowed(DAV_NS));

    /// `CardDAV` namespace.
    pub const CARDDAV: Self = Self(Cow::Borrowed(CARDDAV_NS));

    /// `CalendarServer` namespace.
    pub const CS: Self = Self(Cow::Borrowed(CS_NS));

    /// Namespace of elements whose prefix could not be resolved.
    pub const UNRESOLVED: Self = Self(Cow::Borrowed(""));

    /// Creates a new namespace from a string.
    #[must_use]
    pub fn new(uri: impl Into<Cow<'static, str>>) -> Self {
        Self(uri.into())
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the prefix behind this namespace was undeclared.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&'static str> for Namespace {
    fn from(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

/// A qualified XML name (namespace + local name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// The namespace URI.
    pub namespace: Namespace,
    /// The local name.
    pub local_name: Cow<'static, str>,
}

impl QName {
    /// Creates a new qualified name.
    #[must_use]
    pub fn new(namespace: impl Into<Namespace>, local_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// Creates a `DAV:` qualified name.
    #[must_use]
    pub fn dav(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Namespace::DAV, local_name)
    }

    /// Creates a `CardDAV` qualified name.
    #[must_use]
    pub fn carddav(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Namespace::CARDDAV, local_name)
    }

    /// Creates a `CalendarServer` qualified name.
    #[must_use]
    pub fn cs(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Namespace::CS, local_name)
    }

    /// Returns the local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns whether this is a DAV: element.
    #[must_use]
    pub fn is_dav(&self) -> bool {
        self.namespace == Namespace::DAV
    }

    /// Returns whether this name stands in for `wanted`.
    ///
    /// Exact matches always do; a name with an unresolved namespace matches on
    /// the local name alone so undeclared prefixes do not hide properties.
    #[must_use]
    pub fn matches(&self, wanted: &Self) -> bool {
        self.local_name == wanted.local_name
            && (self.namespace == wanted.namespace || self.namespace.is_unresolved())
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}{}", self.namespace.as_str(), self.local_name)
    }
}

/// DAV property names read from discovery and sync responses.
pub mod dav_props {
    use super::QName;

    #[must_use]
    pub fn resourcetype() -> QName {
        QName::dav("resourcetype")
    }
    #[must_use]
    pub fn collection() -> QName {
        QName::dav("collection")
    }
    #[must_use]
    pub fn principal() -> QName {
        QName::dav("principal")
    }
    #[must_use]
    pub fn displayname() -> QName {
        QName::dav("displayname")
    }
    #[must_use]
    pub fn getetag() -> QName {
        QName::dav("getetag")
    }
    #[must_use]
    pub fn current_user_principal() -> QName {
        QName::dav("current-user-principal")
    }
    #[must_use]
    pub fn sync_token() -> QName {
        QName::dav("sync-token")
    }
}

/// `CardDAV` property names.
pub mod carddav_props {
    use super::QName;

    #[must_use]
    pub fn addressbook() -> QName {
        QName::carddav("addressbook")
    }
    #[must_use]
    pub fn addressbook_home_set() -> QName {
        QName::carddav("addressbook-home-set")
    }
    #[must_use]
    pub fn address_data() -> QName {
        QName::carddav("address-data")
    }
}

/// `CalendarServer` property names.
pub mod cs_props {
    use super::QName;

    #[must_use]
    pub fn getctag() -> QName {
        QName::cs("getctag")
    }
}
