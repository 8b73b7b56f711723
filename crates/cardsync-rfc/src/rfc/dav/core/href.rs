//! DAV href type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A `WebDAV` href as reported by a server, reduced to its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Href(pub String);

impl Href {
    /// Creates a new href without normalization.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Creates an href from raw server text.
    ///
    /// Surrounding whitespace is dropped and absolute URLs
    /// (`https://host:8443/dav/card.vcf`) are reduced to their path so that
    /// hrefs compare equal regardless of how a server chose to spell them.
    #[must_use]
    pub fn from_server(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self(strip_origin(trimmed).to_string())
    }

    /// Returns the href as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether the href is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether this href ends with a slash.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Ensures the href ends with a slash (for collections).
    #[must_use]
    pub fn with_trailing_slash(self) -> Self {
        if self.0.ends_with('/') {
            self
        } else {
            Self(format!("{}/", self.0))
        }
    }

    /// URL-decodes the href.
    #[must_use]
    pub fn decode(&self) -> String {
        percent_decode(&self.0)
    }

    /// Returns whether both hrefs name the same resource.
    ///
    /// Compares decoded paths and ignores a trailing slash, since servers
    /// disagree on both when echoing a collection back.
    #[must_use]
    pub fn same_resource(&self, other: &Self) -> bool {
        let lhs = self.decode();
        let rhs = other.decode();
        lhs.trim_end_matches('/') == rhs.trim_end_matches('/')
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Href {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Href {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for Href {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Drops `scheme://authority` from an absolute URL.
fn strip_origin(s: &str) -> &str {
    let Some(scheme_end) = s.find("://") else {
        return s;
    };
    let scheme = &s[..scheme_end];
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)) {
        return s;
    }

    let after_scheme = &s[scheme_end + 3..];
    match after_scheme.find('/') {
        Some(path_start) => &after_scheme[path_start..],
        None => "/",
    }
}

/// Percent-decodes a path, leaving malformed escapes untouched.
fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2]))
        {
            decoded.push((hi << 4) | lo);
            i += 3;
            continue;
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(decoded).unwrap_or_else(|_| s.to_string())
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
