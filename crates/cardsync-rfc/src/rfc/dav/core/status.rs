//! HTTP status carried inside multistatus `<status>` elements.

use serde::{Deserialize, Serialize};

/// HTTP status of a response or propstat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 204 No Content
    NoContent,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 410 Gone
    Gone,
    /// 507 Insufficient Storage
    InsufficientStorage,
    /// Any other status
    Custom(u16),
}

impl Status {
    /// Returns the status code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Gone => 410,
            Self::InsufficientStorage => 507,
            Self::Custom(code) => *code,
        }
    }

    /// Returns whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.code(), 200..=299)
    }

    /// Returns whether the status reports the resource as gone (404 or 410).
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        matches!(self, Self::NotFound | Self::Gone)
    }

    /// Parses a status line such as `HTTP/1.1 404 Not Found`.
    ///
    /// Servers vary the protocol token and reason phrase, so only the first
    /// three-digit token is significant. Returns `None` when no code is present.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        line.split_whitespace()
            .find(|token| token.len() == 3 && token.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|token| token.parse::<u16>().ok())
            .map(Self::from)
    }
}

impl From<u16> for Status {
    fn from(code: u16) -> Self {
        match code {
            200 => Self::Ok,
            201 => Self::Created,
            204 => Self::NoContent,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            410 => Self::Gone,
            507 => Self::InsufficientStorage,
            _ => Self::Custom(code),
        }
    }
}
