//! vCard parameter types (RFC 6350 §5).

/// A vCard parameter.
///
/// Parameters can have multiple values (e.g., TYPE=home,work).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCardParameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Parameter values.
    pub values: Vec<String>,
}

impl VCardParameter {
    /// Creates a new parameter with a single value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a parameter with multiple values.
    #[must_use]
    pub fn multi(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Returns the first value, if any.
    #[cfg(test)]
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

    /// Returns whether the parameter has the specified value (case-insensitive).
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }

    /// Creates a TYPE parameter.
    #[must_use]
    pub fn type_param(value: impl Into<String>) -> Self {
        Self::new("TYPE", value)
    }
}

/// TYPE values with a fixed meaning in the contact record.
pub mod types {
    pub const HOME: &str = "home";
    pub const WORK: &str = "work";
    pub const OTHER: &str = "other";
    pub const PREF: &str = "pref";
    pub const INTERNET: &str = "internet";

    // Telephone types
    pub const VOICE: &str = "voice";
    pub const CELL: &str = "cell";
    pub const FAX: &str = "fax";
    pub const PAGER: &str = "pager";
    pub const VIDEO: &str = "video";
    pub const CAR: &str = "car";
    pub const BBS: &str = "bbs";
    pub const MODEM: &str = "modem";
    pub const MSG: &str = "msg";
    pub const TEXT: &str = "text";
    pub const TEXTPHONE: &str = "textphone";
    pub const ISDN: &str = "isdn";
    pub const PCS: &str = "pcs";

    // Address types (vCard 3.0)
    pub const DOM: &str = "dom";
    pub const INTL: &str = "intl";
    pub const POSTAL: &str = "postal";
    pub const PARCEL: &str = "parcel";
}
