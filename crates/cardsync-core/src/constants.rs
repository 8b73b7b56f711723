/// Marker separating the account scope from the addressbook scope in a GUID.
pub const ADDRESSBOOK_GUID_MARKER: &str = "AB";

/// Separator between GUID components.
pub const GUID_SEPARATOR: &str = ":";

/// Infix placed between the account identifier and the addressbook path.
pub const ADDRESSBOOK_GUID_INFIX: &str =
    const_str::concat!(GUID_SEPARATOR, ADDRESSBOOK_GUID_MARKER, GUID_SEPARATOR);

/// Prefix of environment variables read by [`crate::config::Settings::load`].
pub const ENV_PREFIX: &str = "CARDSYNC";

/// Optional configuration file consulted after the environment.
pub const CONFIG_FILE_NAME: &str = "cardsync.toml";
