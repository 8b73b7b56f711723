//! cardsync - integration test support.
//!
//! Re-exports the workspace crates under one path and loads the captured
//! server responses kept in `fixtures/`.

use std::path::PathBuf;

pub mod component {
    pub mod core {
        pub use cardsync_core::*;
    }

    pub mod service {
        pub use cardsync_service::*;
    }

    pub mod rfc {
        pub use cardsync_rfc::rfc::*;
    }

    pub mod replay {
        pub use cardsync_app::replay::*;
    }
}

/// Directory holding the fixture files.
#[must_use]
pub fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// ## Summary
/// Reads a fixture file.
///
/// ## Errors
/// Returns an error if the file does not exist or cannot be read.
pub fn fixture(name: &str) -> anyhow::Result<Vec<u8>> {
    let path = fixture_dir().join(name);
    std::fs::read(&path).map_err(|err| anyhow::anyhow!("reading fixture {}: {err}", path.display()))
}
