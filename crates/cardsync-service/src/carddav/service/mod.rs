//! Extractors over multistatus responses.

pub mod contact_data;
pub mod delta;
pub mod discovery;

pub use contact_data::{FullContactInformation, parse_contact_data};
pub use delta::{
    ContactInformation, ModificationType, SyncTokenDelta, parse_contact_metadata,
    parse_sync_token_delta,
};
pub use discovery::{
    AddressBookInformation, parse_addressbook_home, parse_addressbook_information,
    parse_user_principal,
};
