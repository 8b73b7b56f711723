//! Core vCard types.

mod contact;
mod parameter;
mod structured;

pub use contact::{
    ContactContext, ContactRecord, EmailAddress, PhoneNumber, PhoneSubType, PostalAddress,
    PostalSubType, VCardVersion, WebAddress,
};
pub use parameter::{VCardParameter, types};
pub use structured::{Address, Organization, StructuredName};
