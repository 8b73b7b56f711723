//! `WebDAV` response types.

mod href;
mod multistatus;
mod namespace;
mod status;

pub use href::Href;
pub use multistatus::{Multistatus, PropertyValue, ResourceRecord};
pub use namespace::{
    CARDDAV_NS, CS_NS, DAV_NS, Namespace, QName, carddav_props, cs_props, dav_props,
};
pub use status::Status;
