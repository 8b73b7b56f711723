pub mod dav;
pub mod vcard;
