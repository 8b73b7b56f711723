use thiserror::Error;

/// RFC parsing errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    DavParse(#[from] crate::rfc::dav::parse::ParseError),

    #[error(transparent)]
    VCardParse(#[from] crate::rfc::vcard::parse::ParseError),
}
