use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] cardsync_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] cardsync_core::error::CoreError),

    #[error("No account configured; contact identities cannot be derived")]
    MissingAccount,
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
