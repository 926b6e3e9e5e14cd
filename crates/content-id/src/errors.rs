use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum IdentifierError {
    #[error("payload is required")]
    MissingPayload,
    #[error("gateway host is required")]
    MissingHost,
    #[error("hash primitive unavailable: {0}")]
    PrimitiveUnavailable(String),
    #[error("invalid content id: {0}")]
    InvalidCid(String),
}

pub type IdentifierResult<T> = Result<T, IdentifierError>;
