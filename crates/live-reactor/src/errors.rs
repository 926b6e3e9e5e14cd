use content_id::IdentifierError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReactorError {
    #[error("invalid target selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("no element matches `{0}`")]
    TargetNotFound(String),

    #[error("identifier failure: {0}")]
    Identifier(#[from] IdentifierError),
}

pub type ReactorResult<T> = Result<T, ReactorError>;
