use domain::ValidationError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid participant id: {0:?}")]
    InvalidParticipant(String),
}

impl ApplicationError {
    pub fn invalid_participant(value: impl Into<String>) -> Self {
        ApplicationError::InvalidParticipant(value.into())
    }
}
