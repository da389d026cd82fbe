use thiserror::Error;

#[derive(Debug, Error)]
pub enum E5ApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid request to E5: {0}")]
    Validation(String),
    #[error("Could not reach E5: {0}")]
    Transport(String),
    #[error("Failed reading the body of the E5 response")]
    FailedToReadBody,
    #[error("Failed request to E5")]
    BadRequest,
    #[error("Not found")]
    NotFound,
    #[error("Got an internal server error from E5")]
    InternalServer,
    #[error("Unexpected server error. Status {0}")]
    UnexpectedServerError(u16),
}

impl E5ApiError {
    /// True when the ledger never answered, as opposed to answering with an error.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
