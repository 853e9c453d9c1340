use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Raised by a catalog index call; carried through untouched.
    #[error(transparent)]
    Collaborator(anyhow::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// True for failures the caller should report as a user mistake.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::InvalidQuery(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
