use thiserror::Error;

/// Common error type shared by the session store implementations
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session key: {0:?}")]
    InvalidKey(String),

    #[error("Generic error: {0}")]
    Generic(String),
}
