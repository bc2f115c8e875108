use context_syntax::SyntaxError;
use thiserror::Error;

/// Result type for context retrieval
pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors surfaced while assembling completion context.
///
/// Only [`ContextError::NotFound`] for the request's own file stops a request;
/// collectors turn every other failure into an empty snippet list.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Parse failure: {0}")]
    ParseFailure(#[from] SyntaxError),

    #[error("Lookup failed: {0}")]
    LookupFailure(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContextError {
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::LookupFailure(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }
}
