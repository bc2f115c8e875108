use std::sync::Arc;
use thiserror::Error;

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Why a deduplicated computation produced no value.
///
/// Cloneable so every caller waiting on the same computation receives it.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The factory future returned an error
    #[error("Computation failed: {0:#}")]
    Computation(Arc<anyhow::Error>),

    /// The factory future panicked
    #[error("Computation panicked")]
    Panicked,

    /// The task driving the computation was cancelled or lost
    #[error("Computation task failed: {0}")]
    Join(String),
}

impl CacheError {
    pub fn computation(err: anyhow::Error) -> Self {
        Self::Computation(Arc::new(err))
    }
}
