use thiserror::Error;

/// Rejection reasons from the region access gate.
///
/// A rejected region is always surfaced to the caller; the engine never
/// substitutes a default region for bad input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("region identifier is empty after normalization")]
    EmptyRegion,

    #[error("region identifier exceeds {max} characters")]
    TooLong { max: usize },

    #[error("unknown region: {0}")]
    UnknownRegion(String),
}

/// Failures of the persistence medium backing the history store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage operation failed: {0}")]
    Backend(String),
}

#[cfg(feature = "db")]
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(error.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Discriminated failure outcome for every engine operation.
///
/// Solver non-convergence is NOT an error: it is reported as a flag on the
/// optimization result together with the best iterate found.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
