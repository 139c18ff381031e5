//! Error types for the rmdp crate
//!
//! Only recoverable failures surface as [`Error`] values: numeric problems in
//! the occupancy solve and I/O or serialization failures during export.
//! Out-of-range id access and malformed-model resolution are checked
//! preconditions that panic immediately; see the crate-level documentation
//! for the recommended validation flow.

use thiserror::Error;

/// Main error type for the rmdp crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("discount factor {discount} must lie in [0, 1)")]
    DiscountOutOfRange { discount: f64 },

    #[error("policy has {got} entries but the process has {expected} states")]
    PolicyLengthMismatch { expected: usize, got: usize },

    #[error("linear system of size {size} is singular or ill-conditioned")]
    SingularSystem { size: usize },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
