use thiserror::Error;

/// Errors reported by index construction, queries and point conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A point handed to `build` does not fit the index.
    #[error("invalid input at point {index}: {reason}")]
    InvalidInput { index: usize, reason: String },

    /// The query point or neighbor count is unusable.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A parsed row could not be turned into a point.
    #[error("invalid point: {0}")]
    InvalidPoint(String),
}

pub type Result<T> = std::result::Result<T, Error>;
