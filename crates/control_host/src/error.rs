//! Errors surfaced by control service adapters.

use thiserror::Error;

/// Failure reported by the remote control service or one of its handles.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No control service is reachable from this host.
    #[error("control service is unavailable")]
    Unavailable,
    /// The addressed system or participant does not answer.
    #[error("{0} is unreachable")]
    Unreachable(String),
    /// The remote side refused the request.
    #[error("{0}")]
    Rejected(String),
    /// A named remote object does not exist.
    #[error("{0} not found")]
    NotFound(String),
    /// A descriptor or properties file could not be read or parsed.
    #[error("invalid file \"{path}\": {message}")]
    InvalidFile {
        /// File path as given by the caller.
        path: String,
        /// Read or parse failure detail.
        message: String,
    },
}

/// Convenience result type for control service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;
