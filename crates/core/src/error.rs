//! Unified error types for the ladder cache.
//!
//! Store-side variants (`Database`, `MigrationFailed`, `CorruptSnapshot`) all
//! render as `STORE_UNAVAILABLE` and are recovered locally by the orchestrator.

use crate::upstream::UpstreamError;
use tokio_rusqlite::rusqlite;

/// Unified error types for the ladder cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or unsupported query parameters.
    #[error("INVALID_QUERY: {0}")]
    InvalidQuery(String),

    /// Upstream ranking source failed and no usable snapshot exists.
    #[error("UPSTREAM_UNAVAILABLE: {0}")]
    UpstreamUnavailable(UpstreamError),

    /// Database operation failed.
    #[error("STORE_UNAVAILABLE: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_UNAVAILABLE: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be decoded.
    #[error("STORE_UNAVAILABLE: corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl Error {
    /// Whether this error came from the snapshot store rather than the query or upstream.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::Database(_) | Error::MigrationFailed(_) | Error::CorruptSnapshot(_))
    }

    /// Status code reported to HTTP callers.
    ///
    /// Upstream failures carry the adapter's status when it is a valid
    /// error status, otherwise 500.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::InvalidQuery(_) => 400,
            Error::UpstreamUnavailable(e) => match e.status {
                Some(status) if (400..=599).contains(&status) => status,
                _ => 500,
            },
            Error::Database(_) | Error::MigrationFailed(_) | Error::CorruptSnapshot(_) => 500,
        }
    }
}

impl From<UpstreamError> for Error {
    fn from(err: UpstreamError) -> Self {
        Error::UpstreamUnavailable(err)
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidQuery("unknown tier: WOOD".to_string());
        assert!(err.to_string().contains("INVALID_QUERY"));
        assert!(err.to_string().contains("WOOD"));
    }

    #[test]
    fn test_store_errors_classified() {
        assert!(Error::CorruptSnapshot("bad json".into()).is_store_unavailable());
        assert!(Error::MigrationFailed("v1".into()).is_store_unavailable());
        assert!(Error::Database(tokio_rusqlite::Error::ConnectionClosed).is_store_unavailable());
        assert!(!Error::InvalidQuery("x".into()).is_store_unavailable());
        assert!(!Error::UpstreamUnavailable(UpstreamError::new(None, "down")).is_store_unavailable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(Error::InvalidQuery("x".into()).http_status(), 400);
        assert_eq!(Error::UpstreamUnavailable(UpstreamError::new(Some(429), "slow down")).http_status(), 429);
        assert_eq!(Error::UpstreamUnavailable(UpstreamError::new(Some(200), "odd")).http_status(), 500);
        assert_eq!(Error::UpstreamUnavailable(UpstreamError::new(None, "network")).http_status(), 500);
        assert_eq!(Error::CorruptSnapshot("x".into()).http_status(), 500);
    }
}
