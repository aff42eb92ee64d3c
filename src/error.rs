/// Error types shared by the storage, fetch and query layers

use thiserror::Error;

/// Failures of the key-value persistence substrate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read storage: {0}")]
    Read(String),
    #[error("failed to write storage: {0}")]
    Write(String),
    #[error("failed to encode value: {0}")]
    Encode(String),
}

/// Failures of the analysis fetch
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("analysis service returned status {0}")]
    Status(u16),
    #[error("invalid analysis payload: {0}")]
    Decode(String),
}

/// Error surfaced by the query layer. Cloned to every waiter of a shared fetch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VideoError {
    #[error("active tab is not a YouTube video page")]
    NotAVideoPage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_wraps_transparently() {
        let err: QueryError = FetchError::Status(502).into();
        assert_eq!(err.to_string(), "analysis service returned status 502");

        let err: QueryError = StorageError::Write("quota".to_string()).into();
        assert_eq!(err.to_string(), "failed to write storage: quota");
    }
}
