//! Error types for primitive_search

use thiserror::Error;

/// Main error type for the search core
///
/// Exhaustion and cancellation are ordinary search outcomes and are
/// reported through `SearchOutcome`, not through this type.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Weight vector does not match the metric vector length
    #[error("Configuration error: expected {expected} weights, got {actual}")]
    WeightLength { expected: usize, actual: usize },
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// Configuration file could not be parsed
    #[error("Config load error: {0}")]
    ConfigLoad(String),
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for search operations
pub type SearchResult<T> = Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::WeightLength {
            expected: 5,
            actual: 3,
        };
        assert_eq!(
            format!("{}", err),
            "Configuration error: expected 5 weights, got 3"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SearchError = io_err.into();
        assert!(matches!(err, SearchError::Io(_)));
    }
}
