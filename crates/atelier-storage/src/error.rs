//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key not found
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid key format
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Lock was poisoned (another thread panicked while holding the lock)
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// Backend temporarily unavailable
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Create a not found error with the given key.
    pub fn not_found(key: &[&str]) -> Self {
        Self::NotFound(key.join("/"))
    }

    /// Create an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey(message.into())
    }

    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Whether repeating the same call could succeed.
    ///
    /// Malformed keys fail the same way every time.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidKey(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_not_found_formats_key() {
        let err = StorageError::not_found(&["versions", "dsn_456"]);
        assert_eq!(err.to_string(), "Key not found: versions/dsn_456");
    }

    #[test]
    fn storage_error_invalid_key_formats_message() {
        let err = StorageError::invalid_key("empty key component");
        assert_eq!(err.to_string(), "Invalid key: empty key component");
    }

    #[test]
    fn storage_error_io_wraps_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = StorageError::from(io_err);
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn storage_error_unavailable_displays() {
        let err = StorageError::unavailable("disk busy");
        assert_eq!(err.to_string(), "Storage unavailable: disk busy");
    }

    #[test]
    fn storage_error_transient_classification() {
        assert!(StorageError::unavailable("busy").is_transient());
        assert!(StorageError::LockPoisoned("poisoned".into()).is_transient());
        assert!(!StorageError::invalid_key("..").is_transient());
    }
}
