//! History error types.

use crate::policy::ErrorCategory;
use atelier_storage::StorageError;
use thiserror::Error;

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors that can occur in the history engine.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The persistence adapter failed (after retries).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A snapshot or version list could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested version does not exist.
    #[error("version not found: {version_id} (design {design_id})")]
    NotFound {
        design_id: String,
        version_id: String,
    },

    /// Manual save requested before the scheduler was bound to a design.
    #[error("auto-save not started - call start() before save()")]
    NotStarted,

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl HistoryError {
    /// Create a not found error.
    pub fn not_found(design_id: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self::NotFound {
            design_id: design_id.into(),
            version_id: version_id.into(),
        }
    }

    /// Classify this error for the error policy.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Storage(StorageError::NotFound(_)) => ErrorCategory::NotFound,
            Self::Storage(StorageError::Json(_)) | Self::Serialization(_) => {
                ErrorCategory::Serialization
            }
            Self::Storage(_) => ErrorCategory::Storage,
            Self::NotStarted | Self::Config(_) => ErrorCategory::Internal,
        }
    }
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid JSON/JSONC syntax.
    #[error("invalid config at {path}: {message}")]
    InvalidJson { path: String, message: String },

    /// Config validation failed.
    #[error("config validation failed: {message}")]
    Validation { message: String },

    /// Config file could not be read.
    #[error("could not read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = HistoryError::not_found("dsn_1", "nonexistent");
        assert_eq!(
            err.to_string(),
            "version not found: nonexistent (design dsn_1)"
        );
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_serialization_counts_as_storage() {
        let json_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = HistoryError::from(json_err);
        assert_eq!(err.category(), ErrorCategory::Serialization);
        assert!(err.category().is_storage_failure());
    }

    #[test]
    fn test_storage_category() {
        let err = HistoryError::from(StorageError::unavailable("busy"));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(err.to_string().starts_with("storage error"));
    }

    #[test]
    fn test_not_started_display() {
        assert!(HistoryError::NotStarted.to_string().contains("start()"));
    }
}
