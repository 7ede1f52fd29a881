use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for voketag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for voketag operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failures (DNS, connect, TLS, reset)
    #[error("network error for '{endpoint}': {message}")]
    Network { endpoint: String, message: String },

    /// Non-2xx response that is not handled by the session layer
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Refresh failed or the retried call was still rejected; the session has been cleared
    #[error("sessão expirada, faça login novamente")]
    SessionExpired,

    /// The backend rejected the double-submit CSRF token
    #[error("CSRF validation failed")]
    CsrfRejected,

    /// Credentials rejected on login
    #[error("{message}")]
    Unauthorized { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// File system operations
    #[error("file system {operation} operation failed for '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Form or CSV pre-flight validation failures
    #[error("validation error on '{field}': {message}")]
    Validation { field: String, message: String },

    /// Operation timeout errors
    #[error("operation '{operation}' timed out after {duration:?}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// The operation was cancelled by its owner
    #[error("operation '{operation}' was cancelled")]
    Cancelled { operation: String },

    /// The backend reported a terminal failure for a batch
    #[error("batch '{batch_id}' failed: {message}")]
    BatchFailed { batch_id: String, message: String },
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

impl Error {
    /// Create a network error
    #[must_use]
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an API error from a status code and a user-facing message
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Error::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a file system error with path context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a cancellation error
    #[must_use]
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Error::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a batch failure error
    #[must_use]
    pub fn batch_failed(batch_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::BatchFailed {
            batch_id: batch_id.into(),
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if it came from a response
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::SessionExpired | Error::Unauthorized { .. } => Some(401),
            Error::CsrfRejected => Some(403),
            _ => None,
        }
    }

    /// Whether a single naive retry is worth attempting
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network { .. } | Error::Timeout { .. } => true,
            Error::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_message_verbatim() {
        let err = Error::api(422, "product_count must be positive");
        assert_eq!(err.to_string(), "product_count must be positive");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_csrf_message_matches_clients() {
        assert_eq!(Error::CsrfRejected.to_string(), "CSRF validation failed");
        assert_eq!(Error::CsrfRejected.status(), Some(403));
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::network("http://x", "reset").is_transient());
        assert!(Error::api(503, "down").is_transient());
        assert!(Error::api(429, "slow down").is_transient());
        assert!(!Error::api(404, "missing").is_transient());
        assert!(!Error::SessionExpired.is_transient());
    }

    #[test]
    fn test_io_conversion_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::FileSystem { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
