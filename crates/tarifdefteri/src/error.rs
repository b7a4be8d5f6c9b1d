//! Error types for tarifdefteri.
//!
//! This module defines all error types used throughout the tarifdefteri crate,
//! grouped the way callers react to them: configuration problems, missing
//! records, rejected input, and storage plumbing.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tarifdefteri operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// The remote backend is selected but a required setting is missing.
    #[error("remote backend is not configured: missing {setting}")]
    BackendNotConfigured {
        /// Name of the missing setting.
        setting: &'static str,
    },

    /// The remote backend could not be reached.
    #[error("remote backend unreachable at {url}: {message}")]
    BackendUnreachable {
        /// URL of the failed request.
        url: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Not Found Errors ===
    /// The recipe to update does not exist.
    #[error("recipe not found: {id}")]
    RecipeNotFound {
        /// Identifier that was looked up.
        id: String,
    },

    /// The image placement does not exist on the page.
    #[error("image {id} not found on the {page} page")]
    ImageNotFound {
        /// Placement identifier.
        id: String,
        /// Page that was searched.
        page: String,
    },

    // === Validation Errors ===
    /// User input was rejected before reaching storage.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the rejected input.
        message: String,
    },

    // === Session Errors ===
    /// An operation needs a signed-in user.
    #[error("no active session; sign in first")]
    NoSession,

    /// An editor operation was called with no draft open.
    #[error("no recipe is being edited")]
    NotEditing,

    // === Storage Errors ===
    /// Failed to open or create the device database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Remote Errors ===
    /// The remote backend answered with an error status.
    #[error("remote backend rejected request ({status}): {message}")]
    RemoteRejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// An HTTP request failed for a reason other than reachability.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for tarifdefteri operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new recipe-not-found error.
    #[must_use]
    pub fn recipe_not_found(id: impl Into<String>) -> Self {
        Self::RecipeNotFound { id: id.into() }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the backend is unconfigured or unreachable.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad(_)
                | Self::ConfigValidation { .. }
                | Self::BackendNotConfigured { .. }
                | Self::BackendUnreachable { .. }
        )
    }

    /// Check if this error reports a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RecipeNotFound { .. } | Self::ImageNotFound { .. })
    }

    /// Check if this error is rejected user input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoSession;
        assert_eq!(err.to_string(), "no active session; sign in first");

        let err = Error::validation("title is required");
        assert_eq!(err.to_string(), "validation failed: title is required");
    }

    #[test]
    fn test_is_configuration() {
        assert!(Error::BackendNotConfigured { setting: "api_url" }.is_configuration());
        assert!(Error::BackendUnreachable {
            url: "http://localhost".to_string(),
            message: "connection refused".to_string(),
        }
        .is_configuration());
        assert!(Error::ConfigValidation {
            message: "bad".to_string()
        }
        .is_configuration());
        assert!(!Error::NoSession.is_configuration());
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::recipe_not_found("recipe-1").is_not_found());
        assert!(Error::ImageNotFound {
            id: "img-1".to_string(),
            page: "left".to_string(),
        }
        .is_not_found());
        assert!(!Error::validation("x").is_not_found());
    }

    #[test]
    fn test_is_validation() {
        assert!(Error::validation("empty title").is_validation());
        assert!(!Error::NotEditing.is_validation());
    }

    #[test]
    fn test_not_configured_display() {
        let err = Error::BackendNotConfigured {
            setting: "storage_url",
        };
        assert!(err.to_string().contains("storage_url"));
    }

    #[test]
    fn test_remote_rejected_display() {
        let err = Error::RemoteRejected {
            status: 403,
            message: "forbidden".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"));
        assert!(msg.contains("forbidden"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
