//! Domain error types for Test Case Studio.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Caller-level validation failed (e.g. empty name on create or clone)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A record with the same name already exists and overwrite is disabled
    #[error("Test case \"{0}\" already exists")]
    NameCollision(String),

    /// Malformed JSON or an unexpected document shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Archive generation failed
    #[error("Packaging failed: {0}")]
    Packaging(String),

    /// Input file or archive could not be read
    #[error("Read error: {0}")]
    Read(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// A record with the same id is already in the store
    #[error("Duplicate test case id: {0}")]
    DuplicateId(String),
}

impl AppError {
    /// Whether this error aborts a whole operation rather than a single batch entry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::Packaging(_) | AppError::Read(_))
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(format!("JSON parsing error: {}", err))
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::Packaging(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Read(err.to_string())
    }
}
