//! Error types for the sound service.
//!
//! Defines all error codes and types used throughout the service for
//! consistent error handling and reporting.

use std::fmt;

/// Error codes returned by the service in error responses.
///
/// These codes map onto HTTP statuses and allow clients to
/// programmatically handle specific error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Prompt text is missing or empty.
    InvalidPrompt,

    /// Requested filename stem is missing, empty, or not a bare name.
    InvalidFilename,

    /// Step count is not one of the supported values.
    InvalidSteps,

    /// Requested duration is outside the valid range.
    InvalidDuration,

    /// Missing or unverifiable identity token.
    Unauthenticated,

    /// No user directory, or no such artifact owned by the caller.
    NotFound,

    /// Directory or metadata I/O failed.
    StorageUnavailable,

    /// The external generator reported a failure.
    GenerationFailed,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPrompt => "INVALID_PROMPT",
            ErrorCode::InvalidFilename => "INVALID_FILENAME",
            ErrorCode::InvalidSteps => "INVALID_STEPS",
            ErrorCode::InvalidDuration => "INVALID_DURATION",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::StorageUnavailable => "STORAGE_UNAVAILABLE",
            ErrorCode::GenerationFailed => "GENERATION_FAILED",
        }
    }

    /// Returns the HTTP status this code maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::InvalidPrompt
            | ErrorCode::InvalidFilename
            | ErrorCode::InvalidSteps
            | ErrorCode::InvalidDuration => 400,
            ErrorCode::Unauthenticated => 401,
            ErrorCode::NotFound => 404,
            ErrorCode::StorageUnavailable | ErrorCode::GenerationFailed => 500,
        }
    }

    /// Returns true if the condition is user-correctable (a 4xx status).
    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for service operations.
#[derive(Debug)]
pub struct ServiceError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ServiceError {
    /// Creates a new ServiceError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new ServiceError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an INVALID_PROMPT error for empty prompts.
    pub fn empty_prompt() -> Self {
        Self::new(ErrorCode::InvalidPrompt, "Prompt cannot be empty")
    }

    /// Creates an INVALID_FILENAME error for empty filename stems.
    pub fn empty_filename() -> Self {
        Self::new(ErrorCode::InvalidFilename, "Filename cannot be empty")
    }

    /// Creates an INVALID_FILENAME error for stems that are not bare names.
    pub fn unsafe_filename(stem: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFilename,
            format!(
                "Filename must be a bare name without path components: {:?}",
                stem
            ),
        )
    }

    /// Creates an INVALID_STEPS error.
    pub fn invalid_steps(steps: u32) -> Self {
        Self::new(
            ErrorCode::InvalidSteps,
            format!(
                "Invalid step count: {} (must be one of 200, 250, 300, 350, 400, 500)",
                steps
            ),
        )
    }

    /// Creates an INVALID_DURATION error.
    pub fn invalid_duration(duration: u32) -> Self {
        Self::new(
            ErrorCode::InvalidDuration,
            format!(
                "Invalid duration: {} seconds (must be between 1 and 30)",
                duration
            ),
        )
    }

    /// Creates an UNAUTHENTICATED error.
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, reason)
    }

    /// Creates a NOT_FOUND error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, format!("Not found: {}", what.into()))
    }

    /// Creates a STORAGE_UNAVAILABLE error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageUnavailable, message)
    }

    /// Creates a STORAGE_UNAVAILABLE error wrapping an I/O failure.
    pub fn storage_io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::with_source(ErrorCode::StorageUnavailable, message, source)
    }

    /// Creates a GENERATION_FAILED error.
    pub fn generation_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::GenerationFailed,
            format!("Generation failed: {}", reason.into()),
        )
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using ServiceError.
pub type Result<T> = std::result::Result<T, ServiceError>;
