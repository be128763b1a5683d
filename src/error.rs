//! Error types for ride-dispatch
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI
//!
//! A dispatch itself never returns these errors: navigation failures are
//! folded into `DispatchResult::Failed`. They surface at the edges, when
//! loading configuration or reading an identity snapshot, and when the CLI
//! reports a failed dispatch.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::navigator::NavigationError;

/// Result type alias for ride-dispatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Identity errors (3xx)
    IdentityMalformed = 300,
    IdentitySerialize = 301,

    // Navigation errors (4xx)
    NavigationFailed = 400,
    NavigationUnknownRoute = 401,
    NavigationEmptyTarget = 402,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Identity Errors
    // ─────────────────────────────────────────────────────────────

    /// Identity snapshot is not a JSON object
    #[error("Malformed identity snapshot from {source_name}: {message}")]
    IdentityMalformed { source_name: String, message: String },

    /// JSON serialization error (reports, snapshots)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Navigation Errors
    // ─────────────────────────────────────────────────────────────

    /// Navigator rejected the target
    #[error("Navigation failed: {0}")]
    Navigation(#[from] NavigationError),

    /// Dispatch settled as failed
    #[error("Dispatch failed: {reason}")]
    DispatchFailed { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::IdentityMalformed { .. } => ErrorCode::IdentityMalformed,
            Error::Json(_) => ErrorCode::IdentitySerialize,

            Error::Navigation(e) => match e {
                NavigationError::EmptyTarget => ErrorCode::NavigationEmptyTarget,
                NavigationError::UnknownRoute { .. } => ErrorCode::NavigationUnknownRoute,
            },
            Error::DispatchFailed { .. } => ErrorCode::NavigationFailed,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'ride-dispatch config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'ride-dispatch config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the [routes] and [navigator] sections. Every route must be non-empty."
            ),
            Error::IdentityMalformed { .. } => Some(
                "An identity snapshot must be a JSON object, e.g. {\"loaded\": true, \"role\": \"driver\"}."
            ),
            Error::Navigation(NavigationError::UnknownRoute { .. })
            | Error::DispatchFailed { .. } => Some(
                "Add the target to [navigator].known_routes or leave the list empty to accept any route."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            self.code().as_str(),
            self
        );

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config parse error, keeping the TOML diagnostic
    pub fn config_parse(source: toml::de::Error) -> Self {
        Error::ConfigParse {
            message: source.message().to_string(),
            source: Some(source),
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a malformed identity error
    pub fn identity_malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::IdentityMalformed {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create a dispatch failed error
    pub fn dispatch_failed(reason: impl Into<String>) -> Self {
        Error::DispatchFailed {
            reason: reason.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::IdentityMalformed.as_str(), "E300");
        assert_eq!(ErrorCode::NavigationFailed.as_str(), "E400");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoRead.exit_code(), 20);
        assert_eq!(ErrorCode::IdentityMalformed.exit_code(), 30);
        assert_eq!(ErrorCode::NavigationUnknownRoute.exit_code(), 40);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_navigation_error_codes() {
        let err: Error = NavigationError::EmptyTarget.into();
        assert_eq!(err.code(), ErrorCode::NavigationEmptyTarget);

        let err: Error = NavigationError::UnknownRoute {
            target: "nowhere".into(),
        }
        .into();
        assert_eq!(err.code(), ErrorCode::NavigationUnknownRoute);
        assert!(err.to_string().contains("nowhere"));

        let err = Error::dispatch_failed("stack full");
        assert_eq!(err.code(), ErrorCode::NavigationFailed);
        assert_eq!(err.exit_code(), 40);
    }

    #[test]
    fn test_config_parse_keeps_message() {
        let source = toml::from_str::<toml::Value>("[routes\n").unwrap_err();
        let err = Error::config_parse(source);
        assert_eq!(err.code(), ErrorCode::ConfigParseError);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_suggestions() {
        let err = Error::config_not_found("/test");
        assert!(err.suggestion().unwrap().contains("config init"));

        let err = Error::dispatch_failed("unknown route");
        assert!(err.suggestion().unwrap().contains("known_routes"));

        assert!(Error::Internal("boom".into()).suggestion().is_none());
    }

    #[test]
    fn test_format_for_terminal() {
        let formatted = Error::config_not_found("/test/config.toml").format_for_terminal();
        assert!(formatted.contains("E100"));
        assert!(formatted.contains("\x1b[31m"));
        assert!(formatted.contains("Hint"));
    }

    #[test]
    fn test_format_for_log() {
        let formatted = Error::identity_malformed("snapshot.json", "expected object").format_for_log();
        assert!(formatted.contains("[E300]"));
        assert!(formatted.contains("snapshot.json"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_io_read_not_found() {
        let err = Error::IoRead {
            path: PathBuf::from("/missing.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.code(), ErrorCode::IoNotFound);
        assert_eq!(err.exit_code(), 20);
    }
}
