//! Error types for BuildShift dashboard operations.
//!
//! This module defines [`BuildShiftError`], an error enum covering all error
//! cases across the dashboard. Errors are designed for visibility: no silent
//! failures, clear actionable messages, no automatic retries (the user decides
//! if/when to refresh).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`BuildShiftError`].
pub type Result<T> = std::result::Result<T, BuildShiftError>;

/// Error type for all BuildShift dashboard operations.
#[derive(Debug, Error)]
pub enum BuildShiftError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // API Errors
    // =========================================================================
    /// HTTP request failed before a response arrived
    #[error("Request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    /// Backend returned a non-success status
    #[error("Backend returned {status} for {endpoint}: {body}")]
    BackendStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response body could not be deserialized
    #[error("Invalid response from {endpoint}: {message}")]
    BackendResponse { endpoint: String, message: String },

    /// Request timed out
    #[error("Request to {endpoint} timed out after {timeout_secs}s")]
    RequestTimeout { endpoint: String, timeout_secs: u64 },

    // =========================================================================
    // Parsing Errors
    // =========================================================================
    /// JSON parsing error
    #[error("JSON parse error in {context}: {message}")]
    JsonParse {
        context: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Notion response did not have the expected shape
    #[error("Malformed Notion response in {context}: {message}")]
    NotionShape { context: String, message: String },

    // =========================================================================
    // Machine/Task Errors
    // =========================================================================
    /// Machine not found
    #[error("Machine not found: {ip}")]
    MachineNotFound { ip: String },

    /// Machine payload was rejected before sending
    #[error("Invalid machine payload: {message}")]
    MachineInvalid { message: String },

    /// Removal blocked by an active task
    #[error("Cannot remove machine {ip}: task is {status}")]
    MachineBusy { ip: String, status: String },

    /// Task transition is not legal from the current state
    #[error("Illegal task transition on {ip}: {from} -> {to}")]
    IllegalTransition {
        ip: String,
        from: String,
        to: String,
    },

    /// Task payload was rejected before sending
    #[error("Invalid task payload: {message}")]
    TaskInvalid { message: String },

    // =========================================================================
    // Recipe Errors
    // =========================================================================
    /// Recipe not found in the loaded list
    #[error("Recipe not found: {recipe_id}")]
    RecipeNotFound { recipe_id: String },

    /// Recipe page had no usable fields
    #[error("Recipe {recipe_id} has no numeric or date fields")]
    RecipeEmpty { recipe_id: String },

    // =========================================================================
    // TUI Errors
    // =========================================================================
    /// Terminal initialization failed
    #[error("Terminal initialization failed: {message}")]
    TerminalInit { message: String },

    /// Terminal restore failed
    #[error("Failed to restore terminal: {message}")]
    TerminalRestore { message: String },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in the dashboard)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BuildShiftError {
    // =========================================================================
    // Constructor helpers for common error patterns
    // =========================================================================

    /// Create a ConfigNotFound error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a JSON parse error
    pub fn json_parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            context: context.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a request error
    pub fn request(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a backend response error
    pub fn backend_response(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Error classification helpers
    // =========================================================================

    /// Returns true if this error came from the network/backend layer.
    ///
    /// Network errors are surfaced with a refresh hint instead of a fallback,
    /// except in list views which fall back to placeholder data.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            Self::Request { .. }
                | Self::BackendStatus { .. }
                | Self::BackendResponse { .. }
                | Self::RequestTimeout { .. }
        )
    }

    /// Returns true if this error is fatal (should exit the application)
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TerminalInit { .. } | Self::Internal { .. })
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigInvalid { .. }
                | Self::ConfigValidation { .. }
        )
    }

    /// Returns true if the user action was rejected by a local guard
    /// (as opposed to a backend failure).
    pub fn is_rejected_action(&self) -> bool {
        matches!(
            self,
            Self::MachineBusy { .. }
                | Self::IllegalTransition { .. }
                | Self::MachineInvalid { .. }
                | Self::TaskInvalid { .. }
        )
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Create ~/.buildshift/config.yaml or pass --base-url")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in ~/.buildshift/config.yaml"),
            Self::Request { .. } | Self::RequestTimeout { .. } => {
                Some("Check that the backend is reachable, then press 'r' to refresh")
            }
            Self::BackendStatus { .. } => Some("Press 'r' to refresh"),
            Self::MachineBusy { .. } => Some("Kill or pause the task first"),
            Self::TerminalInit { .. } => Some("Try running in a different terminal"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_error() {
        let err = BuildShiftError::config_not_found("/home/user/.buildshift/config.yaml");
        assert!(err.to_string().contains("Configuration not found"));
        assert!(err.is_config_error());
        assert!(!err.is_fatal());
        assert!(err.guidance().is_some());
    }

    #[test]
    fn test_machine_busy_error() {
        let err = BuildShiftError::MachineBusy {
            ip: "10.0.0.12".into(),
            status: "running".into(),
        };
        assert!(err.to_string().contains("10.0.0.12"));
        assert!(err.is_rejected_action());
        assert_eq!(err.guidance(), Some("Kill or pause the task first"));
    }

    #[test]
    fn test_error_classification() {
        assert!(BuildShiftError::request("/api/x", "connection refused").is_api_error());
        assert!(
            BuildShiftError::RequestTimeout {
                endpoint: "/api/x".into(),
                timeout_secs: 30
            }
            .is_api_error()
        );
        assert!(BuildShiftError::internal("bug").is_fatal());
        assert!(!BuildShiftError::internal("bug").is_api_error());
    }
}
