//! Error types and handling for EnergyMuffin
//!
//! This module defines the error types used throughout the application.
//! Caller mistakes (input/validation) are kept apart from failures of the
//! remote building energy model API (transport/contract/completeness), so
//! the HTTP layer can report them distinctly.

use thiserror::Error;

/// Result type alias for EnergyMuffin operations
pub type Result<T> = std::result::Result<T, MuffinError>;

/// Main error type for EnergyMuffin
#[derive(Debug, Error)]
pub enum MuffinError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed or incomplete inbound request
    #[error("Input error: {message}")]
    Input { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Network failure, timeout or non-2xx answer from the forecasting API
    #[error("Upstream transport error: {message}")]
    UpstreamTransport {
        status: Option<u16>,
        message: String,
    },

    /// Forecasting API answered with a body that does not match its contract
    #[error("Upstream contract error: {message}")]
    UpstreamContract { message: String },

    /// Two interval records share the same start timestamp and variable
    #[error("Upstream contract error: duplicate interval for {variable} at {timestamp}")]
    DuplicateInterval { timestamp: String, variable: String },

    /// A variable required for costing is absent from the forecast
    #[error("Incomplete forecast data: variable {variable} missing")]
    MissingVariable { variable: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl MuffinError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        MuffinError::Config {
            message: message.into(),
        }
    }

    /// Create a new input error
    pub fn input<S: Into<String>>(message: S) -> Self {
        MuffinError::Input {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, S: Into<String>>(field: F, message: S) -> Self {
        MuffinError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new transport error, optionally carrying the HTTP status
    pub fn upstream_transport<S: Into<String>>(status: Option<u16>, message: S) -> Self {
        MuffinError::UpstreamTransport {
            status,
            message: message.into(),
        }
    }

    /// Create a new upstream contract error
    pub fn upstream_contract<S: Into<String>>(message: S) -> Self {
        MuffinError::UpstreamContract {
            message: message.into(),
        }
    }

    pub fn duplicate_interval<T: ToString, S: Into<String>>(timestamp: T, variable: S) -> Self {
        MuffinError::DuplicateInterval {
            timestamp: timestamp.to_string(),
            variable: variable.into(),
        }
    }

    pub fn missing_variable<S: Into<String>>(variable: S) -> Self {
        MuffinError::MissingVariable {
            variable: variable.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        MuffinError::Io {
            message: message.into(),
        }
    }

    /// Short machine-readable label used in HTTP error bodies and logs
    pub fn kind(&self) -> &'static str {
        match self {
            MuffinError::Config { .. } => "config",
            MuffinError::Input { .. } => "input",
            MuffinError::Validation { .. } => "validation",
            MuffinError::UpstreamTransport { .. } => "upstream_transport",
            MuffinError::UpstreamContract { .. } => "upstream_contract",
            MuffinError::DuplicateInterval { .. } => "upstream_contract",
            MuffinError::MissingVariable { .. } => "data_incomplete",
            MuffinError::Serialization { .. } => "serialization",
            MuffinError::Io { .. } => "io",
        }
    }

    /// Whether the failure originates from the remote forecasting API
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            MuffinError::UpstreamTransport { .. }
                | MuffinError::UpstreamContract { .. }
                | MuffinError::DuplicateInterval { .. }
                | MuffinError::MissingVariable { .. }
        )
    }

    /// Whether the failure was caused by the caller's request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MuffinError::Input { .. } | MuffinError::Validation { .. }
        )
    }
}

impl From<std::io::Error> for MuffinError {
    fn from(err: std::io::Error) -> Self {
        MuffinError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for MuffinError {
    fn from(err: serde_yaml::Error) -> Self {
        MuffinError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MuffinError {
    fn from(err: serde_json::Error) -> Self {
        MuffinError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for MuffinError {
    fn from(err: reqwest::Error) -> Self {
        // Builder failures are local (bad URL, header value or TLS setup)
        if err.is_builder() {
            return MuffinError::config(format!("HTTP client setup failed: {}", err));
        }
        let status = err.status().map(|s| s.as_u16());
        if err.is_timeout() {
            return MuffinError::upstream_transport(status, format!("request timed out: {}", err));
        }
        MuffinError::upstream_transport(status, err.to_string())
    }
}
