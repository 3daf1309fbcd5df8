//! Domain error types
//!
//! This module defines the error hierarchy for the exporter. Errors raised by
//! repository backends are expressed as [`RepositoryError`] and XML problems
//! as [`ParseError`]; neither exposes third-party types.

use thiserror::Error;

/// Main exporter error type
///
/// This is the primary error type used throughout the crate.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote repository errors (transport, collection access, rules)
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// metadata.xml parsing errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A required attribute lookup failed (e.g. the creator's email)
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Export state errors
    #[error("Export state error: {0}")]
    State(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ExporterError {
    /// Process exit code used by the CLI for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ExporterError::Configuration(_) | ExporterError::Validation(_) => 2,
            ExporterError::Parse(_) | ExporterError::Lookup(_) => 3,
            ExporterError::Repository(RepositoryError::ConnectionFailed(_)) => 4,
            _ => 5,
        }
    }
}

/// Repository-specific errors
///
/// Errors reported by a repository backend (session, collection, metadata
/// store, remote rules).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Failed to open a session
    #[error("Failed to connect to repository: {0}")]
    ConnectionFailed(String),

    /// No session has been opened yet
    #[error("Not connected to repository")]
    NotConnected,

    /// Collection does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// User does not exist
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Data object does not exist
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// AVU already attached to the object
    #[error("Duplicate metadata value: {key} = {value}")]
    DuplicateValue { key: String, value: String },

    /// AVU not attached to the object
    #[error("Metadata value not found: {key} = {value}")]
    ValueNotFound { key: String, value: String },

    /// Remote rule invocation failed
    #[error("Rule {rule} failed: {message}")]
    RuleFailed { rule: String, message: String },

    /// Backend storage failure
    #[error("Repository I/O error: {0}")]
    Io(String),
}

/// metadata.xml parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The document is not well-formed
    #[error("Malformed XML: {0}")]
    Malformed(String),

    /// A required element is missing
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A required element has no text
    #[error("Element has no text: {0}")]
    MissingText(String),

    /// The document is not valid UTF-8
    #[error("Invalid encoding: {0}")]
    Encoding(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for ExporterError {
    fn from(err: std::io::Error) -> Self {
        ExporterError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ExporterError {
    fn from(err: serde_json::Error) -> Self {
        ExporterError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ExporterError {
    fn from(err: toml::de::Error) -> Self {
        ExporterError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<quick_xml::Error> for ParseError {
    fn from(err: quick_xml::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}
