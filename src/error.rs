//! Error types for model generation.

use thiserror::Error;

/// Errors that can occur while building or writing a model.
///
/// Recoverable conditions (missing optional fields, corrupted type text,
/// unresolved type references) never surface here — they degrade to
/// defaults, fallback tokens, or stub elements. Only unrecoverable I/O
/// and strict-mode structural violations are errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// XML serialization or parsing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON parsing error (input document or profile).
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML parsing error (profile document).
    #[error("YAML error: {0}")]
    Yaml(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Structural invariant violation under strict mode.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unsupported profile format or option.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl GenerateError {
    /// Create an XML error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    /// Create a JSON error.
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json(message.into())
    }

    /// Create a YAML error.
    pub fn yaml(message: impl Into<String>) -> Self {
        Self::Yaml(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
