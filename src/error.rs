use crate::mcp::errors;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpsError>;

#[derive(Error, Debug)]
pub enum OpsError {
    /// Structural defect found while building the registry.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("operation not found: '{name}' (available: {})", .available.join(", "))]
    NotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("{subject}: {message}")]
    Validation { subject: String, message: String },

    #[error("schema generation failed for {type_name}: {message}")]
    SchemaGeneration { type_name: String, message: String },

    #[error("operation disabled: {0}")]
    Disabled(String),

    /// Raised by the document engine; the message is kept as-is.
    #[error("{message}")]
    Engine { kind: &'static str, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl OpsError {
    pub fn validation(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn parameter(key: &str, message: impl Into<String>) -> Self {
        Self::validation(format!("parameter '{key}'"), message)
    }

    pub fn schema(type_name: &str, message: impl Into<String>) -> Self {
        Self::SchemaGeneration {
            type_name: type_name.to_string(),
            message: message.into(),
        }
    }

    pub fn engine(kind: &'static str, message: impl Into<String>) -> Self {
        Self::Engine {
            kind,
            message: message.into(),
        }
    }

    /// Wire-level error kind reported in `structuredContent.error.kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            OpsError::Configuration(_) => errors::CONFIGURATION,
            OpsError::NotFound { .. } => errors::NOT_FOUND,
            OpsError::Validation { .. } => errors::INVALID_INPUT,
            OpsError::SchemaGeneration { .. } => errors::SCHEMA_GENERATION,
            OpsError::Disabled(_) => errors::DISABLED,
            OpsError::Engine { kind, .. } => *kind,
            OpsError::Internal(_) => errors::INTERNAL_ERROR,
        }
    }
}

impl From<serde_json::Error> for OpsError {
    fn from(error: serde_json::Error) -> Self {
        OpsError::Internal(format!("serialization failed: {error}"))
    }
}
