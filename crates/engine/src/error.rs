//! Engine error types.

use thiserror::Error;
use tripkit_domain::DomainError;

/// Any failure that aborts a pipeline pass or the runner.
///
/// A pass that fails returns no partial result: the caller's context is
/// untouched and no ops are emitted.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Authoring or evaluation error raised by the rules core.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// An action's params or required event failed validation at run time.
    #[error("Error validating \"{action}\": {warning}")]
    Validation { action: String, warning: String },

    /// Triggers kept setting each other off past the configured depth.
    #[error("Cascade exceeded maximum depth of {max_depth} while applying \"{action}\"")]
    CascadeDepthExceeded { max_depth: usize, action: String },

    /// Invalid setting value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file was not valid JSON for the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn validation(action: impl Into<String>, warning: impl Into<String>) -> Self {
        Self::Validation {
            action: action.into(),
            warning: warning.into(),
        }
    }
}
