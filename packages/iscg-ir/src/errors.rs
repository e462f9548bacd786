//! Error types for iscg-ir
//!
//! Fatal errors only. Per-function warnings live in
//! [`Diagnostics`](crate::shared::models::Diagnostics).

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for iscg-ir operations
#[derive(Debug, Error)]
pub enum IscgError {
    /// Instruction that violates its opcode's shape (fatal for the function)
    #[error("Malformed instruction #{id} in '{function}': {reason} (`{text}`)")]
    MalformedInstruction {
        function: String,
        id: u32,
        text: String,
        reason: String,
    },

    /// Graph that cannot be flattened consistently (fatal for the function)
    #[error("Serialization invariant violated in '{function}': {reason}")]
    SerializationInvariantViolation { function: String, reason: String },

    /// IO error with the offending path
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker pool could not be started
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl IscgError {
    pub fn malformed(
        function: impl Into<String>,
        id: u32,
        text: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        IscgError::MalformedInstruction {
            function: function.into(),
            id,
            text: text.into(),
            reason: reason.into(),
        }
    }

    pub fn invariant(function: impl Into<String>, reason: impl Into<String>) -> Self {
        IscgError::SerializationInvariantViolation {
            function: function.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IscgError::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable short name used as the `kind` field of the error log
    pub fn kind(&self) -> &'static str {
        match self {
            IscgError::MalformedInstruction { .. } => "malformed_instruction",
            IscgError::SerializationInvariantViolation { .. } => "serialization_invariant_violation",
            IscgError::Io { .. } => "io",
            IscgError::Json(_) => "json",
            IscgError::Config(_) => "config",
            IscgError::ThreadPool(_) => "thread_pool",
        }
    }
}

/// Result type alias for iscg operations
pub type Result<T> = std::result::Result<T, IscgError>;
