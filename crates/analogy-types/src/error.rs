//! Error types for the analogy solver's shared types.

use thiserror::Error;

/// Unified error type for configuration and data handling.
#[derive(Debug, Error)]
pub enum AnalogyError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
