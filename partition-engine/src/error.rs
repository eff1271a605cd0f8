// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Error types for the operation engine.
///
/// `Validation` errors are raised when an operation is constructed against an
/// illegal target state and never surface as job failures. `Device` and
/// `Tool` errors abort the remaining jobs of the operation they occur in.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("capability unsupported: {0}")]
    Unsupported(String),

    #[error("device error: {0}")]
    Device(String),

    #[error("external tool failed: {0}")]
    Tool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
