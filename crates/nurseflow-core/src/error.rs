//! Error types shared by the nurseflow domain model.

use thiserror::Error;

/// Result type alias for core domain operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building domain values or reading configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("acuity {0} is out of range (expected 1..=5)")]
    AcuityOutOfRange(i64),

    #[error("invalid ward configuration: {0}")]
    Config(String),
}
