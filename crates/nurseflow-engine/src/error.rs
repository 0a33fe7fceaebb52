//! Engine error types.

use nurseflow_balance::BalanceError;
use thiserror::Error;

/// Errors returned by engine operations. All are recoverable by the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),

    #[error("engine has no nurses")]
    NoNurses,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("nurse {nurse} is not qualified for patient {patient} (requires {required_unit})")]
    UnqualifiedTransfer {
        patient: String,
        nurse: String,
        required_unit: String,
    },

    #[error("patient not found: {0}")]
    UnknownPatient(String),

    #[error("nurse not found: {0}")]
    UnknownNurse(String),

    #[error("patient already admitted: {0}")]
    DuplicatePatient(String),

    #[error(transparent)]
    Balance(#[from] BalanceError),
}

pub type EngineResult<T> = Result<T, EngineError>;
