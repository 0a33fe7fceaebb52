//! Balance computation errors.

use thiserror::Error;

pub type BalanceResult<T> = Result<T, BalanceError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BalanceError {
    #[error("balance metrics requested for an empty nurse population")]
    EmptyPopulation,
}
