use thiserror::Error;

/// The only way an accrual operation can fail. The record is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccrualError {
    #[error("invalid amount {0}: points awarded must be positive")]
    InvalidAmount(i64),
}
