use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Row {row} violates the canonical table contract: {reason}")]
    InvariantViolation { row: usize, reason: String },
}
