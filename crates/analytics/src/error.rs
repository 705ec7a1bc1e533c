use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("The order table is empty; '{0}' cannot be computed")]
    EmptyDataset(String),

    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
