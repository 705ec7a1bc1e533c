use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Failed to read or write the dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing the required column '{0}'")]
    MissingColumn(String),

    #[error("Cleaned data violates the canonical contract: {0}")]
    Invalid(#[from] core_types::CoreError),

    #[error("The input contains no header row")]
    EmptyInput,
}
