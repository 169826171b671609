use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvoError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Index {index} out of range for weighted index of size {size}")]
    Range { index: usize, size: usize },

    #[error("Invalid weight {0}: weights must be finite and non-negative")]
    InvalidWeight(f64),

    #[error("Slot {slot} does not belong to deme {deme}")]
    InvalidSlot { slot: usize, deme: usize },

    #[error("Record Error: {0}")]
    Record(String),
}

pub type EvoResult<T> = Result<T, EvoError>;
