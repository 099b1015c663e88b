use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("Invalid date literal '{literal}': {reason}")]
    InvalidDate { literal: String, reason: String },

    #[error("Unknown month '{month}' (available: {available})")]
    UnknownMonth { month: String, available: String },

    #[error("Dataset has no orders")]
    EmptyDataset,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Polars error: {0}")]
    Polars(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<polars::prelude::PolarsError> for DemoError {
    fn from(e: polars::prelude::PolarsError) -> Self {
        DemoError::Polars(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DemoError>;
