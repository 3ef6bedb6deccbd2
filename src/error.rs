use thiserror::Error;

#[derive(Error, Debug)]
pub enum SigirError {
    #[error("Irrigation journal error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A field data feed could not be reached or decoded
    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("{0} did not answer within {1:?}")]
    Timeout(String, std::time::Duration),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, SigirError>;
