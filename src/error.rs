#[derive(Debug, thiserror::Error)]
pub enum TangoCrmError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
}

pub type Result<T> = std::result::Result<T, TangoCrmError>;
