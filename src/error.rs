use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridwatchError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Datetime error: {0}")]
    Time(#[from] jiff::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input file not found: {0}")]
    NotFound(String),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing required columns in {table}: {columns}")]
    MissingColumns { table: String, columns: String },

    #[error("Column {0} appears more than once after stripping whitespace")]
    DuplicateColumn(String),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Unknown write mode: {0}")]
    InvalidWriteMode(String),

    #[error("Unknown chart: {0}")]
    UnknownChart(String),

    #[error("Query task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, GridwatchError>;
