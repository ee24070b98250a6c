use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Alignment error: {missing} record(s) of the base dataset are absent from {output} (first: {first_identity})")]
    Alignment {
        output: String,
        missing: usize,
        first_identity: String,
    },

    #[error("Conversion error: {0}")]
    Convert(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
