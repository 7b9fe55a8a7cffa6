use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed record in {file} line {line}: {detail}")]
    MalformedRecord {
        file: String,
        line: usize,
        detail: String,
    },

    #[error("Schema mismatch in {file}: expected {expected} columns, got {actual}")]
    SchemaMismatch {
        file: String,
        expected: usize,
        actual: usize,
    },

    #[error("Joined view could not be built: {detail}")]
    JoinIntegrity { detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Plot rendering failed for {path}: {message}")]
    Render { path: String, message: String },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
