use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("missing sql or datasource uid")]
    MissingInput,

    #[error("query failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("executor request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("executor configuration error: {0}")]
    Config(String),
}
