// Failure taxonomy for a single run. Every variant is fatal for the run;
// a malformed local snapshot is not an error (see snapshot_store).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    /// Required credential or identifier absent, or config rejected.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// GraphQL `errors` list in an otherwise successful response.
    #[error("analytics API returned errors: {}", .0.join("; "))]
    Remote(Vec<String>),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response with no GraphQL error list; `body` is truncated.
    #[error("analytics API responded with HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Query succeeded but matched no account or zone.
    #[error("no {0} matched the configured identifier")]
    EmptyResult(&'static str),

    /// Creating the output directory or writing/renaming the snapshot file failed.
    #[error("failed to persist snapshot: {0}")]
    Persist(#[from] std::io::Error),

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl RunError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::Configuration(_) | RunError::EmptyResult(_) => 2,
            _ => 1,
        }
    }
}
