use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("connection error: {0}")]
    Connection(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Deriv API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("collection worker failed: {0}")]
    Worker(String),
}
