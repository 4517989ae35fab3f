use reqwest::StatusCode;

/// Errors surfaced by the Fishjam client.
#[derive(Debug, thiserror::Error)]
pub enum FishjamError {
    #[error("fishjam api error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("agent socket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("invalid agent socket request: {0}")]
    Request(String),
    #[error("failed to encode agent frame: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("malformed media frame: {0}")]
    Frame(String),
    #[error("agent connection closed")]
    Closed,
}
