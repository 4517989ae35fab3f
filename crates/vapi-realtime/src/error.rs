use reqwest::StatusCode;

/// Errors surfaced by the Vapi client.
#[derive(Debug, thiserror::Error)]
pub enum VapiError {
    #[error("vapi api error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("call socket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
}
