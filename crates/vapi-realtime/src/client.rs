//! Call creation over the Vapi REST API.

use crate::VapiError;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.vapi.ai";

/// Sample rate shared by both legs of the bridge; the media room is
/// provisioned with the same value so the relay never transcodes.
pub const SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCallRequest<'a> {
    assistant_id: &'a str,
    transport: TransportOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransportOptions {
    provider: &'static str,
    audio_format: AudioFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioFormat {
    format: &'static str,
    container: &'static str,
    sample_rate: u32,
}

impl TransportOptions {
    /// Raw little-endian 16-bit PCM over the websocket transport.
    fn pcm16() -> Self {
        Self {
            provider: "vapi.websocket",
            audio_format: AudioFormat {
                format: "pcm_s16le",
                container: "raw",
                sample_rate: SAMPLE_RATE,
            },
        }
    }
}

/// A created call, ready for its websocket leg to be opened.
#[derive(Debug, Clone, Deserialize)]
pub struct VapiCall {
    pub id: String,
    pub transport: CallTransport,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTransport {
    pub websocket_call_url: String,
}

/// REST client for the voice-agent service.
pub struct VapiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    assistant_id: String,
}

impl VapiClient {
    pub fn new(api_key: &str, assistant_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            assistant_id: assistant_id.to_string(),
        }
    }

    /// Point the client at a different API host. Used by tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Create a websocket-transport call against the configured
    /// assistant, declaring the raw mono 16 kHz PCM format the bridge
    /// forwards verbatim.
    pub async fn create_call(&self) -> Result<VapiCall, VapiError> {
        let response = self
            .http
            .post(format!("{}/call", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&CreateCallRequest {
                assistant_id: &self.assistant_id,
                transport: TransportOptions::pcm16(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VapiError::Api { status, body });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn create_call_request_declares_matching_pcm_format() {
        let json = serde_json::to_value(CreateCallRequest {
            assistant_id: "asst-1",
            transport: TransportOptions::pcm16(),
        })
        .unwrap();

        assert_eq!(json["assistantId"], "asst-1");
        assert_eq!(json["transport"]["provider"], "vapi.websocket");
        assert_eq!(json["transport"]["audioFormat"]["format"], "pcm_s16le");
        assert_eq!(json["transport"]["audioFormat"]["container"], "raw");
        assert_eq!(json["transport"]["audioFormat"]["sampleRate"], 16_000);
    }

    #[tokio::test]
    async fn create_call_parses_call_id_and_socket_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/call"))
            .and(header("authorization", "Bearer key-1"))
            .and(body_partial_json(serde_json::json!({"assistantId": "asst-1"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": "call-7",
                "transport": { "websocketCallUrl": "wss://example.test/call-7" }
            })))
            .mount(&server)
            .await;

        let client = VapiClient::new("key-1", "asst-1").with_base_url(&server.uri());
        let call = client.create_call().await.unwrap();

        assert_eq!(call.id, "call-7");
        assert_eq!(call.transport.websocket_call_url, "wss://example.test/call-7");
    }

    #[tokio::test]
    async fn create_call_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/call"))
            .respond_with(ResponseTemplate::new(400).set_body_string("assistant not found"))
            .mount(&server)
            .await;

        let client = VapiClient::new("key-1", "missing").with_base_url(&server.uri());
        let err = client.create_call().await.unwrap_err();

        match err {
            VapiError::Api { status, body } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(body, "assistant not found");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
