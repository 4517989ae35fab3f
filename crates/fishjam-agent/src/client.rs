//! Management REST client for rooms, peers and agents.

use crate::{
    FishjamError,
    agent::{AgentEvent, AgentOptions, FishjamAgent},
};
use serde::{Deserialize, de::DeserializeOwned};
use tokio::sync::mpsc;

/// A media room created through the management API.
#[derive(Debug, Clone, Deserialize)]
pub struct Room {
    pub id: String,
}

/// Join credential for a browser peer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    pub peer_token: String,
}

/// Management client for a Fishjam instance.
pub struct FishjamClient {
    http: reqwest::Client,
    base_url: String,
    socket_url: String,
    management_token: String,
}

impl FishjamClient {
    pub fn new(fishjam_id: &str, management_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("https://{fishjam_id}.fishjam.io"),
            socket_url: format!("wss://{fishjam_id}.fishjam.io"),
            management_token: management_token.to_string(),
        }
    }

    /// Point the client at explicit base URLs instead of the hosted
    /// instance derived from the id. Used for self-hosted deployments
    /// and tests.
    pub fn with_base_url(mut self, base_url: &str, socket_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self.socket_url = socket_url.trim_end_matches('/').to_string();
        self
    }

    /// Create a fresh media room and return its provider-assigned id.
    pub async fn create_room(&self) -> Result<Room, FishjamError> {
        let response = self
            .http
            .post(format!("{}/room", self.base_url))
            .bearer_auth(&self.management_token)
            .send()
            .await?;
        json_or_api_error(response).await
    }

    /// Create a browser join credential for the given room.
    pub async fn create_peer(&self, room_id: &str) -> Result<Peer, FishjamError> {
        let response = self
            .http
            .post(format!("{}/room/{room_id}/peer", self.base_url))
            .bearer_auth(&self.management_token)
            .send()
            .await?;
        json_or_api_error(response).await
    }

    /// Join the room as a server-side agent participant.
    ///
    /// Returns the agent handle plus the receiver its media and close
    /// events arrive on.
    pub async fn create_agent(
        &self,
        room_id: &str,
        options: AgentOptions,
    ) -> Result<(FishjamAgent, mpsc::Receiver<AgentEvent>), FishjamError> {
        FishjamAgent::connect(&self.socket_url, &self.management_token, room_id, options).await
    }
}

async fn json_or_api_error<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, FishjamError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FishjamError::Api { status, body });
    }
    Ok(response.json().await?)
}
