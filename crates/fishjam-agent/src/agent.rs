//! The agent media socket: a server-side room participant.
//!
//! The socket is pumped through a pair of channels by two background
//! tasks, so callers never touch the websocket directly: outbound
//! [`AgentCommand`]s drain into the sink, inbound traffic surfaces as
//! [`AgentEvent`]s terminated by a single `Closed`.

use crate::{FishjamError, frame};
use bytes::Bytes;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use serde::Serialize;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{client::IntoClientRequest, protocol::Message as WsMessage},
};
use tracing::{debug, warn};
use uuid::Uuid;

type AgentSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CHANNEL_BUFFER: usize = 64;

/// Identifier of an audio track on the agent socket.
///
/// Track ids are generated client-side and announced to the server, so
/// `create_track` never needs a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TrackId(Uuid);

impl TrackId {
    /// Generate a fresh track id. Ids are client-generated and announced
    /// to the server, never assigned by it.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub(crate) fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// How the agent subscribes to the room's other participants.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscribeMode {
    Auto,
    Manual,
}

/// Audio the agent receives from the room.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOutput {
    pub audio_format: String,
    pub audio_sample_rate: u32,
}

/// Behaviour requested for the agent when it joins a room.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentOptions {
    pub subscribe_mode: SubscribeMode,
    pub output: AgentOutput,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            subscribe_mode: SubscribeMode::Auto,
            output: AgentOutput {
                audio_format: "pcm16".to_string(),
                audio_sample_rate: 16_000,
            },
        }
    }
}

/// Parameters of a track the agent publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackParams {
    pub encoding: String,
    pub sample_rate: u32,
    pub channels: u8,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            encoding: "pcm16".to_string(),
            sample_rate: 16_000,
            channels: 1,
        }
    }
}

/// Commands accepted by the agent socket writer.
#[derive(Debug, PartialEq)]
pub enum AgentCommand {
    /// Announce a new publishable track.
    CreateTrack { track: TrackId, params: TrackParams },
    /// Publish binary media on a previously announced track.
    SendData { track: TrackId, data: Bytes },
    /// Close the socket and stop the writer.
    Disconnect,
}

/// Events emitted by the agent socket reader.
#[derive(Debug)]
pub enum AgentEvent {
    /// Binary media received from another participant's track.
    TrackData { track: TrackId, data: Bytes },
    /// The socket closed, server-initiated or after `Disconnect`.
    Closed,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigureFrame<'a> {
    r#type: &'static str,
    #[serde(flatten)]
    options: &'a AgentOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackAnnounce<'a> {
    r#type: &'static str,
    track_id: TrackId,
    #[serde(flatten)]
    params: &'a TrackParams,
}

/// A connected server-side room participant.
///
/// Holds only the command channel; the socket itself lives in the
/// background writer/reader tasks spawned at connect time.
pub struct FishjamAgent {
    commands: mpsc::Sender<AgentCommand>,
}

impl FishjamAgent {
    pub(crate) async fn connect(
        socket_url: &str,
        management_token: &str,
        room_id: &str,
        options: AgentOptions,
    ) -> Result<(Self, mpsc::Receiver<AgentEvent>), FishjamError> {
        let url = format!("{socket_url}/socket/agent/{room_id}");
        let mut request = url
            .into_client_request()
            .map_err(|err| FishjamError::Request(err.to_string()))?;
        let bearer = format!("Bearer {management_token}")
            .parse()
            .map_err(|_| FishjamError::Request("management token is not a valid header".into()))?;
        request.headers_mut().insert("Authorization", bearer);

        let (socket, _) = connect_async(request).await?;
        let (mut sink, stream) = socket.split();

        // The configuration frame must precede any media.
        let configure = serde_json::to_string(&ConfigureFrame {
            r#type: "configure",
            options: &options,
        })?;
        sink.send(WsMessage::Text(configure.into())).await?;
        debug!(%room_id, "agent socket connected");

        let (command_tx, command_rx) = mpsc::channel(CHANNEL_BUFFER);
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_BUFFER);
        tokio::spawn(write_loop(sink, command_rx));
        tokio::spawn(read_loop(stream, event_tx));

        Ok((Self { commands: command_tx }, event_rx))
    }

    /// Announce a new publishable track and return its identifier.
    pub async fn create_track(&self, params: TrackParams) -> Result<TrackId, FishjamError> {
        let track = TrackId::new();
        self.commands
            .send(AgentCommand::CreateTrack { track, params })
            .await
            .map_err(|_| FishjamError::Closed)?;
        Ok(track)
    }

    /// Publish binary media on one of the agent's tracks.
    pub async fn send_data(&self, track: TrackId, data: Bytes) -> Result<(), FishjamError> {
        self.commands
            .send(AgentCommand::SendData { track, data })
            .await
            .map_err(|_| FishjamError::Closed)
    }

    /// Ask the writer to close the socket. Safe to call on an already
    /// closed agent.
    pub async fn disconnect(&self) {
        let _ = self.commands.send(AgentCommand::Disconnect).await;
    }

    /// Hand out the raw command channel; a relay loop owns it from here.
    pub fn into_sender(self) -> mpsc::Sender<AgentCommand> {
        self.commands
    }
}

async fn write_loop(
    mut sink: SplitSink<AgentSocket, WsMessage>,
    mut commands: mpsc::Receiver<AgentCommand>,
) {
    while let Some(command) = commands.recv().await {
        let result = match command {
            AgentCommand::CreateTrack { track, params } => {
                match serde_json::to_string(&TrackAnnounce {
                    r#type: "createTrack",
                    track_id: track,
                    params: &params,
                }) {
                    Ok(text) => sink.send(WsMessage::Text(text.into())).await,
                    Err(err) => {
                        warn!(error = %err, "failed to encode track announce");
                        continue;
                    }
                }
            }
            AgentCommand::SendData { track, data } => {
                sink.send(WsMessage::Binary(frame::encode(track, &data))).await
            }
            AgentCommand::Disconnect => {
                let _ = sink.send(WsMessage::Close(None)).await;
                break;
            }
        };
        if let Err(err) = result {
            debug!(error = %err, "agent socket write failed, stopping writer");
            break;
        }
    }
}

async fn read_loop(mut stream: SplitStream<AgentSocket>, events: mpsc::Sender<AgentEvent>) {
    while let Some(message) = stream.next().await {
        match message {
            Ok(WsMessage::Binary(data)) => match frame::decode(data) {
                Ok((track, data)) => {
                    if events.send(AgentEvent::TrackData { track, data }).await.is_err() {
                        return;
                    }
                }
                Err(err) => warn!(error = %err, "discarding malformed media frame"),
            },
            Ok(WsMessage::Text(text)) => debug!(%text, "agent socket text frame"),
            Ok(WsMessage::Close(close)) => {
                debug!(?close, "agent socket closed by server");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "agent socket read failed");
                break;
            }
        }
    }
    let _ = events.send(AgentEvent::Closed).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_frame_matches_wire_shape() {
        let options = AgentOptions::default();
        let json = serde_json::to_value(ConfigureFrame {
            r#type: "configure",
            options: &options,
        })
        .unwrap();

        assert_eq!(json["type"], "configure");
        assert_eq!(json["subscribeMode"], "auto");
        assert_eq!(json["output"]["audioFormat"], "pcm16");
        assert_eq!(json["output"]["audioSampleRate"], 16_000);
    }

    #[test]
    fn track_announce_flattens_params() {
        let params = TrackParams::default();
        let track = TrackId::new();
        let json = serde_json::to_value(TrackAnnounce {
            r#type: "createTrack",
            track_id: track,
            params: &params,
        })
        .unwrap();

        assert_eq!(json["type"], "createTrack");
        assert_eq!(json["trackId"], track.as_uuid().to_string());
        assert_eq!(json["encoding"], "pcm16");
        assert_eq!(json["sampleRate"], 16_000);
        assert_eq!(json["channels"], 1);
    }
}
