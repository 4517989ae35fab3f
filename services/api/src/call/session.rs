//! The duplex relay task behind every live call.
//!
//! Each call owns one dedicated tokio task that drains three channels:
//! media events from the room agent, frames from the voice-agent socket
//! and stop commands from the control surface. Audio is forwarded
//! verbatim in both directions; non-binary voice-agent frames are
//! interpreted as control traffic and fanned out as session events.

use super::{
    events::{EventKind, EventSender, SessionEvent},
    registry::SessionRegistry,
};
use fishjam_agent::{AgentCommand, AgentEvent, TrackId};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{Instrument, debug, error, info, info_span, warn};
use vapi_realtime::{ClientFrame, ControlEnvelope, ServerFrame};

/// Commands accepted by a running relay task.
#[derive(Debug)]
pub enum SessionCommand {
    /// Tear the call down: end-call to the voice agent, then close.
    Stop,
}

/// One active call: both transport ends plus the event fan-out.
///
/// The task spawned by [`CallSession::spawn`] is the exclusive owner of
/// both transports, so endpoint release happens exactly once no matter
/// which teardown path wins.
pub struct CallSession {
    pub room_id: String,
    pub track: TrackId,
    pub agent_tx: mpsc::Sender<AgentCommand>,
    pub agent_rx: mpsc::Receiver<AgentEvent>,
    pub vapi_tx: mpsc::Sender<ClientFrame>,
    pub vapi_rx: mpsc::Receiver<ServerFrame>,
    pub events: EventSender,
    pub commands: mpsc::Receiver<SessionCommand>,
    pub registry: Arc<SessionRegistry>,
}

impl CallSession {
    /// Spawns the relay loop on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        let span = info_span!("call", room_id = %self.room_id);
        tokio::spawn(self.run().instrument(span))
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                Some(command) = self.commands.recv() => match command {
                    SessionCommand::Stop => {
                        // End-call first so the agent hangs up cleanly.
                        let _ = self.vapi_tx.send(ClientFrame::EndCall).await;
                        let _ = self.vapi_tx.send(ClientFrame::Close).await;
                        debug!("relay stopped on request");
                        break;
                    }
                },
                Some(frame) = self.vapi_rx.recv() => match frame {
                    ServerFrame::Audio(data) => {
                        let command = AgentCommand::SendData { track: self.track, data };
                        if self.agent_tx.send(command).await.is_err() {
                            // The media endpoint must outlive the call;
                            // losing it mid-call is a defect, not a state.
                            error!("agent endpoint gone while forwarding playback audio");
                            self.teardown_on_close();
                            break;
                        }
                    }
                    ServerFrame::Control(text) => self.handle_control(&text),
                    ServerFrame::Closed => {
                        info!("voice transport closed");
                        self.teardown_on_close();
                        break;
                    }
                },
                Some(event) = self.agent_rx.recv() => match event {
                    AgentEvent::TrackData { data, .. } => {
                        // Dropped on the floor once the voice socket is
                        // gone; the call is winding down at that point.
                        let _ = self.vapi_tx.send(ClientFrame::Audio(data)).await;
                    }
                    AgentEvent::Closed => warn!("agent endpoint closed mid-call"),
                },
                else => break,
            }
        }
        let _ = self.agent_tx.send(AgentCommand::Disconnect).await;
    }

    /// Transport-initiated close: whichever racing teardown path wins
    /// the registry removal broadcasts the terminal event.
    fn teardown_on_close(&self) {
        if self.registry.remove(&self.room_id).is_some() {
            let _ = self.events.send(SessionEvent::call_end());
        }
    }

    fn handle_control(&self, text: &str) {
        let envelope = match serde_json::from_str::<ControlEnvelope>(text) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!(error = %err, "discarding malformed control frame");
                return;
            }
        };
        let Some(kind) = EventKind::from_control_type(&envelope.kind) else {
            debug!(kind = %envelope.kind, "ignoring unrecognized control frame");
            return;
        };
        if kind == EventKind::StatusUpdate && envelope.status.as_deref() == Some("ended") {
            // Advisory only: the socket close drives actual teardown.
            info!("voice agent reported call ended");
        }
        let payload = serde_json::from_str(text).unwrap_or_default();
        debug!(kind = kind.as_str(), "control frame");
        let _ = self.events.send(SessionEvent { kind, payload });
    }
}
