//! Session events fanned out to subscribed observers.
//!
//! Events are ephemeral: they exist only on the per-session broadcast
//! channel, so an observer that subscribes late sees nothing from before
//! its subscription and a disconnected observer just loses its receiver.

use serde_json::Value;
use tokio::sync::broadcast;

/// How many events a slow observer may fall behind before its receiver
/// starts reporting lag.
const EVENT_BUFFER: usize = 64;

/// Kinds of events a live call emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Transcript,
    SpeechUpdate,
    StatusUpdate,
    CallEnd,
}

impl EventKind {
    /// Maps the `type` discriminator of an inbound control frame; `None`
    /// for kinds the bridge does not forward.
    pub fn from_control_type(kind: &str) -> Option<Self> {
        match kind {
            "transcript" => Some(Self::Transcript),
            "speech-update" => Some(Self::SpeechUpdate),
            "status-update" => Some(Self::StatusUpdate),
            _ => None,
        }
    }

    /// Wire name, used both by the voice agent and as the SSE event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transcript => "transcript",
            Self::SpeechUpdate => "speech-update",
            Self::StatusUpdate => "status-update",
            Self::CallEnd => "call-end",
        }
    }
}

/// A single event produced from voice-agent control traffic, carrying
/// the full control payload.
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub kind: EventKind,
    pub payload: Value,
}

impl SessionEvent {
    /// The terminal event broadcast when the voice transport closes.
    pub fn call_end() -> Self {
        Self {
            kind: EventKind::CallEnd,
            payload: Value::Object(Default::default()),
        }
    }
}

pub type EventSender = broadcast::Sender<SessionEvent>;

/// A fresh per-session event channel with no subscribers yet.
pub fn channel() -> EventSender {
    broadcast::channel(EVENT_BUFFER).0
}
