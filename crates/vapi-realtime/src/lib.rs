//! Client for the Vapi conversational-voice-agent service.
//!
//! Two halves: call creation over REST (declaring the raw PCM websocket
//! transport) and the duplex call socket carrying binary audio frames in
//! both directions plus JSON control frames from the agent.

mod client;
mod error;
mod socket;
mod types;

pub use client::{CallTransport, SAMPLE_RATE, VapiCall, VapiClient};
pub use error::VapiError;
pub use socket::{ClientFrame, ServerFrame, connect};
pub use types::ControlEnvelope;
