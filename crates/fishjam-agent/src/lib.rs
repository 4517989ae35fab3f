//! Server-side client for the Fishjam media-room service.
//!
//! Covers the two surfaces the bridge needs: the management REST API
//! (rooms, peer tokens) and the agent media socket, through which a
//! server-side participant publishes and receives raw PCM audio tracks.

pub mod agent;
mod client;
mod error;
mod frame;

pub use agent::{AgentCommand, AgentEvent, AgentOptions, FishjamAgent, TrackId, TrackParams};
pub use client::{FishjamClient, Peer, Room};
pub use error::FishjamError;
