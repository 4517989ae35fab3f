//! Start/stop orchestration for call sessions.
//!
//! `start_call` provisions both endpoints in sequence and only registers
//! the session once the whole chain has succeeded; the first failing
//! step aborts the attempt and releases what was already created.

use super::{
    events,
    registry::SessionHandle,
    session::CallSession,
};
use crate::{models::StartCallResponse, state::AppState};
use anyhow::{Context, Result};
use fishjam_agent::{AgentOptions, TrackParams};
use tokio::sync::mpsc;
use tracing::info;

const COMMAND_BUFFER: usize = 8;

/// Provision a media room, a browser credential, an agent endpoint and a
/// voice-agent call, wire the relay between them, and register the
/// session under the provider-assigned room id.
pub async fn start_call(state: &AppState) -> Result<StartCallResponse> {
    let room = state
        .fishjam
        .create_room()
        .await
        .context("failed to create media room")?;
    let peer = state
        .fishjam
        .create_peer(&room.id)
        .await
        .context("failed to create peer credential")?;

    let (agent, agent_rx) = state
        .fishjam
        .create_agent(&room.id, AgentOptions::default())
        .await
        .context("failed to create media agent")?;

    // From here on the agent endpoint must be released if any later
    // provisioning step fails.
    let provisioned = async {
        let track = agent
            .create_track(TrackParams::default())
            .await
            .context("failed to create publish track")?;
        let call = state
            .vapi
            .create_call()
            .await
            .context("failed to create voice-agent call")?;
        let (vapi_tx, vapi_rx) = vapi_realtime::connect(&call.transport.websocket_call_url)
            .await
            .context("failed to open voice-agent socket")?;
        Ok::<_, anyhow::Error>((track, call, vapi_tx, vapi_rx))
    }
    .await;

    let (track, call, vapi_tx, vapi_rx) = match provisioned {
        Ok(parts) => parts,
        Err(err) => {
            agent.disconnect().await;
            return Err(err);
        }
    };

    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
    let events = events::channel();
    let handle = SessionHandle::new(
        room.id.clone(),
        call.id.clone(),
        events.clone(),
        commands_tx,
    );

    if let Err(err) = state.registry.register(handle) {
        // Provider-assigned ids should never collide; defended anyway.
        agent.disconnect().await;
        let _ = vapi_tx.send(vapi_realtime::ClientFrame::Close).await;
        return Err(err.into());
    }

    CallSession {
        room_id: room.id.clone(),
        track,
        agent_tx: agent.into_sender(),
        agent_rx,
        vapi_tx,
        vapi_rx,
        events,
        commands: commands_rx,
        registry: state.registry.clone(),
    }
    .spawn();

    info!(room_id = %room.id, vapi_call_id = %call.id, "call started");

    Ok(StartCallResponse {
        room_id: room.id,
        peer_token: peer.peer_token,
        vapi_call_id: call.id,
    })
}

/// Stop a call. Returns `false` when the room id is unknown, already
/// stopped or never started; the registry removal is the idempotency
/// gate, so concurrent stops tear the session down at most once.
pub async fn stop_call(state: &AppState, room_id: &str) -> bool {
    let Some(handle) = state.registry.remove(room_id) else {
        return false;
    };
    handle.stop().await;
    info!(%room_id, vapi_call_id = %handle.vapi_call_id, "call stopped");
    true
}
