//! Binary framing for the agent media socket.
//!
//! Every binary frame is the 16-byte track UUID followed by the raw PCM
//! payload. The header attributes the payload to a track in both
//! directions; the payload itself is forwarded untouched.

use crate::{FishjamError, agent::TrackId};
use bytes::{BufMut, Bytes, BytesMut};
use uuid::Uuid;

pub(crate) const HEADER_LEN: usize = 16;

pub(crate) fn encode(track: TrackId, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_slice(track.as_uuid().as_bytes());
    buf.put_slice(payload);
    buf.freeze()
}

pub(crate) fn decode(frame: Bytes) -> Result<(TrackId, Bytes), FishjamError> {
    if frame.len() < HEADER_LEN {
        return Err(FishjamError::Frame(format!(
            "frame too short: {} bytes",
            frame.len()
        )));
    }
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(&frame[..HEADER_LEN]);
    let track = TrackId::from_uuid(Uuid::from_bytes(header));
    Ok((track, frame.slice(HEADER_LEN..)))
}
