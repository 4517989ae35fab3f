//! API Models
//!
//! Request and response bodies for the call control surface, annotated
//! for OpenAPI generation with `utoipa`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body for a successfully started call.
#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StartCallResponse {
    /// Room the browser should join with `peer_token`.
    pub room_id: String,
    pub peer_token: String,
    /// The voice-agent side call identifier.
    pub vapi_call_id: String,
}

#[derive(Deserialize, ToSchema, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StopCallPayload {
    /// Optional so that an empty body yields the documented 400 rather
    /// than a deserialization error.
    pub room_id: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct StopCallResponse {
    pub ok: bool,
}

/// Error body shared by every failing route.
#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_call_response_uses_camel_case_keys() {
        let response = StartCallResponse {
            room_id: "room-1".to_string(),
            peer_token: "token".to_string(),
            vapi_call_id: "call-1".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["roomId"], "room-1");
        assert_eq!(json["peerToken"], "token");
        assert_eq!(json["vapiCallId"], "call-1");
    }

    #[test]
    fn test_stop_call_payload_tolerates_missing_room_id() {
        let payload: StopCallPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.room_id, None);

        let payload: StopCallPayload = serde_json::from_str(r#"{"roomId":"room-1"}"#).unwrap();
        assert_eq!(payload.room_id.as_deref(), Some("room-1"));
    }
}
