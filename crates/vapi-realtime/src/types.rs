//! Inbound control frame types.

use serde::Deserialize;

/// The discriminator portion of an inbound control frame.
///
/// Control frames carry many provider-specific fields; only the pieces a
/// bridge inspects are modeled here. Consumers forward the full JSON
/// object untouched and use this envelope purely for routing.
#[derive(Debug, Deserialize)]
pub struct ControlEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: Option<String>,
}
