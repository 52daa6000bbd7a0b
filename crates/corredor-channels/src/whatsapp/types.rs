//! Wire types for the bridge's HTTP API.

use serde::{Deserialize, Serialize};

/// Envelope for bridge responses.
#[derive(Debug, Deserialize)]
pub(super) struct BridgeResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub body: Option<T>,
}

/// Body of a poll response.
#[derive(Debug, Deserialize)]
pub(super) struct PollBody {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
    /// Sequence number to resume from on the next poll.
    pub cursor: Option<u64>,
}

/// One inbound message as delivered by the bridge.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct WireMessage {
    pub id: String,
    /// Chat JID (phone@s.whatsapp.net or group id@g.us).
    pub chat_id: String,
    /// Sender phone number, without the JID suffix.
    pub sender: String,
    #[serde(default)]
    pub push_name: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub quoted: Option<WireQuoted>,
}

/// The quoted message inside a reply.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct WireQuoted {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub from_me: bool,
}

/// Outbound send request.
#[derive(Debug, Serialize)]
pub(super) struct SendRequest<'a> {
    pub to: &'a str,
    pub text: &'a str,
}
