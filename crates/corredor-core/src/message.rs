use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "whatsapp").
    pub channel: String,
    /// Platform-specific sender ID (phone number without the JID suffix).
    pub sender_id: String,
    /// Human-readable sender name (WhatsApp push name).
    pub sender_name: Option<String>,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// If this message quotes a previous one, its text and provenance.
    #[serde(default)]
    pub quoted: Option<QuotedMessage>,
    /// Platform-specific target for routing the response (e.g. chat JID).
    #[serde(default)]
    pub reply_target: Option<String>,
    /// Whether this message comes from a group chat.
    #[serde(default)]
    pub is_group: bool,
}

/// The message an incoming message is replying to.
///
/// The router only needs the quoted text (to recognize its own follow-up
/// messages by marker phrase) and whether we were the author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotedMessage {
    pub text: String,
    /// True if the quoted message was sent by this bot.
    pub from_me: bool,
}

/// An outgoing message to send back through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    /// Platform-specific target for routing (e.g. chat JID).
    #[serde(default)]
    pub reply_target: Option<String>,
}

impl OutgoingMessage {
    /// Build a reply to an incoming message.
    pub fn reply_to(incoming: &IncomingMessage, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply_target: incoming.reply_target.clone(),
        }
    }
}
