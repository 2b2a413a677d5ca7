//! Wire protocol for the real-time escrow synchronization channel.
//!
//! Every frame is a JSON text message with an adjacently tagged envelope:
//! `{"event": "<name>", "data": <payload>}`. Event names and payload
//! fields are camelCase to match the backend contract.
//!
//! Inbound frames are parsed into [`ServerEvent`] at the boundary so that
//! downstream handlers pattern-match on a closed set of variants instead
//! of trusting payload shape. Frames whose event name is unknown fail to
//! parse and are dropped by the session loop.

use serde::{Deserialize, Serialize};

/// Events the client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Subscribe to an escrow room
    JoinEscrowRoom(EscrowRoomJoin),
    /// Subscribe to a dispute room
    JoinDisputeRoom(DisputeRoomJoin),
    /// Subscribe to a chat conversation (payload is the conversation id)
    JoinConversation(String),
    /// Send a chat message to a conversation
    SendMessage(OutboundMessage),
}

/// Events the server pushes to the client.
///
/// `connect`, `connect_error` and `disconnect` are transport-level
/// conditions reported by the WebSocket layer itself, not wire frames, so
/// they have no variant here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Acknowledgment that an escrow room join succeeded
    JoinedEscrowRoom(serde_json::Value),
    /// The supplied token was rejected
    Unauthorized(UnauthorizedPayload),
    /// Hint that client-cached data may be stale
    Reload(ReloadPayload),
    /// A chat message for a joined conversation
    ReceiveMessage(ChatMessage),
}

/// Payload for `joinEscrowRoom`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowRoomJoin {
    /// Contract address of the escrow
    pub escrow_contract_address: String,
    /// Auth token from persisted client storage
    pub token: String,
}

/// Payload for `joinDisputeRoom`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeRoomJoin {
    /// Contract address of the disputed escrow
    pub dispute_contract_address: String,
    /// Auth token from persisted client storage
    pub token: String,
}

/// Payload for `unauthorized`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnauthorizedPayload {
    /// Human-readable rejection reason from the server
    pub error: String,
}

/// Payload for `reload`.
///
/// Only `action` is interpreted; the server may attach further fields and
/// they are ignored (forward-compatible no-op for unrecognized shapes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReloadPayload {
    /// What changed server-side, e.g. `decision_initiated`
    pub action: String,
}

/// A chat message as delivered by the server via `receiveMessage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Server-assigned message id
    #[serde(default)]
    pub id: Option<String>,
    /// Conversation this message belongs to
    pub conversation_id: String,
    /// Sender's user id
    pub sender_id: String,
    /// Text body; null for media-only messages
    pub message: Option<String>,
    /// Media attachment; null for text-only messages
    pub media: Option<MediaAttachment>,
    /// Unix timestamp in milliseconds (UTC)
    #[serde(default)]
    pub created_at: i64,
}

/// Outbound message envelope for `sendMessage`.
///
/// Exactly one of `message`/`media` carries the payload in normal use.
/// This is a caller convention, not enforced by the type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Target conversation
    pub conversation_id: String,
    /// Text body, if any
    pub message: Option<String>,
    /// Sender's user id
    pub sender_id: String,
    /// Media attachment, if any
    pub media: Option<MediaAttachment>,
}

/// An uploaded media file referenced by a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    /// Public URL of the uploaded file
    pub url: String,
    /// MIME-ish type tag, e.g. `image/png`
    pub r#type: String,
    /// Original filename as uploaded
    pub original_name: String,
}
