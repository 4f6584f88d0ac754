//! Inbound and outbound WebSocket event definitions.
//!
//! Frames are JSON objects of the form `{"event": "...", "data": {...}}`.
//! Event names and payload field casing match what the browser client
//! emits and listens for, so they are wire contract and must not change.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use banter_entity::message::MessageRecord;
use banter_entity::reaction::ReactionRecord;

/// Events sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InboundEvent {
    /// Post a message to a channel.
    #[serde(rename = "message:send", rename_all = "camelCase")]
    MessageSend {
        /// Target channel.
        channel_id: Uuid,
        /// Raw message body.
        content: String,
    },
    /// Typing indicator toggle.
    #[serde(rename = "user:typing", rename_all = "camelCase")]
    Typing {
        /// Channel the user is typing in.
        channel_id: Uuid,
        /// Whether typing started or stopped.
        is_typing: bool,
    },
    /// Add or remove an emoji reaction on a message.
    #[serde(rename = "message:reaction", rename_all = "camelCase")]
    Reaction {
        /// Target message.
        message_id: Uuid,
        /// Emoji literal (e.g. "👍").
        emoji: String,
        /// Whether to add or remove the reaction.
        #[serde(rename = "type")]
        kind: ReactionKind,
    },
}

/// Direction of a reaction event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Add,
    Remove,
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundEvent {
    /// A message was posted to a channel the client is in.
    #[serde(rename = "message:received")]
    MessageReceived(MessageRecord),
    /// Another member of the channel is typing.
    #[serde(rename = "user:typing", rename_all = "camelCase")]
    Typing {
        user_id: Uuid,
        channel_id: Uuid,
        is_typing: bool,
    },
    /// A reaction was added to a message.
    #[serde(rename = "message:reaction:added", rename_all = "camelCase")]
    ReactionAdded {
        message_id: Uuid,
        reaction: ReactionRecord,
    },
    /// A reaction was removed from a message.
    #[serde(rename = "message:reaction:removed", rename_all = "camelCase")]
    ReactionRemoved {
        message_id: Uuid,
        reaction_id: Uuid,
    },
    /// A user came online (first connection opened).
    #[serde(rename = "user:online", rename_all = "camelCase")]
    UserOnline { user_id: Uuid },
    /// A user went offline (last connection closed).
    #[serde(rename = "user:offline", rename_all = "camelCase")]
    UserOffline { user_id: Uuid },
    /// The client's user was @-mentioned in a message.
    #[serde(rename = "user:mentioned", rename_all = "camelCase")]
    Mentioned {
        message_id: Uuid,
        channel_id: Uuid,
        mentioned_by: String,
    },
    /// Server keepalive.
    #[serde(rename = "ping")]
    Ping { timestamp: i64 },
    /// Processing failure reported back to the sender only.
    #[serde(rename = "error")]
    Error { message: String },
}

impl OutboundEvent {
    /// Serializes the event to a wire frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
