//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization.
//!
//! There is no outbound error event: frames that fail to parse are logged
//! and dropped, and commands referencing unknown entities are no-ops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::room::RoomMember;
use crate::types::{ConnectionId, MessageId};

fn default_history_limit() -> usize {
    10
}

/// Client → Server message
///
/// All messages from client to server. Uses tagged enum with snake_case naming.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a room, or rebind to a different one
    Join {
        username: String,
        /// Defaults to the well-known room when absent
        #[serde(default)]
        room: Option<String>,
    },
    /// Broadcast a message to the current room
    Send { body: String },
    /// Send a private message to a single connection
    PrivateSend { to: ConnectionId, body: String },
    /// Request a page of room history
    GetHistory {
        room: String,
        #[serde(default)]
        skip: usize,
        #[serde(default = "default_history_limit")]
        limit: usize,
    },
    /// React to a logged message
    React {
        message_id: MessageId,
        emoji: String,
        username: String,
    },
    /// Mark a logged message as read
    Read {
        message_id: MessageId,
        user_id: String,
    },
    /// Update the typing flag
    Typing { is_typing: bool },
}

/// Server → Client message
///
/// All messages from server to client. Uses tagged enum with snake_case naming.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection accepted, connection ID issued
    Connected { connection_id: ConnectionId },
    /// Full member list of a room
    UserList { users: Vec<RoomMember> },
    /// A user joined the room
    UserJoined {
        username: String,
        connection_id: ConnectionId,
    },
    /// A user left the room
    UserLeft {
        username: String,
        connection_id: ConnectionId,
    },
    /// Broadcast chat message
    Message { message: ChatMessage },
    /// Private message, delivered to sender and recipient only
    PrivateMessage { message: ChatMessage },
    /// Page of room history, oldest first
    HistoryPage { messages: Vec<ChatMessage> },
    /// A reaction was added to a message
    ReactionAdded {
        message_id: MessageId,
        emoji: String,
        username: String,
    },
    /// A message was marked read
    MessageRead {
        message_id: MessageId,
        user_id: String,
    },
    /// Usernames currently typing in the room
    TypingUsers { usernames: Vec<String> },
}

/// A chat message as carried on the wire and retained in the log
///
/// Broadcast messages always carry a room; private messages carry the
/// recipient instead and are never retained.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    /// Sender username at the time of sending
    pub sender: String,
    pub sender_id: ConnectionId,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    pub private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<ConnectionId>,
    /// Ordered reaction entries; duplicates by the same user are kept
    pub reactions: Vec<Reaction>,
    /// Identifiers that have acknowledged viewing this message
    pub read_by: Vec<String>,
}

/// A single reaction entry
#[derive(Debug, Clone, Serialize)]
pub struct Reaction {
    pub emoji: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_deserialize() {
        let json = r#"{"type": "join", "username": "Alice", "room": "rust"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Join { username, room } => {
                assert_eq!(username, "Alice");
                assert_eq!(room.as_deref(), Some("rust"));
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_join_room_defaults_to_none() {
        let json = r#"{"type": "join", "username": "Alice"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Join { room, .. } => assert!(room.is_none()),
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_get_history_defaults() {
        let json = r#"{"type": "get_history", "room": "General"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::GetHistory { room, skip, limit } => {
                assert_eq!(room, "General");
                assert_eq!(skip, 0);
                assert_eq!(limit, 10);
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_server_message_serialize() {
        let msg = ServerMessage::Connected {
            connection_id: ConnectionId::new(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"connection_id\""));
    }

    #[test]
    fn test_private_message_omits_room() {
        let msg = ChatMessage {
            id: MessageId(1),
            sender: "Alice".to_string(),
            sender_id: ConnectionId::new(),
            body: "psst".to_string(),
            timestamp: Utc::now(),
            room: None,
            private: true,
            to: Some(ConnectionId::new()),
            reactions: Vec::new(),
            read_by: Vec::new(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("\"room\""));
        assert!(json.contains("\"private\":true"));
        assert!(json.contains("\"to\""));
    }
}
