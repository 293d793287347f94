//! Typing tracker
//!
//! Per-connection typing flags, surfaced per room as a username list.
//! An entry exists only while the connection is composing; stopping and
//! disconnecting both remove the entry rather than setting it false.

use std::collections::HashMap;

use crate::registry::ConnectionRegistry;
use crate::types::ConnectionId;

/// Tracks which connections are currently composing
#[derive(Debug, Default)]
pub struct TypingTracker {
    typing: HashMap<ConnectionId, String>,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the typing flag for a connection
    pub fn set_typing(&mut self, id: ConnectionId, username: &str, is_typing: bool) {
        if is_typing {
            self.typing.insert(id, username.to_string());
        } else {
            self.typing.remove(&id);
        }
    }

    /// Drop any flag for a connection; used on disconnect
    pub fn clear(&mut self, id: ConnectionId) {
        self.typing.remove(&id);
    }

    /// Usernames currently typing in `room`, in the room's join order
    ///
    /// Cross-references the registry so the list only ever names current
    /// members of the room.
    pub fn active_usernames(&self, room: &str, registry: &ConnectionRegistry) -> Vec<String> {
        registry
            .list_by_room(room)
            .into_iter()
            .filter_map(|id| self.typing.get(&id).cloned())
            .collect()
    }
}
