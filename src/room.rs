//! Room directory
//!
//! Rooms are not stored entities: a room exists exactly as long as some
//! registered connection names it. The directory is a read-only view over
//! the connection registry that derives a room's member set at query time,
//! so every answer is a consistent snapshot.

use serde::Serialize;

use crate::registry::ConnectionRegistry;
use crate::types::ConnectionId;

/// A room member entry as sent in `user_list` events
#[derive(Debug, Clone, Serialize)]
pub struct RoomMember {
    pub connection_id: ConnectionId,
    pub username: String,
}

/// Derives room membership from the connection registry
pub struct RoomDirectory<'a> {
    registry: &'a ConnectionRegistry,
}

impl<'a> RoomDirectory<'a> {
    pub fn new(registry: &'a ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Connection ids currently in `room`, in join order
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.registry.list_by_room(room)
    }

    /// Member roster for `room` as sent to clients
    pub fn roster(&self, room: &str) -> Vec<RoomMember> {
        self.registry
            .list_by_room(room)
            .into_iter()
            .filter_map(|id| {
                self.registry.lookup(id).map(|identity| RoomMember {
                    connection_id: id,
                    username: identity.username.clone(),
                })
            })
            .collect()
    }
}
