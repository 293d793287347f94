//! Connection registry
//!
//! Maps an active connection to its identity: the self-asserted username
//! and the room it currently occupies. Room membership is never stored
//! anywhere else; it is always derived from this mapping.

use std::collections::HashMap;

use crate::types::ConnectionId;

/// Identity bound to a registered connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub room: String,
}

/// Registry of joined connections
///
/// First-registration order is preserved so derived member lists are
/// stable across events. A rebind keeps the original position.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    bindings: HashMap<ConnectionId, Identity>,
    order: Vec<ConnectionId>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a connection to (username, room), overwriting any prior binding
    ///
    /// Usernames are not checked for uniqueness.
    pub fn register(&mut self, id: ConnectionId, username: String, room: String) {
        if self
            .bindings
            .insert(id, Identity { username, room })
            .is_none()
        {
            self.order.push(id);
        }
    }

    /// Remove a binding; no-op when the connection was never registered
    pub fn unregister(&mut self, id: ConnectionId) {
        if self.bindings.remove(&id).is_some() {
            self.order.retain(|c| *c != id);
        }
    }

    /// Identity bound to a connection, if it has joined
    pub fn lookup(&self, id: ConnectionId) -> Option<&Identity> {
        self.bindings.get(&id)
    }

    /// Connections currently in `room`, in the order they first joined
    pub fn list_by_room(&self, room: &str) -> Vec<ConnectionId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.bindings.get(id).is_some_and(|b| b.room == room))
            .collect()
    }

    /// Number of joined connections
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::new();

        assert!(registry.lookup(id).is_none());

        registry.register(id, "Alice".to_string(), "General".to_string());

        let identity = registry.lookup(id).unwrap();
        assert_eq!(identity.username, "Alice");
        assert_eq!(identity.room, "General");
    }

    #[test]
    fn test_register_overwrites_prior_binding() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::new();

        registry.register(id, "Alice".to_string(), "General".to_string());
        registry.register(id, "Alice".to_string(), "rust".to_string());

        assert_eq!(registry.lookup(id).unwrap().room, "rust");
        assert_eq!(registry.len(), 1);
        assert!(registry.list_by_room("General").is_empty());
        assert_eq!(registry.list_by_room("rust"), vec![id]);
    }

    #[test]
    fn test_unregister_is_silent_when_absent() {
        let mut registry = ConnectionRegistry::new();
        registry.unregister(ConnectionId::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_by_room_preserves_insertion_order() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let c = ConnectionId::new();

        registry.register(a, "Alice".to_string(), "General".to_string());
        registry.register(b, "Bob".to_string(), "rust".to_string());
        registry.register(c, "Carol".to_string(), "General".to_string());

        assert_eq!(registry.list_by_room("General"), vec![a, c]);
        assert_eq!(registry.list_by_room("rust"), vec![b]);
        assert!(registry.list_by_room("empty").is_empty());
    }

    #[test]
    fn test_membership_follows_most_recent_join() {
        // After any sequence of joins, a room's members are exactly the
        // connections whose latest join named that room.
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        registry.register(a, "Alice".to_string(), "one".to_string());
        registry.register(b, "Bob".to_string(), "one".to_string());
        registry.register(a, "Alice".to_string(), "two".to_string());
        registry.register(b, "Bob".to_string(), "one".to_string());

        assert_eq!(registry.list_by_room("one"), vec![b]);
        assert_eq!(registry.list_by_room("two"), vec![a]);
    }

    #[test]
    fn test_unregister_removes_from_room() {
        let mut registry = ConnectionRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        registry.register(a, "Alice".to_string(), "General".to_string());
        registry.register(b, "Bob".to_string(), "General".to_string());
        registry.unregister(a);

        assert_eq!(registry.list_by_room("General"), vec![b]);
        assert!(registry.lookup(a).is_none());
    }
}
