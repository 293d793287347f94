//! Basic type definitions for the chat relay
//!
//! Provides newtype wrappers for the two identifier spaces:
//! - `ConnectionId`: UUID-based unique connection identifier
//! - `MessageId`: monotonically increasing message identifier

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique connection identifier (newtype pattern)
///
/// Wraps a UUID v4 assigned when the transport session is accepted.
/// Implements Hash and Eq for use as HashMap keys; serializes as the
/// UUID string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message identifier (newtype pattern)
///
/// Allocated from a monotonic counter owned by the message log, never
/// reused. Id order is the total order of the history, so the id doubles
/// as the sort key for pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room joined when a client does not name one
pub const DEFAULT_ROOM: &str = "General";
