//! Message log
//!
//! Bounded, append-only, id-ordered store of broadcast messages, holding
//! each message's mutable side-state (reactions, read markers). Private
//! messages never enter the log. The log also owns the monotonic id
//! allocator, so ids are unique and strictly increasing regardless of
//! clock resolution.

use std::collections::VecDeque;

use crate::message::{ChatMessage, Reaction};
use crate::types::MessageId;

/// Maximum number of retained messages; the oldest entry is evicted first
pub const LOG_CAPACITY: usize = 100;

/// Bounded in-memory store of broadcast messages
#[derive(Debug)]
pub struct MessageLog {
    entries: VecDeque<ChatMessage>,
    next_id: u64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(LOG_CAPACITY),
            next_id: 1,
        }
    }

    /// Allocate the next message id
    pub fn next_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a message, evicting the single oldest entry past capacity
    ///
    /// Entries are appended in id order, so eviction is FIFO by creation.
    pub fn append(&mut self, message: ChatMessage) {
        self.entries.push_back(message);
        if self.entries.len() > LOG_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Find a retained message by id
    ///
    /// Linear scan; fine at this capacity.
    pub fn find(&self, id: MessageId) -> Option<&ChatMessage> {
        self.entries.iter().find(|m| m.id == id)
    }

    fn find_mut(&mut self, id: MessageId) -> Option<&mut ChatMessage> {
        self.entries.iter_mut().find(|m| m.id == id)
    }

    /// All retained messages for `room`, oldest first
    pub fn filter_by_room(&self, room: &str) -> Vec<&ChatMessage> {
        self.entries
            .iter()
            .filter(|m| m.room.as_deref() == Some(room))
            .collect()
    }

    /// A page of room history
    ///
    /// Selects newest-first, skips `skip` entries, takes `limit`, then
    /// reverses back to chronological order for delivery.
    pub fn page(&self, room: &str, skip: usize, limit: usize) -> Vec<ChatMessage> {
        let mut newest_first = self.filter_by_room(room);
        newest_first.sort_by(|a, b| b.id.cmp(&a.id));

        let mut page: Vec<ChatMessage> = newest_first
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect();
        page.reverse();
        page
    }

    /// Append a reaction to a message; no-op when the id is unknown
    ///
    /// Duplicate (emoji, username) pairs are kept as separate entries.
    /// Returns the message's room when the reaction was applied.
    pub fn add_reaction(
        &mut self,
        id: MessageId,
        emoji: String,
        username: String,
    ) -> Option<String> {
        let message = self.find_mut(id)?;
        message.reactions.push(Reaction { emoji, username });
        message.room.clone()
    }

    /// Mark a message read by `user_id`; no-op when the id is unknown
    ///
    /// Idempotent: returns the message's room only when the marker was
    /// newly added, so repeat marks emit no event.
    pub fn mark_read(&mut self, id: MessageId, user_id: &str) -> Option<String> {
        let message = self.find_mut(id)?;
        if message.read_by.iter().any(|u| u == user_id) {
            return None;
        }
        message.read_by.push(user_id.to_string());
        message.room.clone()
    }

    /// Number of retained messages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}
