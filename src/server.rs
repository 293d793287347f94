//! ChatServer Actor implementation
//!
//! The central actor that owns all mutable state: the connection registry,
//! the message log and the typing tracker. Uses the Actor pattern with mpsc
//! channels for message passing: one command runs to completion before the
//! next starts, so every read-modify-write on the stores is serialized and
//! fan-out always works from a consistent membership snapshot.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::history::MessageLog;
use crate::message::{ChatMessage, ServerMessage};
use crate::registry::ConnectionRegistry;
use crate::room::RoomDirectory;
use crate::typing::TypingTracker;
use crate::types::{ConnectionId, MessageId, DEFAULT_ROOM};

/// Commands sent from connection handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New transport session accepted
    Connect {
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Transport session ended
    Disconnect {
        connection_id: ConnectionId,
    },
    /// Join a room, or rebind to a different one
    Join {
        connection_id: ConnectionId,
        username: String,
        room: Option<String>,
    },
    /// Broadcast a message to the sender's room
    Send {
        connection_id: ConnectionId,
        body: String,
    },
    /// Send a private message to a single connection
    PrivateSend {
        connection_id: ConnectionId,
        to: ConnectionId,
        body: String,
    },
    /// Request a page of room history
    GetHistory {
        connection_id: ConnectionId,
        room: String,
        skip: usize,
        limit: usize,
    },
    /// React to a logged message
    React {
        connection_id: ConnectionId,
        message_id: MessageId,
        emoji: String,
        username: String,
    },
    /// Mark a logged message as read
    Read {
        connection_id: ConnectionId,
        message_id: MessageId,
        user_id: String,
    },
    /// Update the typing flag
    Typing {
        connection_id: ConnectionId,
        is_typing: bool,
    },
}

/// The main ChatServer actor
///
/// A connection moves through Unjoined → Joined → Disconnected: `peers`
/// holds every open transport, the registry only the joined ones. Commands
/// that need room context fail closed (silent no-op) when the sender has
/// never joined or has already disconnected.
pub struct ChatServer {
    /// Outbound channel per open transport: ConnectionId -> sender
    peers: HashMap<ConnectionId, mpsc::Sender<ServerMessage>>,
    /// Identity bindings for joined connections
    registry: ConnectionRegistry,
    /// Retained broadcast messages and their side-state
    log: MessageLog,
    /// Active typing flags
    typing: TypingTracker,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            peers: HashMap::new(),
            registry: ConnectionRegistry::new(),
            log: MessageLog::new(),
            typing: TypingTracker::new(),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd).await;
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    async fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                connection_id,
                sender,
            } => {
                self.handle_connect(connection_id, sender).await;
            }
            ServerCommand::Disconnect { connection_id } => {
                self.handle_disconnect(connection_id).await;
            }
            ServerCommand::Join {
                connection_id,
                username,
                room,
            } => {
                self.handle_join(connection_id, username, room).await;
            }
            ServerCommand::Send {
                connection_id,
                body,
            } => {
                self.handle_send(connection_id, body).await;
            }
            ServerCommand::PrivateSend {
                connection_id,
                to,
                body,
            } => {
                self.handle_private_send(connection_id, to, body).await;
            }
            ServerCommand::GetHistory {
                connection_id,
                room,
                skip,
                limit,
            } => {
                self.handle_get_history(connection_id, room, skip, limit).await;
            }
            ServerCommand::React {
                connection_id,
                message_id,
                emoji,
                username,
            } => {
                self.handle_react(connection_id, message_id, emoji, username).await;
            }
            ServerCommand::Read {
                connection_id,
                message_id,
                user_id,
            } => {
                self.handle_read(connection_id, message_id, user_id).await;
            }
            ServerCommand::Typing {
                connection_id,
                is_typing,
            } => {
                self.handle_typing(connection_id, is_typing).await;
            }
        }
    }

    /// Handle a newly accepted transport session
    async fn handle_connect(
        &mut self,
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerMessage>,
    ) {
        info!("Connection {} opened", connection_id);

        let _ = sender.send(ServerMessage::Connected { connection_id }).await;
        self.peers.insert(connection_id, sender);

        debug!(
            "Open connections: {}, joined: {}",
            self.peers.len(),
            self.registry.len()
        );
    }

    /// Handle a transport session ending
    ///
    /// Guaranteed cleanup trigger: clears the typing flag and the registry
    /// binding, then announces the departure to the pre-disconnect room.
    /// Idempotent, so a repeated or raced disconnect is harmless.
    async fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        info!("Connection {} closed", connection_id);

        self.typing.clear(connection_id);
        let binding = self.registry.lookup(connection_id).cloned();
        self.registry.unregister(connection_id);
        self.peers.remove(&connection_id);

        if let Some(identity) = binding {
            self.broadcast(
                &identity.room,
                ServerMessage::UserLeft {
                    username: identity.username.clone(),
                    connection_id,
                },
            )
            .await;

            let users = RoomDirectory::new(&self.registry).roster(&identity.room);
            self.broadcast(&identity.room, ServerMessage::UserList { users })
                .await;
        }

        debug!(
            "Open connections: {}, joined: {}",
            self.peers.len(),
            self.registry.len()
        );
    }

    /// Handle a join, binding the connection to (username, room)
    async fn handle_join(
        &mut self,
        connection_id: ConnectionId,
        username: String,
        room: Option<String>,
    ) {
        if !self.peers.contains_key(&connection_id) {
            debug!("Join from unknown connection {}", connection_id);
            return;
        }

        let room = room.unwrap_or_else(|| DEFAULT_ROOM.to_string());
        self.registry
            .register(connection_id, username.clone(), room.clone());

        info!(
            "Connection {} joined room '{}' as '{}'",
            connection_id, room, username
        );

        let users = RoomDirectory::new(&self.registry).roster(&room);
        self.broadcast(&room, ServerMessage::UserList { users }).await;
        self.broadcast(
            &room,
            ServerMessage::UserJoined {
                username,
                connection_id,
            },
        )
        .await;
    }

    /// Handle a broadcast message
    async fn handle_send(&mut self, connection_id: ConnectionId, body: String) {
        let Some(identity) = self.registry.lookup(connection_id).cloned() else {
            debug!("Send from unjoined connection {}", connection_id);
            return;
        };

        let message = ChatMessage {
            id: self.log.next_id(),
            sender: identity.username,
            sender_id: connection_id,
            body,
            timestamp: Utc::now(),
            room: Some(identity.room.clone()),
            private: false,
            to: None,
            reactions: Vec::new(),
            read_by: vec![connection_id.to_string()],
        };

        self.log.append(message.clone());
        self.broadcast(&identity.room, ServerMessage::Message { message })
            .await;
    }

    /// Handle a private message
    ///
    /// Transient: delivered to the two parties and forgotten, never logged.
    async fn handle_private_send(
        &mut self,
        connection_id: ConnectionId,
        to: ConnectionId,
        body: String,
    ) {
        let Some(identity) = self.registry.lookup(connection_id).cloned() else {
            debug!("Private send from unjoined connection {}", connection_id);
            return;
        };

        let message = ChatMessage {
            id: self.log.next_id(),
            sender: identity.username,
            sender_id: connection_id,
            body,
            timestamp: Utc::now(),
            room: None,
            private: true,
            to: Some(to),
            reactions: Vec::new(),
            read_by: Vec::new(),
        };

        self.unicast(
            to,
            ServerMessage::PrivateMessage {
                message: message.clone(),
            },
        )
        .await;
        self.unicast(connection_id, ServerMessage::PrivateMessage { message })
            .await;
    }

    /// Handle a history request, answered to the requester only
    async fn handle_get_history(
        &mut self,
        connection_id: ConnectionId,
        room: String,
        skip: usize,
        limit: usize,
    ) {
        let messages = self.log.page(&room, skip, limit);
        debug!(
            "History page for {}: room '{}' skip {} limit {} -> {} messages",
            connection_id,
            room,
            skip,
            limit,
            messages.len()
        );
        self.unicast(connection_id, ServerMessage::HistoryPage { messages })
            .await;
    }

    /// Handle a reaction
    ///
    /// Applied even if the reactor has already left; unknown ids are dropped
    /// without an event.
    async fn handle_react(
        &mut self,
        connection_id: ConnectionId,
        message_id: MessageId,
        emoji: String,
        username: String,
    ) {
        let Some(room) = self
            .log
            .add_reaction(message_id, emoji.clone(), username.clone())
        else {
            debug!(
                "Reaction from {} to unknown message {}",
                connection_id, message_id
            );
            return;
        };

        self.broadcast(
            &room,
            ServerMessage::ReactionAdded {
                message_id,
                emoji,
                username,
            },
        )
        .await;
    }

    /// Handle a read marker
    ///
    /// Already-read markers and unknown ids emit nothing.
    async fn handle_read(
        &mut self,
        connection_id: ConnectionId,
        message_id: MessageId,
        user_id: String,
    ) {
        let Some(room) = self.log.mark_read(message_id, &user_id) else {
            debug!(
                "Read from {} suppressed for message {}",
                connection_id, message_id
            );
            return;
        };

        self.broadcast(
            &room,
            ServerMessage::MessageRead {
                message_id,
                user_id,
            },
        )
        .await;
    }

    /// Handle a typing flag update
    async fn handle_typing(&mut self, connection_id: ConnectionId, is_typing: bool) {
        let Some(identity) = self.registry.lookup(connection_id).cloned() else {
            debug!("Typing from unjoined connection {}", connection_id);
            return;
        };

        self.typing
            .set_typing(connection_id, &identity.username, is_typing);

        let usernames = self
            .typing
            .active_usernames(&identity.room, &self.registry);
        self.broadcast(&identity.room, ServerMessage::TypingUsers { usernames })
            .await;
    }

    /// Send an event to every connection currently in `room`
    ///
    /// Membership is snapshotted once per event; a member whose channel has
    /// closed is skipped.
    async fn broadcast(&self, room: &str, msg: ServerMessage) {
        for id in self.registry.list_by_room(room) {
            if let Some(peer) = self.peers.get(&id) {
                let _ = peer.send(msg.clone()).await;
            }
        }
    }

    /// Send an event to a single connection; no-op when it is gone
    async fn unicast(&self, connection_id: ConnectionId, msg: ServerMessage) {
        if let Some(peer) = self.peers.get(&connection_id) {
            let _ = peer.send(msg).await;
        }
    }
}
