//! Room-Based WebSocket Chat Relay Library
//!
//! A room-based chat relay server built with tokio-tungstenite
//! using the Actor pattern for state management.
//!
//! # Features
//! - WebSocket connection handling
//! - Named rooms with derived membership
//! - Room broadcasts and private messages
//! - Bounded in-memory message history with pagination
//! - Reactions and read markers per message
//! - Typing indicators and presence (user list, join/leave events)
//! - Disconnection handling
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning the connection registry,
//!   message log and typing tracker
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing,
//!   so every event is processed against a consistent snapshot
//!
//! All state is process-resident and volatile: history is capped, private
//! messages are never retained, and nothing survives a restart.
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use chat_relay::{ChatServer, handle_connection};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:5000").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(ChatServer::new(cmd_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx));
//!     }
//! }
//! ```

pub mod error;
pub mod handler;
pub mod history;
pub mod message;
pub mod registry;
pub mod room;
pub mod server;
pub mod typing;
pub mod types;

// Re-export main types for convenience
pub use error::AppError;
pub use handler::handle_connection;
pub use history::{MessageLog, LOG_CAPACITY};
pub use message::{ChatMessage, ClientMessage, Reaction, ServerMessage};
pub use registry::{ConnectionRegistry, Identity};
pub use room::{RoomDirectory, RoomMember};
pub use server::{ChatServer, ServerCommand};
pub use typing::TypingTracker;
pub use types::{ConnectionId, MessageId, DEFAULT_ROOM};
