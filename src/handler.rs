//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake,
//! message parsing, and bidirectional communication with the ChatServer.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};
use crate::server::ServerCommand;
use crate::types::ConnectionId;

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, registers the connection with the
/// ChatServer, and pumps frames in both directions until either side
/// closes. A Disconnect command is always sent on the way out, so the
/// actor's cleanup runs no matter how the connection ends.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Assign the opaque per-connection identifier
    let connection_id = ConnectionId::new();
    info!("Connection {} accepted from {}", connection_id, peer_addr);

    // Create channel for server -> client events
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(32);

    // Register with ChatServer; the actor answers with a `connected` event
    if cmd_tx
        .send(ServerCommand::Connect {
            connection_id,
            sender: msg_tx,
        })
        .await
        .is_err()
    {
        error!(
            "Failed to register connection {} - server closed",
            connection_id
        );
        return Err(AppError::ChannelSend);
    }

    // Clone cmd_tx for read task
    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> ServerCommand)
    let read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => {
                            let cmd = client_message_to_command(connection_id, client_msg);
                            if cmd_tx_read.send(cmd).await.is_err() {
                                debug!("Server closed, ending read task for {}", connection_id);
                                break;
                            }
                        }
                        Err(e) => {
                            // Invalid frames are dropped; the protocol has
                            // no outbound error event.
                            warn!("Invalid JSON from {}: {}", connection_id, e);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Connection {} sent close frame", connection_id);
                    break;
                }
                Ok(Message::Ping(data)) => {
                    debug!("Ping from {}", connection_id);
                    // Pong is handled automatically by tungstenite
                    let _ = data;
                }
                Ok(Message::Pong(_)) => {
                    debug!("Pong from {}", connection_id);
                }
                Ok(_) => {
                    // Binary or other message types - ignore
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", connection_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", connection_id);
    });

    // Spawn write task (ServerMessage -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize event: {}", e);
                    // Continue - don't break on serialization errors
                }
            }
        }
        debug!("Write task ended for connection");

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete
    tokio::select! {
        _ = read_task => {
            debug!("Read task completed for {}", connection_id);
        }
        _ = write_task => {
            debug!("Write task completed for {}", connection_id);
        }
    }

    // Send disconnect command - the actor treats this as the guaranteed
    // cleanup trigger even if commands from this connection are still queued
    let _ = cmd_tx.send(ServerCommand::Disconnect { connection_id }).await;

    info!("Connection {} closed", connection_id);

    Ok(())
}

/// Convert a ClientMessage to a ServerCommand
fn client_message_to_command(connection_id: ConnectionId, msg: ClientMessage) -> ServerCommand {
    match msg {
        ClientMessage::Join { username, room } => ServerCommand::Join {
            connection_id,
            username,
            room,
        },
        ClientMessage::Send { body } => ServerCommand::Send {
            connection_id,
            body,
        },
        ClientMessage::PrivateSend { to, body } => ServerCommand::PrivateSend {
            connection_id,
            to,
            body,
        },
        ClientMessage::GetHistory { room, skip, limit } => ServerCommand::GetHistory {
            connection_id,
            room,
            skip,
            limit,
        },
        ClientMessage::React {
            message_id,
            emoji,
            username,
        } => ServerCommand::React {
            connection_id,
            message_id,
            emoji,
            username,
        },
        ClientMessage::Read {
            message_id,
            user_id,
        } => ServerCommand::Read {
            connection_id,
            message_id,
            user_id,
        },
        ClientMessage::Typing { is_typing } => ServerCommand::Typing {
            connection_id,
            is_typing,
        },
    }
}
