//! Tally relay server.
//!
//! Production runtime wrapping the action-based [`ServerDriver`] with real
//! I/O: a tokio TCP accept loop, one WebSocket per client via
//! `tokio-tungstenite`, and JSON text frames carrying the protocol messages.
//!
//! # Architecture
//!
//! The driver is pure logic (no I/O) and runs on whichever task holds its
//! mutex; all membership mutation and relay dispatch are sequenced there.
//! Outbound delivery goes through one unbounded channel per session, so
//! handing an event to a slow or dead peer never suspends event processing —
//! the send is fire-and-forget and a failed write is logged and dropped.
//!
//! # Components
//!
//! - [`Membership`]: room → sessions registry with disconnect cleanup
//! - [`EventRelay`]: stateless fan-out, sender always excluded
//! - [`ServerDriver`]: event/action orchestrator (pure logic)
//! - [`Server`]: production runtime executing driver actions

#![forbid(unsafe_code)]

mod driver;
mod error;
mod membership;
mod relay;

use std::{collections::HashMap, sync::Arc};

pub use driver::{LogLevel, ServerAction, ServerDriver, ServerEvent};
pub use error::ServerError;
use futures_util::{SinkExt, StreamExt};
pub use membership::Membership;
pub use relay::{Delivery, EventRelay};
use tally_proto::ClientMessage;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{Mutex, RwLock, mpsc},
};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Shared outbound channels, one per session.
///
/// Senders are unbounded so the driver task never blocks on a slow peer.
struct SharedState {
    peers: RwLock<HashMap<u64, mpsc::UnboundedSender<Message>>>,
}

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (e.g. "0.0.0.0:4040").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "0.0.0.0:4040".to_string() }
    }
}

/// Production relay server.
///
/// Wraps [`ServerDriver`] with a WebSocket transport.
pub struct Server {
    listener: TcpListener,
    driver: Arc<Mutex<ServerDriver>>,
}

impl Server {
    /// Create and bind a new server.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.bind_address).await?;
        Ok(Self { listener, driver: Arc::new(Mutex::new(ServerDriver::new())) })
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<std::net::SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Run the server, accepting connections and relaying events.
    ///
    /// Runs until the process is shut down or accept fails fatally.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("relay listening on {}", self.local_addr()?);

        let shared = Arc::new(SharedState { peers: RwLock::new(HashMap::new()) });

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let driver = Arc::clone(&self.driver);
                    let shared = Arc::clone(&shared);

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, driver, shared).await {
                            tracing::debug!("connection from {addr} ended: {e}");
                        }
                    });
                },
                Err(e) => {
                    tracing::error!("accept error: {e}");
                },
            }
        }
    }
}

/// Handle a single WebSocket connection for its whole lifetime.
async fn handle_connection(
    stream: TcpStream,
    driver: Arc<Mutex<ServerDriver>>,
    shared: Arc<SharedState>,
) -> Result<(), ServerError> {
    let session_id: u64 = rand::random();

    let ws = accept_async(stream).await.map_err(|e| ServerError::Handshake(e.to_string()))?;
    let (mut sink, mut inbound) = ws.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    // Writer task: drains the outbound channel. A write failure means the
    // peer is gone; pending and future deliveries to it are dropped.
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sink.send(msg).await {
                tracing::debug!("write to session {session_id} failed: {e}");
                break;
            }
        }
    });

    {
        let mut peers = shared.peers.write().await;
        peers.insert(session_id, tx);
    }

    {
        let mut driver = driver.lock().await;
        let actions = driver.process_event(ServerEvent::Connected { session_id });
        execute_actions(actions, &shared).await;
    }

    while let Some(frame) = inbound.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let msg = match ClientMessage::decode(text.as_str()) {
                    Ok(msg) => msg,
                    Err(e) => {
                        // Malformed frames are dropped, not answered
                        tracing::debug!("undecodable frame from {session_id}: {e}");
                        continue;
                    },
                };

                let actions = {
                    let mut driver = driver.lock().await;
                    driver.process_event(ServerEvent::MessageReceived { session_id, msg })
                };
                execute_actions(actions, &shared).await;
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}, // ping/pong and binary frames carry nothing for us
            Err(e) => {
                tracing::debug!("read from session {session_id} failed: {e}");
                break;
            },
        }
    }

    {
        let mut peers = shared.peers.write().await;
        peers.remove(&session_id);
    }

    {
        let mut driver = driver.lock().await;
        let actions = driver.process_event(ServerEvent::Disconnected { session_id });
        execute_actions(actions, &shared).await;
    }

    Ok(())
}

/// Execute driver actions.
///
/// Sends are best-effort and isolated per target: an encode failure or a
/// closed channel is logged and the remaining actions still execute.
async fn execute_actions(actions: Vec<ServerAction>, shared: &SharedState) {
    for action in actions {
        match action {
            ServerAction::Send { session_id, msg } => {
                let text = match msg.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("failed to encode message for {session_id}: {e}");
                        continue;
                    },
                };

                let peers = shared.peers.read().await;
                match peers.get(&session_id) {
                    Some(tx) => {
                        if tx.send(Message::Text(text.into())).is_err() {
                            tracing::debug!("session {session_id} gone, delivery dropped");
                        }
                    },
                    None => {
                        tracing::debug!("session {session_id} not connected, delivery dropped");
                    },
                }
            },

            ServerAction::Log { level, message } => match level {
                LogLevel::Debug => tracing::debug!("{message}"),
                LogLevel::Info => tracing::info!("{message}"),
                LogLevel::Warn => tracing::warn!("{message}"),
            },
        }
    }
}
