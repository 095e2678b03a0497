//! Outbound handle for a single client connection

use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ws::protocol::ServerMsg;

/// Messages a client may fall behind by before it is dropped
pub const OUTBOUND_CAPACITY: usize = 256;

/// Cheap, clonable handle the game logic uses to talk to one client.
///
/// The socket itself is owned by the writer task in `ws::handler`; this only
/// holds the sending half of its queue plus the signal that tells the
/// handler to hang up on a client that stopped reading.
#[derive(Debug, Clone)]
pub struct Connection {
    id: Uuid,
    tx: mpsc::Sender<ServerMsg>,
    overflow: Arc<Notify>,
}

impl Connection {
    pub fn new(tx: mpsc::Sender<ServerMsg>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tx,
            overflow: Arc::new(Notify::new()),
        }
    }

    /// Create a connection plus the receiver its writer task drains
    pub fn channel() -> (Self, mpsc::Receiver<ServerMsg>) {
        Self::with_capacity(OUTBOUND_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> (Self, mpsc::Receiver<ServerMsg>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a message for the client without waiting.
    ///
    /// A closed peer is not an error here, its own close event performs the
    /// cleanup. A full queue means the client stopped draining it, so the
    /// message is dropped and the owning handler is told to disconnect.
    pub fn send(&self, msg: ServerMsg) {
        match self.tx.try_send(msg) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Outbound queue full, disconnecting slow client");
                self.overflow.notify_one();
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(conn_id = %self.id, "Dropping message for closed connection");
            }
        }
    }

    /// Resolves once a send found the outbound queue full.
    ///
    /// The permit is stored, so an overflow that happened before this is
    /// awaited is not lost.
    pub async fn overflowed(&self) {
        self.overflow.notified().await;
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}
