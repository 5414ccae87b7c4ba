use super::traits::{ConnectionRegistry, ConnectionStats};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Connection registry for websocket layers that fan messages out through a
/// tokio broadcast channel: every connected client holds one receiver.
#[derive(Clone)]
pub struct BroadcastConnectionRegistry {
    sender: Arc<broadcast::Sender<String>>,
    total_connections: Arc<AtomicU64>,
}

impl BroadcastConnectionRegistry {
    pub fn new(sender: Arc<broadcast::Sender<String>>) -> Self {
        Self {
            sender,
            total_connections: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribes a new client and counts it towards the lifetime total.
    pub fn connect(&self) -> broadcast::Receiver<String> {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.sender.subscribe()
    }
}

impl ConnectionRegistry for BroadcastConnectionRegistry {
    fn stats(&self) -> Option<ConnectionStats> {
        Some(ConnectionStats {
            active_connections: self.sender.receiver_count() as u64,
            total_connections: self.total_connections.load(Ordering::Relaxed),
        })
    }
}
