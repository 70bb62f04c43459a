//! In-process connection backed by bounded Tokio channels.

use std::time::Duration;

use async_trait::async_trait;
use tokio::{sync::mpsc, time};

use super::{Connection, ConnectionError};
use crate::{packet::Packet, pool::BufferPool};

/// One end of an in-memory packet channel.
///
/// Queued packets keep their pool lease until the receiving end drops them,
/// so a sender whose pool is smaller than the queue depth runs out of buffers
/// when the receiver falls behind.
#[derive(Debug)]
pub struct MemoryConnection {
    pool: BufferPool,
    tx: mpsc::Sender<Packet>,
    rx: mpsc::Receiver<Packet>,
}

impl MemoryConnection {
    /// Create two connected ends.
    ///
    /// Each end allocates from its own pool; `depth` bounds the number of
    /// packets queued in each direction.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    #[must_use]
    pub fn pair(left_pool: BufferPool, right_pool: BufferPool, depth: usize) -> (Self, Self) {
        let (left_tx, right_rx) = mpsc::channel(depth);
        let (right_tx, left_rx) = mpsc::channel(depth);
        (
            Self {
                pool: left_pool,
                tx: left_tx,
                rx: left_rx,
            },
            Self {
                pool: right_pool,
                tx: right_tx,
                rx: right_rx,
            },
        )
    }

    /// Pool used for outbound packets.
    #[must_use]
    pub fn pool(&self) -> &BufferPool { &self.pool }
}

#[async_trait]
impl Connection for MemoryConnection {
    fn allocate(&self) -> Option<Packet> { self.pool.get() }

    fn max_payload(&self) -> usize { self.pool.buffer_size() }

    async fn send(&mut self, packet: Packet) -> Result<(), ConnectionError> {
        self.tx
            .send(packet)
            .await
            .map_err(|_| ConnectionError::Closed)
    }

    async fn read(&mut self, timeout: Duration) -> Result<Option<Packet>, ConnectionError> {
        match time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(packet)) => Ok(Some(packet)),
            Ok(None) => Err(ConnectionError::Closed),
            Err(_) => Ok(None),
        }
    }
}
