//! Message channels the transfer engine runs over.
//!
//! A [`Connection`] is an already-established, ordered, non-duplicating
//! message channel. The engine only allocates packets, sends them, and reads
//! them back with a timeout; establishing and tearing down the channel is the
//! caller's business. Only one transfer may use a connection at a time since
//! fragments carry no transfer identifier.

use std::{io, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use crate::packet::Packet;

pub mod memory;
pub mod stream;

pub use memory::MemoryConnection;
pub use stream::StreamConnection;

/// Failures reported by a [`Connection`].
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The peer closed the channel.
    #[error("connection closed by peer")]
    Closed,
    /// The underlying byte stream failed.
    #[error("transport i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Ordered message channel carrying [`Packet`]s.
#[async_trait]
pub trait Connection: Send {
    /// Allocate an empty outbound packet, or `None` when buffers are
    /// exhausted.
    fn allocate(&self) -> Option<Packet>;

    /// Largest payload, trailer included, a single packet can carry.
    fn max_payload(&self) -> usize;

    /// Hand `packet` to the channel, waiting until it is accepted.
    async fn send(&mut self, packet: Packet) -> Result<(), ConnectionError>;

    /// Wait up to `timeout` for the next packet.
    ///
    /// Returns `Ok(None)` when the timeout elapses first.
    async fn read(&mut self, timeout: Duration) -> Result<Option<Packet>, ConnectionError>;
}
