//! Connection over a reliable byte stream such as TCP.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpStream, ToSocketAddrs},
    time,
};
use tokio_util::codec::Framed;

use super::{Connection, ConnectionError};
use crate::{codec::PacketCodec, packet::Packet, pool::BufferPool};

/// Packet channel framed over any ordered byte stream.
///
/// Outbound packets come from `pool`; inbound packets are sized to the pool's
/// buffer size so both ends agree on the per-packet payload limit.
#[derive(Debug)]
pub struct StreamConnection<T> {
    framed: Framed<T, PacketCodec>,
    pool: BufferPool,
}

impl<T> StreamConnection<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an established stream.
    pub fn new(stream: T, pool: BufferPool) -> Self {
        let codec = PacketCodec::new(pool.buffer_size());
        Self {
            framed: Framed::new(stream, codec),
            pool,
        }
    }

    /// Consume the connection, returning the underlying stream.
    pub fn into_inner(self) -> T { self.framed.into_inner() }
}

impl StreamConnection<TcpStream> {
    /// Connect to a TCP peer.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Io`] if the connection cannot be
    /// established.
    pub async fn connect(addr: impl ToSocketAddrs, pool: BufferPool) -> Result<Self, ConnectionError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream, pool))
    }
}

#[async_trait]
impl<T> Connection for StreamConnection<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn allocate(&self) -> Option<Packet> { self.pool.get() }

    fn max_payload(&self) -> usize { self.pool.buffer_size() }

    async fn send(&mut self, packet: Packet) -> Result<(), ConnectionError> {
        self.framed.send(packet).await?;
        Ok(())
    }

    async fn read(&mut self, timeout: Duration) -> Result<Option<Packet>, ConnectionError> {
        match time::timeout(timeout, self.framed.next()).await {
            Ok(Some(Ok(packet))) => Ok(Some(packet)),
            Ok(Some(Err(err))) => Err(err.into()),
            Ok(None) => Err(ConnectionError::Closed),
            Err(_) => Ok(None),
        }
    }
}
