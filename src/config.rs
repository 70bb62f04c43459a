//! Transfer settings.

use std::{num::NonZeroU32, time::Duration};

use crate::{
    connection::Connection,
    error::Result,
    fragment::TRAILER_LEN,
    packet::Packet,
    storage::{ReadStorage, WriteStorage},
    transfer,
};

/// Default size of a single packet buffer in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Default number of buffers in a packet pool.
pub const DEFAULT_POOL_CAPACITY: usize = 16;

/// Default per-fragment receive timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// MTU and timeout applied to transfers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferConfig {
    /// Maximum payload bytes per fragment, excluding the trailer.
    pub mtu: NonZeroU32,
    /// How long a receiver waits for each fragment.
    pub timeout: Duration,
}

impl TransferConfig {
    /// Use the largest MTU that fits packets of `buffer_size` bytes.
    ///
    /// Returns `None` when the buffer cannot hold a trailer plus at least one
    /// payload byte.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use sfp::config::TransferConfig;
    ///
    /// let config = TransferConfig::for_buffer_size(256, Duration::from_secs(1)).expect("fits");
    /// assert_eq!(config.mtu.get(), 248);
    /// assert!(TransferConfig::for_buffer_size(8, Duration::from_secs(1)).is_none());
    /// ```
    #[must_use]
    pub fn for_buffer_size(buffer_size: usize, timeout: Duration) -> Option<Self> {
        let available = buffer_size.checked_sub(TRAILER_LEN)?;
        let mtu = u32::try_from(available).unwrap_or(u32::MAX);
        Some(Self {
            mtu: NonZeroU32::new(mtu)?,
            timeout,
        })
    }

    /// Check the MTU against a connection whose packets carry at most
    /// `max_payload` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidMtu`](crate::error::TransferError::InvalidMtu)
    /// when the MTU leaves no room for the trailer.
    pub fn validate(&self, max_payload: usize) -> Result<()> {
        transfer::check_mtu(self.mtu.get(), max_payload.saturating_sub(TRAILER_LEN))
    }

    /// Send `total_size` bytes from `source` using this configuration's MTU.
    ///
    /// # Errors
    ///
    /// See [`transfer::send`].
    pub async fn send<C, R>(&self, conn: &mut C, source: &mut R, total_size: u32) -> Result<()>
    where
        C: Connection + ?Sized,
        R: ReadStorage + ?Sized,
    {
        transfer::send(conn, source, total_size, self.mtu.get()).await
    }

    /// Receive a transfer into `sink` using this configuration's timeout.
    ///
    /// # Errors
    ///
    /// See [`transfer::recv_with_first`].
    pub async fn recv<C, W>(&self, conn: &mut C, sink: &mut W, first: Option<Packet>) -> Result<u32>
    where
        C: Connection + ?Sized,
        W: WriteStorage + ?Sized,
    {
        transfer::recv_with_first(conn, sink, self.timeout, first).await
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            mtu: NonZeroU32::new(
                u32::try_from(DEFAULT_BUFFER_SIZE - TRAILER_LEN).unwrap_or(u32::MAX),
            )
            .unwrap_or(NonZeroU32::MIN),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
