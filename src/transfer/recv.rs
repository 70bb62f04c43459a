//! Inbound reassembly loop.

use std::time::Duration;

use log::debug;

use crate::{
    connection::Connection,
    error::{Result, TransferError},
    fragment::{Reassembly, ReassemblyStatus, TRAILER_LEN},
    metrics::{self, Direction},
    packet::Packet,
    storage::WriteStorage,
};

/// Receive one transfer into `sink`, reading the first fragment from `conn`.
///
/// Returns the total size declared by the transfer.
///
/// # Errors
///
/// See [`recv_with_first`].
pub async fn recv<C, W>(conn: &mut C, sink: &mut W, timeout: Duration) -> Result<u32>
where
    C: Connection + ?Sized,
    W: WriteStorage + ?Sized,
{
    recv_with_first(conn, sink, timeout, None).await
}

/// Receive one transfer into `sink`, optionally starting from a fragment the
/// caller already pulled off the connection.
///
/// `timeout` applies to each read separately, not to the transfer as a whole.
/// Every packet is dropped before the next read, whatever the outcome.
///
/// # Errors
///
/// Returns [`TransferError::Timeout`] when no fragment arrives within
/// `timeout`, [`TransferError::Protocol`] when a fragment fails validation or
/// `sink` refuses a write, and [`TransferError::Connection`] when the
/// connection fails.
pub async fn recv_with_first<C, W>(
    conn: &mut C,
    sink: &mut W,
    timeout: Duration,
    first: Option<Packet>,
) -> Result<u32>
where
    C: Connection + ?Sized,
    W: WriteStorage + ?Sized,
{
    let result = receive_fragments(conn, sink, timeout, first).await;
    metrics::record_transfer(Direction::Inbound, result.as_ref().err());
    result
}

async fn receive_fragments<C, W>(
    conn: &mut C,
    sink: &mut W,
    timeout: Duration,
    first: Option<Packet>,
) -> Result<u32>
where
    C: Connection + ?Sized,
    W: WriteStorage + ?Sized,
{
    let mut next = first;
    let limit = conn.max_payload().saturating_sub(TRAILER_LEN);
    let mut reassembly = Reassembly::with_payload_limit(limit);

    loop {
        let mut packet = match next.take() {
            Some(packet) => packet,
            None => next_packet(conn, timeout, &reassembly).await?,
        };

        let status = reassembly.accept(&mut packet, sink)?;
        metrics::inc_fragments(Direction::Inbound);
        drop(packet);

        if let ReassemblyStatus::Complete(total) = status {
            return Ok(total);
        }
    }
}

async fn next_packet<C>(conn: &mut C, timeout: Duration, reassembly: &Reassembly) -> Result<Packet>
where
    C: Connection + ?Sized,
{
    match conn.read(timeout).await? {
        Some(packet) => Ok(packet),
        None => {
            debug!(
                "no fragment within {timeout:?}: received {} of {:?} bytes",
                reassembly.data_offset(),
                reassembly.expected_total()
            );
            Err(TransferError::Timeout(timeout))
        }
    }
}
