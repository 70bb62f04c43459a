//! Outbound chunking loop.

use log::debug;

use crate::{
    connection::Connection,
    error::{Result, TransferError},
    fragment::{FragmentHeader, ProtocolViolation, TRAILER_LEN},
    metrics::{self, Direction},
    packet::PacketFlags,
    storage::ReadStorage,
};

/// Largest MTU a connection can carry once the trailer is accounted for.
fn mtu_limit<C: Connection + ?Sized>(conn: &C) -> usize {
    conn.max_payload().saturating_sub(TRAILER_LEN)
}

pub(crate) fn check_mtu(mtu: u32, limit: usize) -> Result<()> {
    let fits = usize::try_from(mtu).is_ok_and(|mtu| mtu <= limit);
    if mtu == 0 || !fits {
        return Err(TransferError::InvalidMtu { mtu, max: limit });
    }
    Ok(())
}

/// Send `total_size` bytes pulled from `source` as a run of fragments.
///
/// Each fragment carries at most `mtu` payload bytes; every fragment but the
/// last carries exactly `mtu`. A `total_size` of zero sends nothing and
/// succeeds.
///
/// # Errors
///
/// Returns [`TransferError::InvalidMtu`] before sending anything when `mtu` is
/// zero or exceeds the connection's payload capacity minus the trailer,
/// [`TransferError::OutOfMemory`] when the connection cannot allocate a
/// packet, [`ProtocolViolation::ShortRead`] when `source` does not fill a
/// chunk exactly, and [`TransferError::Connection`] when the connection
/// refuses a fragment.
pub async fn send<C, R>(conn: &mut C, source: &mut R, total_size: u32, mtu: u32) -> Result<()>
where
    C: Connection + ?Sized,
    R: ReadStorage + ?Sized,
{
    let result = send_fragments(conn, source, total_size, mtu).await;
    metrics::record_transfer(Direction::Outbound, result.as_ref().err());
    result
}

async fn send_fragments<C, R>(conn: &mut C, source: &mut R, total_size: u32, mtu: u32) -> Result<()>
where
    C: Connection + ?Sized,
    R: ReadStorage + ?Sized,
{
    check_mtu(mtu, mtu_limit(conn))?;

    let mut count = 0_u32;
    while count < total_size {
        let mut packet = conn.allocate().ok_or(TransferError::OutOfMemory)?;

        let size = mtu.min(total_size - count);
        let requested = usize::try_from(size).unwrap_or(usize::MAX);
        let max = packet.capacity().saturating_sub(TRAILER_LEN);
        if requested > max {
            return Err(TransferError::InvalidMtu { mtu, max });
        }
        let Some(chunk) = packet.payload_mut(requested) else {
            return Err(TransferError::InvalidMtu { mtu, max });
        };

        let returned = source.read(chunk, count);
        if returned != requested {
            debug!("aborting send: storage read at {count} returned {returned} of {requested}");
            return Err(ProtocolViolation::ShortRead {
                offset: count,
                requested,
                returned,
            }
            .into());
        }

        packet.insert_flags(PacketFlags::FRAGMENT);
        if packet
            .append_trailer(FragmentHeader::new(count, total_size))
            .is_none()
        {
            return Err(TransferError::InvalidMtu { mtu, max });
        }

        conn.send(packet).await?;
        metrics::inc_fragments(Direction::Outbound);
        debug!("sent fragment: offset={count}, len={size}, total={total_size}");

        count += size;
    }

    Ok(())
}
