//! Receive-side state that validates fragments and delivers their payloads.
//!
//! `Reassembly` holds a running offset and the total size
//! fixed by the first fragment. It never buffers payload bytes itself; each
//! accepted fragment goes straight to the caller's
//! [`WriteStorage`](crate::storage::WriteStorage).

use std::num::NonZeroU32;

use log::debug;

use super::{ProtocolViolation, TRAILER_LEN};
use crate::{packet::Packet, storage::WriteStorage};

/// Result of feeding a fragment into a [`Reassembly`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReassemblyStatus {
    /// More fragments are required.
    Incomplete,
    /// The transfer is complete; carries the declared total size.
    Complete(u32),
}

/// Progress of a single inbound transfer.
#[derive(Clone, Debug)]
pub struct Reassembly {
    data_offset: u32,
    expected_total: Option<NonZeroU32>,
    payload_limit: usize,
}

impl Reassembly {
    /// Start a transfer expecting the fragment at offset zero.
    ///
    /// Payloads are bounded only by the capacity of the packet carrying them.
    #[must_use]
    pub const fn new() -> Self { Self::with_payload_limit(usize::MAX) }

    /// Start a transfer that also rejects payloads longer than `limit`.
    ///
    /// Receivers pass the largest payload their own connection can carry, so
    /// a peer with larger buffers cannot push oversized fragments through.
    #[must_use]
    pub const fn with_payload_limit(limit: usize) -> Self {
        Self {
            data_offset: 0,
            expected_total: None,
            payload_limit: limit,
        }
    }

    /// Largest payload accepted per fragment, before packet capacity applies.
    #[must_use]
    pub const fn payload_limit(&self) -> usize { self.payload_limit }

    /// Bytes delivered to storage so far.
    #[must_use]
    pub const fn data_offset(&self) -> u32 { self.data_offset }

    /// Total size declared by the first fragment, once seen.
    #[must_use]
    pub fn expected_total(&self) -> Option<u32> { self.expected_total.map(NonZeroU32::get) }

    /// Validate `packet`, strip its trailer, and write its payload to `sink`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sfp::{
    ///     fragment::{FragmentHeader, Reassembly, ReassemblyStatus},
    ///     packet::{Packet, PacketFlags},
    ///     storage::VecSink,
    /// };
    /// let mut packet = Packet::with_payload(64, PacketFlags::FRAGMENT, b"hi").expect("fits");
    /// packet.append_trailer(FragmentHeader::new(0, 2)).expect("fits");
    ///
    /// let mut sink = VecSink::new();
    /// let mut reassembly = Reassembly::new();
    /// assert_eq!(
    ///     reassembly.accept(&mut packet, &mut sink),
    ///     Ok(ReassemblyStatus::Complete(2))
    /// );
    /// assert_eq!(sink.as_slice(), b"hi");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::MissingTrailer`] when the packet carries no
    /// usable trailer, [`ProtocolViolation::OffsetMismatch`] when the fragment
    /// does not start where the previous one ended,
    /// [`ProtocolViolation::EmptyFragment`] or
    /// [`ProtocolViolation::OversizedFragment`] for payloads outside
    /// `1..=min(capacity - TRAILER_LEN, payload_limit)`, [`ProtocolViolation::ZeroTotalSize`] when
    /// the first fragment declares an empty transfer, and
    /// [`ProtocolViolation::ShortWrite`] when `sink` does not accept the whole
    /// payload.
    pub fn accept<W>(
        &mut self,
        packet: &mut Packet,
        sink: &mut W,
    ) -> Result<ReassemblyStatus, ProtocolViolation>
    where
        W: WriteStorage + ?Sized,
    {
        let Some(header) = packet.strip_trailer() else {
            debug!(
                "rejecting message without fragment trailer: flags={:?}, len={}",
                packet.flags(),
                packet.len()
            );
            return Err(ProtocolViolation::MissingTrailer);
        };

        if header.offset() != self.data_offset {
            debug!(
                "rejecting fragment: offset={}, expected={}",
                header.offset(),
                self.data_offset
            );
            return Err(ProtocolViolation::OffsetMismatch {
                expected: self.data_offset,
                found: header.offset(),
            });
        }

        let len = packet.len();
        if len == 0 {
            debug!("rejecting empty fragment at offset {}", header.offset());
            return Err(ProtocolViolation::EmptyFragment {
                offset: header.offset(),
            });
        }
        let limit = packet
            .capacity()
            .saturating_sub(TRAILER_LEN)
            .min(self.payload_limit);
        if len > limit {
            debug!("rejecting fragment of {len} bytes: limit={limit}");
            return Err(ProtocolViolation::OversizedFragment { len, limit });
        }

        let expected_total = match self.expected_total {
            Some(total) => total,
            None => {
                let total = NonZeroU32::new(header.total_size())
                    .ok_or(ProtocolViolation::ZeroTotalSize)?;
                self.expected_total = Some(total);
                total
            }
        };

        let written = sink.write(packet.payload(), self.data_offset, expected_total.get());
        if written != len {
            return Err(ProtocolViolation::ShortWrite {
                offset: self.data_offset,
                requested: len,
                returned: written,
            });
        }

        let advance = u32::try_from(len).unwrap_or(u32::MAX);
        self.data_offset = self.data_offset.saturating_add(advance);
        debug!(
            "accepted fragment: {}/{} bytes",
            self.data_offset,
            expected_total.get()
        );

        if self.data_offset >= expected_total.get() {
            Ok(ReassemblyStatus::Complete(expected_total.get()))
        } else {
            Ok(ReassemblyStatus::Incomplete)
        }
    }
}

impl Default for Reassembly {
    fn default() -> Self { Self::new() }
}
