//! Owned, fixed-capacity message buffers.
//!
//! A [`Packet`] models one transport message: a physical buffer of fixed
//! capacity, a logical payload length within it, and the transport flags that
//! travel alongside the payload. Packets drawn from a
//! [`BufferPool`](crate::pool::BufferPool) hand their slot back when dropped.

use bitflags::bitflags;

use crate::{
    fragment::{FragmentHeader, header},
    pool::Lease,
};

bitflags! {
    /// Transport-level flags carried outside the payload.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PacketFlags: u8 {
        /// The payload ends with a fragment trailer.
        const FRAGMENT = 0x10;
    }
}

/// A single transport message.
#[derive(Debug)]
pub struct Packet {
    flags: PacketFlags,
    buf: Box<[u8]>,
    len: usize,
    _lease: Option<Lease>,
}

impl Packet {
    /// Create an empty, unpooled packet able to hold `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            flags: PacketFlags::empty(),
            buf: vec![0_u8; capacity].into_boxed_slice(),
            len: 0,
            _lease: None,
        }
    }

    /// Create an unpooled packet holding a copy of `payload`.
    ///
    /// Returns `None` when `payload` does not fit in `capacity`.
    #[must_use]
    pub fn with_payload(capacity: usize, flags: PacketFlags, payload: &[u8]) -> Option<Self> {
        let mut packet = Self::with_capacity(capacity);
        packet.payload_mut(payload.len())?.copy_from_slice(payload);
        packet.flags = flags;
        Some(packet)
    }

    pub(crate) fn leased(capacity: usize, lease: Lease) -> Self {
        Self {
            _lease: Some(lease),
            ..Self::with_capacity(capacity)
        }
    }

    /// Physical size of the buffer.
    #[must_use]
    pub fn capacity(&self) -> usize { self.buf.len() }

    /// Logical payload length.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    /// Whether the logical payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Transport flags.
    #[must_use]
    pub fn flags(&self) -> PacketFlags { self.flags }

    /// Replace the transport flags.
    pub fn set_flags(&mut self, flags: PacketFlags) { self.flags = flags; }

    /// Set additional transport flags.
    pub fn insert_flags(&mut self, flags: PacketFlags) { self.flags.insert(flags); }

    /// The visible payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] { self.buf.get(..self.len).unwrap_or_default() }

    /// Resize the logical payload to `len` and expose it for filling.
    ///
    /// Returns `None`, leaving the packet unchanged, when `len` exceeds the
    /// capacity.
    pub fn payload_mut(&mut self, len: usize) -> Option<&mut [u8]> {
        let window = self.buf.get_mut(..len)?;
        self.len = len;
        Some(window)
    }

    /// Append a fragment trailer after the current payload.
    ///
    /// Returns the new payload length, or `None` when the trailer does not
    /// fit.
    pub fn append_trailer(&mut self, fragment: FragmentHeader) -> Option<usize> {
        let len = header::append_trailer(&mut self.buf, self.len, fragment)?;
        self.len = len;
        Some(len)
    }

    /// Remove and decode the fragment trailer from the end of the payload.
    ///
    /// On `None` the packet is left untouched.
    pub fn strip_trailer(&mut self) -> Option<FragmentHeader> {
        let (fragment, len) = header::strip_trailer(self.flags, self.payload())?;
        self.len = len;
        Some(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::TRAILER_LEN;

    #[test]
    fn payload_mut_tracks_logical_length() {
        let mut packet = Packet::with_capacity(16);
        packet
            .payload_mut(3)
            .expect("fits")
            .copy_from_slice(&[1, 2, 3]);
        assert_eq!(packet.payload(), &[1, 2, 3]);
        assert_eq!(packet.capacity(), 16);
        assert!(packet.payload_mut(17).is_none());
        assert_eq!(packet.len(), 3);
    }

    #[test]
    fn trailer_append_then_strip_restores_payload() {
        let mut packet =
            Packet::with_payload(16, PacketFlags::FRAGMENT, b"abcd").expect("payload fits");
        assert_eq!(
            packet.append_trailer(FragmentHeader::new(4, 8)),
            Some(4 + TRAILER_LEN)
        );

        assert_eq!(packet.strip_trailer(), Some(FragmentHeader::new(4, 8)));
        assert_eq!(packet.payload(), b"abcd");
    }

    #[test]
    fn trailer_is_rejected_when_capacity_is_exhausted() {
        let mut packet = Packet::with_payload(10, PacketFlags::empty(), b"abc").expect("fits");
        assert!(packet.append_trailer(FragmentHeader::new(0, 3)).is_none());
        assert_eq!(packet.len(), 3);
    }

    #[test]
    fn strip_without_flag_leaves_packet_untouched() {
        let mut packet = Packet::with_capacity(16);
        packet.append_trailer(FragmentHeader::new(0, 1)).expect("fits");
        assert!(packet.strip_trailer().is_none());
        assert_eq!(packet.len(), TRAILER_LEN);
    }
}
