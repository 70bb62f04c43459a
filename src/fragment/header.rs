//! Fixed-size trailer appended to every fragment.
//!
//! The trailer sits immediately after the payload bytes rather than in front
//! of them, so a sender can fill the payload in place and append the trailer
//! without shifting data. Both fields are big-endian `u32` values.

use crate::{
    byte_order::{read_network_u32, write_network_u32},
    packet::PacketFlags,
};

/// Number of bytes occupied by an encoded [`FragmentHeader`].
pub const TRAILER_LEN: usize = 8;

/// Position of a fragment within a transfer.
///
/// # Examples
///
/// ```
/// use sfp::fragment::FragmentHeader;
/// let header = FragmentHeader::new(4, 10);
/// assert_eq!(header.encode(), [0, 0, 0, 4, 0, 0, 0, 10]);
/// assert_eq!(FragmentHeader::decode(header.encode()), header);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FragmentHeader {
    offset: u32,
    total_size: u32,
}

impl FragmentHeader {
    /// Create a header for the fragment starting at `offset`.
    #[must_use]
    pub const fn new(offset: u32, total_size: u32) -> Self { Self { offset, total_size } }

    /// Byte offset of the fragment payload within the transfer.
    #[must_use]
    pub const fn offset(&self) -> u32 { self.offset }

    /// Total size of the transfer, repeated in every fragment.
    #[must_use]
    pub const fn total_size(&self) -> u32 { self.total_size }

    /// A trailer is well formed when its offset does not pass the end of the
    /// transfer it describes.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool { self.offset <= self.total_size }

    /// Serialise the header into its 8-byte wire form.
    #[must_use]
    pub fn encode(&self) -> [u8; TRAILER_LEN] {
        let mut bytes = [0_u8; TRAILER_LEN];
        let (offset, total) = bytes.split_at_mut(4);
        offset.copy_from_slice(&write_network_u32(self.offset));
        total.copy_from_slice(&write_network_u32(self.total_size));
        bytes
    }

    /// Parse a header from its 8-byte wire form.
    ///
    /// No validation happens here; see [`strip_trailer`] for the checks a
    /// received trailer must pass.
    #[must_use]
    pub fn decode(bytes: [u8; TRAILER_LEN]) -> Self {
        let [a, b, c, d, e, f, g, h] = bytes;
        Self {
            offset: read_network_u32([a, b, c, d]),
            total_size: read_network_u32([e, f, g, h]),
        }
    }
}

/// Append the encoded `header` after the first `payload_len` bytes of `buf`.
///
/// Returns the new logical length, or `None` when `buf` has no room for the
/// trailer.
#[must_use]
pub fn append_trailer(buf: &mut [u8], payload_len: usize, header: FragmentHeader) -> Option<usize> {
    let end = payload_len.checked_add(TRAILER_LEN)?;
    let slot = buf.get_mut(payload_len..end)?;
    slot.copy_from_slice(&header.encode());
    Some(end)
}

/// Read and remove the trailer from the end of a received `payload`.
///
/// Returns the decoded header together with the payload length once the
/// trailer is removed. `None` signals a message that does not carry a usable
/// trailer: the fragment flag is missing, the payload is shorter than the
/// trailer, or the decoded offset lies beyond the declared total size.
#[must_use]
pub fn strip_trailer(flags: PacketFlags, payload: &[u8]) -> Option<(FragmentHeader, usize)> {
    if !flags.contains(PacketFlags::FRAGMENT) {
        return None;
    }
    let split = payload.len().checked_sub(TRAILER_LEN)?;
    let trailer: [u8; TRAILER_LEN] = payload.get(split..)?.try_into().ok()?;
    let header = FragmentHeader::decode(trailer);
    header.is_well_formed().then_some((header, split))
}
