//! Network byte-order helpers for the fragment trailer.
//!
//! Both trailer fields travel big-endian. Keeping the conversions here scopes
//! the Clippy expectation to the two places that touch wire endianness.

/// Serialise a `u32` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use sfp::byte_order::write_network_u32;
///
/// assert_eq!(write_network_u32(0x0000_0400), [0x00, 0x00, 0x04, 0x00]);
/// ```
#[must_use]
pub fn write_network_u32(value: u32) -> [u8; 4] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Fragment trailers are big-endian on the wire."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u32` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use sfp::byte_order::read_network_u32;
///
/// assert_eq!(read_network_u32([0x00, 0x00, 0x04, 0x00]), 1024);
/// ```
#[must_use]
pub fn read_network_u32(bytes: [u8; 4]) -> u32 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Fragment trailers are big-endian on the wire."
    )]
    u32::from_be_bytes(bytes)
}
