//! Byte-stream framing for packets.
//!
//! Stream transports have no message boundaries of their own, so each packet
//! is written as a length-delimited frame (4-byte big-endian length, via
//! `tokio_util`'s `LengthDelimitedCodec`) whose body is the packet flags byte
//! followed by the payload:
//!
//! ```text
//! [u32 length][u8 flags][payload ...]
//! ```
//!
//! Decoded packets are given the configured capacity, so the receive-side
//! payload limit matches the sender's buffer size.

use std::io;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

use crate::packet::{Packet, PacketFlags};

/// Bytes preceding the payload inside a frame body.
pub const FLAGS_LEN: usize = 1;

/// Codec translating between [`Packet`]s and length-delimited frames.
#[derive(Debug)]
pub struct PacketCodec {
    packet_capacity: usize,
    inner: LengthDelimitedCodec,
}

impl PacketCodec {
    /// Create a codec for packets of up to `packet_capacity` payload bytes.
    #[must_use]
    pub fn new(packet_capacity: usize) -> Self {
        Self {
            packet_capacity,
            inner: LengthDelimitedCodec::builder()
                .max_frame_length(packet_capacity.saturating_add(FLAGS_LEN))
                .new_codec(),
        }
    }

    /// Capacity given to decoded packets.
    #[must_use]
    pub fn packet_capacity(&self) -> usize { self.packet_capacity }

    fn packet_from_frame(&self, frame: &BytesMut) -> io::Result<Packet> {
        let Some((&flags, payload)) = frame.split_first() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "frame is missing the packet flags byte",
            ));
        };
        Packet::with_payload(
            self.packet_capacity,
            PacketFlags::from_bits_retain(flags),
            payload,
        )
        .ok_or_else(|| oversized(payload.len(), self.packet_capacity))
    }
}

fn oversized(len: usize, capacity: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("packet of {len} bytes exceeds capacity of {capacity}"),
    )
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode(src)? {
            Some(frame) => self.packet_from_frame(&frame).map(Some),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        match self.decode(src)? {
            Some(packet) => Ok(Some(packet)),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream closed mid-frame after {} bytes", src.len()),
            )),
        }
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.len() > self.packet_capacity {
            return Err(oversized(item.len(), self.packet_capacity));
        }
        let mut body = BytesMut::with_capacity(FLAGS_LEN + item.len());
        body.put_u8(item.flags().bits());
        body.extend_from_slice(item.payload());
        self.inner.encode(body.freeze(), dst)
    }
}
