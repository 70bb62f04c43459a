#![doc(html_root_url = "https://docs.rs/sfp/latest")]
//! Public API for the `sfp` library.
//!
//! `sfp` moves an arbitrarily large blob over a message channel whose
//! individual messages are small and bounded. The sender chops the blob into
//! fragments, each ending in an 8-byte trailer that records the fragment's
//! offset and the transfer's total size; the receiver checks every trailer and
//! writes the payloads back in order. Data is pulled from and pushed to
//! caller-supplied storage capabilities, so it never has to sit in memory as a
//! whole.
//!
//! ```
//! use std::{num::NonZeroUsize, time::Duration};
//!
//! use sfp::{
//!     BufferPool,
//!     MemoryConnection,
//!     storage::{SliceSource, VecSink},
//!     transfer,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), sfp::TransferError> {
//! let pool = || {
//!     BufferPool::new(
//!         NonZeroUsize::new(64).expect("non-zero"),
//!         NonZeroUsize::new(8).expect("non-zero"),
//!     )
//! };
//! let (mut tx, mut rx) = MemoryConnection::pair(pool(), pool(), 8);
//! let data = b"a blob too large for one message".to_vec();
//!
//! let mut source = SliceSource::new(&data);
//! let mut sink = VecSink::new();
//! let (sent, received) = tokio::join!(
//!     transfer::send(&mut tx, &mut source, 32, 10),
//!     transfer::recv(&mut rx, &mut sink, Duration::from_secs(1)),
//! );
//! sent?;
//! assert_eq!(received?, 32);
//! assert_eq!(sink.as_slice(), data.as_slice());
//! # Ok(())
//! # }
//! ```

pub mod byte_order;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod fragment;
pub mod metrics;
pub mod packet;
pub mod pool;
pub mod storage;
pub mod transfer;

pub use config::TransferConfig;
pub use connection::{Connection, ConnectionError, MemoryConnection, StreamConnection};
pub use error::{ErrorKind, TransferError};
pub use fragment::{FragmentHeader, ProtocolViolation, TRAILER_LEN};
pub use packet::{Packet, PacketFlags};
pub use pool::BufferPool;
pub use transfer::{recv, recv_with_first, send};
