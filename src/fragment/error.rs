//! Consistency failures detected while moving fragments.
//!
//! Each variant names one of the checks the engine applies. All of them are
//! terminal for the transfer in progress.

use thiserror::Error;

/// A fragment or storage capability broke the transfer contract.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// The message lacks the fragment flag, is shorter than a trailer, or its
    /// trailer places the offset beyond the total size.
    #[error("message does not carry a valid fragment trailer")]
    MissingTrailer,
    /// A fragment arrived out of order, duplicated, or after a gap.
    #[error("fragment offset mismatch: expected {expected}, found {found}")]
    OffsetMismatch { expected: u32, found: u32 },
    /// The fragment carried no payload once the trailer was removed.
    #[error("empty fragment at offset {offset}")]
    EmptyFragment { offset: u32 },
    /// The fragment payload exceeds what a single packet may carry.
    #[error("fragment payload of {len} bytes exceeds limit of {limit}")]
    OversizedFragment { len: usize, limit: usize },
    /// The first fragment declared an empty transfer.
    #[error("transfer declares a total size of zero")]
    ZeroTotalSize,
    /// The read capability did not supply exactly the requested bytes.
    #[error("storage read at offset {offset} returned {returned} of {requested} bytes")]
    ShortRead {
        offset: u32,
        requested: usize,
        returned: usize,
    },
    /// The write capability did not accept exactly the offered bytes.
    #[error("storage write at offset {offset} returned {returned} of {requested} bytes")]
    ShortWrite {
        offset: u32,
        requested: usize,
        returned: usize,
    },
}
