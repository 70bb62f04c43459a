//! Canonical error type for transfers.
//!
//! Every failure is terminal for the transfer in progress. Callers should
//! discard whatever the storage capability received before the error.

use std::time::Duration;

use thiserror::Error;

use crate::{connection::ConnectionError, fragment::ProtocolViolation};

/// Error returned by [`send`](crate::transfer::send) and
/// [`recv`](crate::transfer::recv).
#[derive(Debug, Error)]
pub enum TransferError {
    /// The requested MTU is zero or leaves no room for the fragment trailer.
    #[error("invalid mtu {mtu}: must be within 1..={max}")]
    InvalidMtu { mtu: u32, max: usize },
    /// No packet buffer could be allocated.
    #[error("no packet buffer available")]
    OutOfMemory,
    /// No fragment arrived within the per-fragment timeout.
    #[error("no fragment received within {0:?}")]
    Timeout(Duration),
    /// A fragment or storage capability broke the transfer contract.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),
    /// The underlying connection failed.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),
}

/// Coarse classification of a [`TransferError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A caller-supplied argument was out of range.
    InvalidArgument,
    /// Packet allocation failed.
    OutOfMemory,
    /// The peer went quiet.
    Timeout,
    /// The peer or a storage capability violated the protocol.
    ProtocolViolation,
    /// The transport failed.
    Connection,
}

impl ErrorKind {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::OutOfMemory => "out_of_memory",
            Self::Timeout => "timeout",
            Self::ProtocolViolation => "protocol_violation",
            Self::Connection => "connection",
        }
    }
}

impl TransferError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMtu { .. } => ErrorKind::InvalidArgument,
            Self::OutOfMemory => ErrorKind::OutOfMemory,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Protocol(_) => ErrorKind::ProtocolViolation,
            Self::Connection(_) => ErrorKind::Connection,
        }
    }
}

/// Result alias used by the transfer engine.
pub type Result<T, E = TransferError> = std::result::Result<T, E>;
