//! Metric helpers for `sfp`.
//!
//! Metric names and thin wrappers around the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! every helper is a no-op.

use crate::error::TransferError;

/// Name of the counter tracking fragments moved.
pub const FRAGMENTS_TOTAL: &str = "sfp_fragments_total";
/// Name of the counter tracking completed transfers.
pub const TRANSFERS_TOTAL: &str = "sfp_transfers_total";
/// Name of the counter tracking failed transfers.
pub const TRANSFER_ERRORS_TOTAL: &str = "sfp_transfer_errors_total";

/// Direction of a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Fragments received from the peer.
    Inbound,
    /// Fragments sent to the peer.
    Outbound,
}

impl Direction {
    /// Label value used for the `direction` label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record one fragment moved in `direction`.
pub fn inc_fragments(direction: Direction) {
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAGMENTS_TOTAL, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record the outcome of a transfer in `direction`.
pub fn record_transfer(direction: Direction, error: Option<&TransferError>) {
    #[cfg(feature = "metrics")]
    match error {
        None => {
            metrics::counter!(TRANSFERS_TOTAL, "direction" => direction.as_str()).increment(1);
        }
        Some(err) => {
            metrics::counter!(
                TRANSFER_ERRORS_TOTAL,
                "direction" => direction.as_str(),
                "kind" => err.kind().as_str()
            )
            .increment(1);
        }
    }
    #[cfg(not(feature = "metrics"))]
    let _ = (direction, error);
}
