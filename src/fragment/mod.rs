//! Fragment trailer codec and receive-side reassembly.
//!
//! A transfer is carried as a run of fragments, each ending in an 8-byte
//! trailer holding the fragment offset and the transfer's total size. This
//! module owns the trailer format and the per-fragment validation applied on
//! receipt; the loops driving whole transfers live in
//! [`transfer`](crate::transfer).

pub mod error;
pub mod header;
pub mod reassembly;

pub use error::ProtocolViolation;
pub use header::{FragmentHeader, TRAILER_LEN, append_trailer, strip_trailer};
pub use reassembly::{Reassembly, ReassemblyStatus};
