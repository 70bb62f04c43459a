//! Transfer engine driving whole transfers over a [`Connection`].
//!
//! [`send`] pulls chunks from a [`ReadStorage`](crate::storage::ReadStorage),
//! frames each with a trailer, and pushes them onto the connection until the
//! full size is covered. [`recv`] pulls fragments off the connection,
//! validates and strips each trailer, and pushes the payload into a
//! [`WriteStorage`](crate::storage::WriteStorage) until the declared total is
//! reached.
//!
//! Both calls occupy the calling task for the whole transfer and keep no
//! state between calls. The connection is assumed to deliver in order without
//! duplication; the receiver rejects anything else rather than repairing it.
//!
//! [`Connection`]: crate::connection::Connection

mod recv;
mod send;

pub use recv::{recv, recv_with_first};
pub use send::send;
pub(crate) use send::check_mtu;
