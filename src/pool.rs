//! Bounded allocator for transport packets.
//!
//! Every [`Packet`] handed out by a [`BufferPool`] holds a lease on one of the
//! pool's slots. The lease travels with the packet, through a channel if need
//! be, and returns the slot when the packet is dropped, so the owner of a
//! packet is always the party responsible for releasing it.

use std::{
    num::NonZeroUsize,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::packet::Packet;

#[derive(Debug)]
struct PoolState {
    buffer_size: usize,
    capacity: usize,
    leased: AtomicUsize,
}

/// Shared, fixed-size packet pool.
///
/// Clones share the same slots.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use sfp::pool::BufferPool;
///
/// let pool = BufferPool::new(
///     NonZeroUsize::new(64).expect("non-zero"),
///     NonZeroUsize::new(1).expect("non-zero"),
/// );
/// let packet = pool.get().expect("one buffer available");
/// assert!(pool.get().is_none());
/// drop(packet);
/// assert_eq!(pool.available(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct BufferPool {
    state: Arc<PoolState>,
}

impl BufferPool {
    /// Create a pool of `capacity` buffers of `buffer_size` bytes each.
    #[must_use]
    pub fn new(buffer_size: NonZeroUsize, capacity: NonZeroUsize) -> Self {
        Self {
            state: Arc::new(PoolState {
                buffer_size: buffer_size.get(),
                capacity: capacity.get(),
                leased: AtomicUsize::new(0),
            }),
        }
    }

    /// Lease an empty packet, or `None` when every buffer is in use.
    #[must_use]
    pub fn get(&self) -> Option<Packet> {
        let capacity = self.state.capacity;
        self.state
            .leased
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |leased| {
                (leased < capacity).then_some(leased + 1)
            })
            .ok()?;
        let lease = Lease {
            state: Arc::clone(&self.state),
        };
        Some(Packet::leased(self.state.buffer_size, lease))
    }

    /// Size in bytes of every buffer in the pool.
    #[must_use]
    pub fn buffer_size(&self) -> usize { self.state.buffer_size }

    /// Total number of buffers.
    #[must_use]
    pub fn capacity(&self) -> usize { self.state.capacity }

    /// Buffers not currently leased.
    #[must_use]
    pub fn available(&self) -> usize {
        self.state
            .capacity
            .saturating_sub(self.state.leased.load(Ordering::Acquire))
    }
}

/// Claim on one pool slot, released on drop.
#[derive(Debug)]
pub(crate) struct Lease {
    state: Arc<PoolState>,
}

impl Drop for Lease {
    fn drop(&mut self) { self.state.leased.fetch_sub(1, Ordering::AcqRel); }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(buffer_size: usize, capacity: usize) -> BufferPool {
        BufferPool::new(
            NonZeroUsize::new(buffer_size).expect("non-zero buffer size"),
            NonZeroUsize::new(capacity).expect("non-zero capacity"),
        )
    }

    #[test]
    fn packets_have_pool_buffer_size() {
        let pool = pool(32, 2);
        let packet = pool.get().expect("buffer available");
        assert_eq!(packet.capacity(), 32);
        assert!(packet.is_empty());
    }

    #[test]
    fn exhausted_pool_recovers_when_packets_drop() {
        let pool = pool(8, 2);
        let first = pool.get().expect("first buffer");
        let second = pool.get().expect("second buffer");
        assert!(pool.get().is_none());
        assert_eq!(pool.available(), 0);

        drop(first);
        assert_eq!(pool.available(), 1);
        let third = pool.get().expect("released buffer reused");
        drop((second, third));
        assert_eq!(pool.available(), pool.capacity());
    }

    #[test]
    fn clones_share_slots() {
        let pool = pool(8, 1);
        let clone = pool.clone();
        let _held = clone.get().expect("buffer");
        assert!(pool.get().is_none());
    }
}
