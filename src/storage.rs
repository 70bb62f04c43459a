//! Storage capabilities feeding and draining transfers.
//!
//! The engine never assumes the transferred bytes live in addressable memory.
//! Senders pull chunks through [`ReadStorage`] and receivers push chunks
//! through [`WriteStorage`], so data may come from flash, files, or be
//! generated on the fly.
//!
//! Both capabilities report how many bytes they handled. Anything other than
//! the requested size aborts the transfer; there are no partial retries.

use std::{
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
};

use log::warn;

/// Source of outbound transfer data.
#[cfg_attr(test, mockall::automock)]
pub trait ReadStorage {
    /// Fill `buf` with the bytes starting at `offset`.
    ///
    /// Must return `buf.len()` on success; any other value ends the transfer.
    fn read(&mut self, buf: &mut [u8], offset: u32) -> usize;
}

/// Destination for inbound transfer data.
#[cfg_attr(test, mockall::automock)]
pub trait WriteStorage {
    /// Store `data` at `offset`. `total_size` is the size of the whole
    /// transfer, passed on every call so the sink can pre-allocate or check
    /// bounds.
    ///
    /// Must return `data.len()` on success; any other value ends the transfer.
    fn write(&mut self, data: &[u8], offset: u32, total_size: u32) -> usize;
}

impl<T: ReadStorage + ?Sized> ReadStorage for &mut T {
    fn read(&mut self, buf: &mut [u8], offset: u32) -> usize { (**self).read(buf, offset) }
}

impl<T: WriteStorage + ?Sized> WriteStorage for &mut T {
    fn write(&mut self, data: &[u8], offset: u32, total_size: u32) -> usize {
        (**self).write(data, offset, total_size)
    }
}

fn span(offset: u32, len: usize) -> Option<(usize, usize)> {
    let start = usize::try_from(offset).ok()?;
    Some((start, start.checked_add(len)?))
}

/// Reads from a borrowed byte slice.
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
}

impl<'a> SliceSource<'a> {
    /// Serve reads from `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self { Self { data } }
}

impl ReadStorage for SliceSource<'_> {
    fn read(&mut self, buf: &mut [u8], offset: u32) -> usize {
        let Some((start, end)) = span(offset, buf.len()) else {
            return 0;
        };
        match self.data.get(start..end) {
            Some(chunk) => {
                buf.copy_from_slice(chunk);
                chunk.len()
            }
            None => 0,
        }
    }
}

/// Collects a transfer into a growable buffer.
///
/// The buffer grows as writes arrive, never past the declared total. A
/// declared total above the sink's limit refuses every write, so a peer
/// cannot make the sink reserve memory it announced but never sent.
#[derive(Clone, Debug)]
pub struct VecSink {
    data: Vec<u8>,
    limit: usize,
}

impl VecSink {
    /// Largest declared total accepted by [`VecSink::new`].
    pub const DEFAULT_LIMIT: usize = 64 * 1024 * 1024;

    /// Create an empty sink accepting totals up to [`Self::DEFAULT_LIMIT`].
    #[must_use]
    pub const fn new() -> Self { Self::with_limit(Self::DEFAULT_LIMIT) }

    /// Create an empty sink accepting totals up to `limit` bytes.
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    /// Largest declared total this sink accepts.
    #[must_use]
    pub const fn limit(&self) -> usize { self.limit }

    /// Bytes written so far, up to the furthest write.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.data }

    /// Consume the sink, returning its buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> { self.data }
}

impl Default for VecSink {
    fn default() -> Self { Self::new() }
}

impl WriteStorage for VecSink {
    fn write(&mut self, data: &[u8], offset: u32, total_size: u32) -> usize {
        let Ok(total) = usize::try_from(total_size) else {
            return 0;
        };
        if total > self.limit {
            warn!("refusing transfer of {total} bytes: sink limit is {}", self.limit);
            return 0;
        }
        let Some((start, end)) = span(offset, data.len()) else {
            return 0;
        };
        if end > total {
            return 0;
        }
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        match self.data.get_mut(start..end) {
            Some(slot) => {
                slot.copy_from_slice(data);
                data.len()
            }
            None => 0,
        }
    }
}

/// Reads transfer data from a file.
#[derive(Debug)]
pub struct FileSource {
    file: File,
}

impl FileSource {
    /// Serve reads from `file`, addressed from its start.
    #[must_use]
    pub fn new(file: File) -> Self { Self { file } }
}

impl ReadStorage for FileSource {
    fn read(&mut self, buf: &mut [u8], offset: u32) -> usize {
        let result = self
            .file
            .seek(SeekFrom::Start(u64::from(offset)))
            .and_then(|_| self.file.read_exact(buf));
        match result {
            Ok(()) => buf.len(),
            Err(err) => {
                warn!("file read failed: offset={offset}, len={}, error={err}", buf.len());
                0
            }
        }
    }
}

/// Writes transfer data into a file.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    /// Store writes in `file`, addressed from its start.
    #[must_use]
    pub fn new(file: File) -> Self { Self { file } }

    /// Consume the sink, returning the file handle.
    #[must_use]
    pub fn into_inner(self) -> File { self.file }
}

impl WriteStorage for FileSink {
    fn write(&mut self, data: &[u8], offset: u32, _total_size: u32) -> usize {
        let result = self
            .file
            .seek(SeekFrom::Start(u64::from(offset)))
            .and_then(|_| self.file.write_all(data));
        match result {
            Ok(()) => data.len(),
            Err(err) => {
                warn!("file write failed: offset={offset}, len={}, error={err}", data.len());
                0
            }
        }
    }
}

/// Adapts a closure into a [`ReadStorage`], for generated content.
///
/// # Examples
///
/// ```
/// use sfp::storage::{FnSource, ReadStorage};
///
/// let mut counter = FnSource::new(|buf: &mut [u8], offset: u32| {
///     for (i, byte) in buf.iter_mut().enumerate() {
///         *byte = (offset as usize + i) as u8;
///     }
///     buf.len()
/// });
/// let mut buf = [0_u8; 3];
/// assert_eq!(counter.read(&mut buf, 5), 3);
/// assert_eq!(buf, [5, 6, 7]);
/// ```
#[derive(Clone, Debug)]
pub struct FnSource<F> {
    read: F,
}

impl<F> FnSource<F>
where
    F: FnMut(&mut [u8], u32) -> usize,
{
    /// Wrap `read`.
    pub const fn new(read: F) -> Self { Self { read } }
}

impl<F> ReadStorage for FnSource<F>
where
    F: FnMut(&mut [u8], u32) -> usize,
{
    fn read(&mut self, buf: &mut [u8], offset: u32) -> usize { (self.read)(buf, offset) }
}

/// Adapts a closure into a [`WriteStorage`].
#[derive(Clone, Debug)]
pub struct FnSink<F> {
    write: F,
}

impl<F> FnSink<F>
where
    F: FnMut(&[u8], u32, u32) -> usize,
{
    /// Wrap `write`.
    pub const fn new(write: F) -> Self { Self { write } }
}

impl<F> WriteStorage for FnSink<F>
where
    F: FnMut(&[u8], u32, u32) -> usize,
{
    fn write(&mut self, data: &[u8], offset: u32, total_size: u32) -> usize {
        (self.write)(data, offset, total_size)
    }
}
