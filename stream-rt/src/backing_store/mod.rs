//! Byte container abstraction underneath every [`crate::stream::Stream`].
//!
//! The teacher (`ruffle-rs-h263-rs`) has no seekable/writable backing-store
//! abstraction of its own — `H263Reader<R: Read>` is forward-only over a
//! single generic reader, with no write path or bounded-view concept. This
//! trait is derived from spec.md §4.1/§9 directly: one object-safe
//! interface so a `Stream` can hold any backing store behind a single
//! `Box<dyn BackingStore>` without becoming generic over it, the way
//! spec.md §9's "dual inheritance → interface + variants" note asks for.

mod file;
mod memory;
mod sink;

#[cfg(feature = "mmap")]
mod mapped_file;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sink::SinkStore;

#[cfg(feature = "mmap")]
pub use mapped_file::MappedFileStore;

use crate::error::{Result, StreamError};

/// A seekable, bounded-or-growable byte container.
///
/// Implementors own their bytes exclusively, except for the read-only
/// `MappedFileStore`, which only ever lends out copies via `read_n`.
pub trait BackingStore: std::fmt::Debug {
    /// Current cursor position.
    fn pos(&self) -> u64;

    /// Total number of addressable bytes. For [`SinkStore`] this grows as
    /// data is written past the current end.
    fn size(&self) -> u64;

    /// Move the cursor to an absolute position.
    ///
    /// Fixed-size stores reject `pos > size()`. [`SinkStore`] accepts any
    /// position; the gap is zero-filled on the next write.
    fn seek(&mut self, pos: u64) -> Result<()>;

    /// Read exactly `n` bytes at the cursor, advancing it by `n`.
    fn read_n(&mut self, n: u64) -> Result<Vec<u8>>;

    /// Write `bytes` at the cursor, advancing it by `bytes.len()`.
    fn write_n(&mut self, bytes: &[u8]) -> Result<()>;

    /// Release any OS resources. Best-effort; must not be skipped on error
    /// paths by the caller even if a prior operation failed.
    fn close(&mut self) -> Result<()>;

    /// Materialize the entire contents of the store as an owned buffer.
    fn to_byte_array(&self) -> Vec<u8>;

    /// Whether the cursor has reached the end of addressable bytes.
    fn is_eof(&self) -> bool {
        self.pos() >= self.size()
    }
}

pub(crate) fn check_bounds(pos: u64, n: u64, size: u64) -> Result<()> {
    let end = pos.checked_add(n).ok_or_else(|| StreamError::eos(pos, n, size.saturating_sub(pos)))?;
    if end > size {
        return Err(StreamError::eos(pos, n, size.saturating_sub(pos)));
    }
    Ok(())
}
