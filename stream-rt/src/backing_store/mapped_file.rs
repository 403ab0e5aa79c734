use super::{check_bounds, BackingStore};
use crate::error::{Result, StreamError};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::Path;

/// A read-only, memory-mapped file backing store.
///
/// Grounded in the pack's `bsa-rs` reference (`other_examples`), which wraps
/// `memmap2::{Mmap, MmapOptions}` behind the same kind of bounded-read
/// `Source` trait this crate's `BackingStore` plays here.
#[derive(Debug)]
pub struct MappedFileStore {
    mmap: Mmap,
    pos: u64,
}

impl MappedFileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        // Safety: the mapped file must not be modified by another process
        // for the lifetime of this mapping; this is the standard caveat of
        // `memmap2` and is accepted by callers of this constructor.
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        Ok(Self { mmap, pos: 0 })
    }
}

impl BackingStore for MappedFileStore {
    fn pos(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> u64 {
        self.mmap.len() as u64
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        check_bounds(pos, 0, self.size())?;
        self.pos = pos;
        Ok(())
    }

    fn read_n(&mut self, n: u64) -> Result<Vec<u8>> {
        check_bounds(self.pos, n, self.size())?;
        let start = self.pos as usize;
        let end = start + n as usize;
        let out = self.mmap[start..end].to_vec();
        self.pos += n;
        Ok(out)
    }

    fn write_n(&mut self, _bytes: &[u8]) -> Result<()> {
        Err(StreamError::UnsupportedOperation(
            "memory-mapped file backing store is read-only".into(),
        ))
    }

    fn close(&mut self) -> Result<()> {
        // `Mmap` unmaps on drop; unmapping failures are not surfaced by
        // memmap2, and that's acceptable per spec.md §4.1.
        Ok(())
    }

    fn to_byte_array(&self) -> Vec<u8> {
        self.mmap.to_vec()
    }
}
