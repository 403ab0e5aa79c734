use super::{check_bounds, BackingStore};
use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A random-access file backing store.
///
/// Sized at open time; like [`super::MemoryStore`], writes past the
/// original file length are rejected rather than silently extending the
/// file (use [`super::SinkStore`] plus a final write-back for serialization
/// of unknown-size output).
#[derive(Debug)]
pub struct FileStore {
    file: File,
    pos: u64,
    size: u64,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, pos: 0, size })
    }
}

impl BackingStore for FileStore {
    fn pos(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        check_bounds(pos, 0, self.size)?;
        self.file.seek(SeekFrom::Start(pos))?;
        self.pos = pos;
        Ok(())
    }

    fn read_n(&mut self, n: u64) -> Result<Vec<u8>> {
        check_bounds(self.pos, n, self.size)?;
        let mut buf = vec![0u8; n as usize];
        self.file.read_exact(&mut buf)?;
        self.pos += n;
        Ok(buf)
    }

    fn write_n(&mut self, bytes: &[u8]) -> Result<()> {
        check_bounds(self.pos, bytes.len() as u64, self.size)?;
        self.file.write_all(bytes)?;
        self.pos += bytes.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // Best-effort: a failed flush must not prevent us from reporting
        // whatever error the caller already encountered, but if nothing
        // else failed this surfaces I/O errors on close.
        self.file.flush()?;
        Ok(())
    }

    fn to_byte_array(&self) -> Vec<u8> {
        let mut clone = match self.file.try_clone() {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };
        let mut buf = Vec::with_capacity(self.size as usize);
        if clone.seek(SeekFrom::Start(0)).is_ok() {
            let _ = clone.read_to_end(&mut buf);
        }
        buf
    }
}
