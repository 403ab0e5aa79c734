use super::BackingStore;
use crate::error::{Result, StreamError};

/// A growable, write-only-in-spirit backing store for serialization
/// scenarios where the final size isn't known up front.
///
/// Unlike [`super::MemoryStore`], `seek` accepts any position and `write_n`
/// extends the buffer (zero-filling the gap) rather than failing.
#[derive(Debug, Default, Clone)]
pub struct SinkStore {
    data: Vec<u8>,
    pos: u64,
}

impl SinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BackingStore for SinkStore {
    fn pos(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        self.pos = pos;
        Ok(())
    }

    fn read_n(&mut self, n: u64) -> Result<Vec<u8>> {
        let end = self.pos.checked_add(n).ok_or_else(|| {
            StreamError::eos(self.pos, n, self.size().saturating_sub(self.pos))
        })?;
        if end > self.size() {
            return Err(StreamError::eos(
                self.pos,
                n,
                self.size().saturating_sub(self.pos),
            ));
        }
        let out = self.data[self.pos as usize..end as usize].to_vec();
        self.pos = end;
        Ok(out)
    }

    fn write_n(&mut self, bytes: &[u8]) -> Result<()> {
        let start = self.pos as usize;
        if start > self.data.len() {
            self.data.resize(start, 0);
        }
        let end = start + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(bytes);
        self.pos = end as u64;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn to_byte_array(&self) -> Vec<u8> {
        self.data.clone()
    }
}
