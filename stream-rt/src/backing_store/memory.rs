use super::{check_bounds, BackingStore};
use crate::error::Result;

/// A fixed-size, in-memory backing store.
///
/// Not grounded in the teacher, which has no such type; `Cursor` appears
/// only in the unrelated pack repo `alexcrichton-io2`
/// (`tests/mem.rs`), not in `ruffle-rs-h263-rs`, so this is derived from
/// spec.md §4.1 directly rather than imitating either. Bounded: writes past
/// the end fail with `EndOfStream` rather than growing. Use
/// [`super::SinkStore`] when growth-on-write is needed.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    data: Vec<u8>,
    pos: u64,
}

impl MemoryStore {
    /// Wrap an existing byte buffer, read-write, bounded to its current
    /// length.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            data: bytes.into(),
            pos: 0,
        }
    }

    /// Allocate a zero-filled buffer of exactly `n` bytes.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            data: vec![0u8; n],
            pos: 0,
        }
    }
}

impl BackingStore for MemoryStore {
    fn pos(&self) -> u64 {
        self.pos
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
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
        let out = self.data[start..end].to_vec();
        self.pos += n;
        Ok(out)
    }

    fn write_n(&mut self, bytes: &[u8]) -> Result<()> {
        check_bounds(self.pos, bytes.len() as u64, self.size())?;
        let start = self.pos as usize;
        let end = start + bytes.len();
        self.data[start..end].copy_from_slice(bytes);
        self.pos += bytes.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn to_byte_array(&self) -> Vec<u8> {
        self.data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_write_past_end_fails() {
        let mut store = MemoryStore::with_capacity(4);
        store.seek(2).unwrap();
        store.write_n(&[1, 2]).unwrap();
        assert!(store.write_n(&[3]).is_err());
    }

    #[test]
    fn read_and_seek_round_trip() {
        let mut store = MemoryStore::from_bytes(vec![1, 2, 3, 4, 5]);
        assert_eq!(store.read_n(2).unwrap(), vec![1, 2]);
        store.seek(0).unwrap();
        assert_eq!(store.read_n(5).unwrap(), vec![1, 2, 3, 4, 5]);
        assert!(store.read_n(1).is_err());
    }
}
