//! The central cursor type: [`Stream`] ties a [`BackingStore`] trait object
//! together with a [`BitAccumulator`] to give generated parser/serializer
//! code one seekable, dual-mode view over bytes and bits.
//!
//! Mirrors the teacher's `H263Reader` (`h263/src/read.rs`, also duplicated
//! under `parser/reader.rs` and `decoder/reader.rs`), which also pairs a
//! byte source with a bit-residue accumulator behind `read_bits` and
//! `read_u8` — generalized here to cover both directions (read and write)
//! and arbitrary backing stores rather than one fixed `&[u8]` bitstream.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::path::Path;

use crate::backing_store::{BackingStore, FileStore, MemoryStore, SinkStore};
use crate::bits::{BitAccumulator, BitMode, BitOrder};
use crate::error::{Result, StreamError};

#[cfg(feature = "mmap")]
use crate::backing_store::MappedFileStore;

/// A seekable, dual-mode (read or write) stream over some [`BackingStore`].
///
/// Holds exactly one byte's worth of bit residue (via [`BitAccumulator`]) and
/// a list of child streams carved out for deferred write-back (§4.5).
#[derive(Debug)]
pub struct Stream {
    store: Box<dyn BackingStore>,
    bits: BitAccumulator,
    pending_children: Vec<PendingChild>,
}

#[derive(Debug)]
struct PendingChild {
    offset: u64,
    stream: Stream,
}

impl Stream {
    fn new(store: Box<dyn BackingStore>) -> Self {
        Self {
            store,
            bits: BitAccumulator::new(),
            pending_children: Vec::new(),
        }
    }

    // -- constructors ------------------------------------------------

    /// Open a random-access file, read-write, sized at its current length.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Box::new(FileStore::open(path)?)))
    }

    /// Wrap an existing byte buffer, read-write, bounded to its length.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Box::new(MemoryStore::from_bytes(bytes)))
    }

    /// Concatenate several byte slices into one bounded, read-write buffer.
    pub fn from_byte_list(parts: &[&[u8]]) -> Self {
        let mut data = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
        for part in parts {
            data.extend_from_slice(part);
        }
        Self::from_bytes(data)
    }

    /// Allocate a zero-filled, fixed-size buffer of `n` bytes to write into.
    pub fn with_capacity(n: usize) -> Self {
        Self::new(Box::new(MemoryStore::with_capacity(n)))
    }

    /// A growable, append-only buffer for serialization of unknown-size
    /// output (§4.1's `SinkStore`).
    pub fn new_sink() -> Self {
        Self::new(Box::new(SinkStore::new()))
    }

    /// Memory-map a file, read-only.
    #[cfg(feature = "mmap")]
    pub fn from_mapped_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Box::new(MappedFileStore::open(path)?)))
    }

    // -- cursor --------------------------------------------------------

    pub fn pos(&self) -> u64 {
        self.store.pos()
    }

    pub fn size(&self) -> u64 {
        self.store.size()
    }

    pub fn is_eof(&self) -> bool {
        self.bits.left() == 0 && self.store.is_eof()
    }

    pub fn seek(&mut self, pos: u64) -> Result<()> {
        self.enter_byte_mode()?;
        self.store.seek(pos)
    }

    /// Release the backing store's resources.
    ///
    /// Goes through [`Stream::enter_byte_mode`] rather than calling
    /// [`BitAccumulator::take_write_padding`] directly: `enter_byte_mode`
    /// is the one place that knows whether the pending residue is
    /// read-mode (discard, nothing to write) or write-mode (flush a
    /// zero-padded byte) — closing after a partial *read*-mode bit read
    /// must not write anything to the backing store. Any pending
    /// write-mode residue is still flushed even if the backing store's
    /// own close then fails — the pad-byte write is attempted
    /// unconditionally rather than skipped on an error path. If both the
    /// flush and the store's `close` fail, the close error is reported
    /// primary with the flush error attached as suppressed context
    /// (spec.md §5), rather than silently dropping one of them.
    pub fn close(&mut self) -> Result<()> {
        let flush_result = self.enter_byte_mode();
        let close_result = self.store.close();
        match (flush_result, close_result) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(flush_err), Ok(())) => Err(flush_err),
            (Ok(()), Err(close_err)) => Err(close_err),
            (Err(flush_err), Err(close_err)) => Err(StreamError::Close {
                source: Box::new(close_err),
                suppressed: Box::new(flush_err),
            }),
        }
    }

    /// Materialize the entire backing store's contents.
    pub fn to_byte_array(&self) -> Vec<u8> {
        self.store.to_byte_array()
    }

    /// An independent, read-only snapshot of this stream's current backing
    /// bytes, positioned at the start.
    ///
    /// Diverges deliberately from a shared-memory child: Rust's ownership
    /// rules make an aliased, mutable-parent/immutable-child relationship
    /// impractical behind a `Box<dyn BackingStore>`, so this returns an
    /// owned copy instead. See DESIGN.md.
    pub fn as_readonly_view(&self) -> Stream {
        Stream::from_bytes(self.store.to_byte_array())
    }

    // -- bit/byte mode transition ---------------------------------------

    /// Align to a byte boundary before any byte-level operation, discarding
    /// unread bit residue (read mode) or flushing a zero-padded partial byte
    /// (write mode). A no-op if already byte-aligned.
    fn enter_byte_mode(&mut self) -> Result<()> {
        match self.bits.mode() {
            Some(BitMode::Read) => {
                self.bits.discard();
                Ok(())
            }
            Some(BitMode::Write) => {
                if let Some(pad) = self.bits.take_write_padding() {
                    self.store.write_n(&[pad])?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Explicit read-mode alignment (generated code calls this between a run
    /// of bit reads and the next byte-level field).
    pub fn align_to_byte(&mut self) -> Result<()> {
        self.enter_byte_mode()
    }

    /// Explicit write-mode alignment, flushing any partial byte.
    pub fn write_align_to_byte(&mut self) -> Result<()> {
        self.enter_byte_mode()
    }

    // -- bit-level ints ---------------------------------------------------

    /// Align away any leftover bit residue that was produced under a
    /// different order or mode than the op about to run, per spec.md
    /// §4.3 ("switching bit order between successive bit reads or
    /// crossing from one read/write mode to another implicitly calls
    /// alignToByte/writeAlignToByte"). A no-op when the accumulator is
    /// already empty or already matches `order`/`mode`.
    fn align_for_bit_op(&mut self, order: BitOrder, mode: BitMode) -> Result<()> {
        let order_changed = self.bits.order().map_or(false, |o| o != order);
        let mode_changed = self.bits.mode().map_or(false, |m| m != mode);
        if order_changed || mode_changed {
            self.enter_byte_mode()?;
        }
        Ok(())
    }

    pub fn read_bits_int_be(&mut self, n: u32) -> Result<u64> {
        self.align_for_bit_op(BitOrder::Be, BitMode::Read)?;
        let Stream { store, bits, .. } = self;
        bits.read_be(n, || store.read_n(1).map(|b| b[0]))
    }

    pub fn read_bits_int_le(&mut self, n: u32) -> Result<u64> {
        self.align_for_bit_op(BitOrder::Le, BitMode::Read)?;
        let Stream { store, bits, .. } = self;
        bits.read_le(n, || store.read_n(1).map(|b| b[0]))
    }

    pub fn write_bits_int_be(&mut self, n: u32, value: u64) -> Result<()> {
        self.align_for_bit_op(BitOrder::Be, BitMode::Write)?;
        let Stream { store, bits, .. } = self;
        bits.write_be(n, value, |byte| store.write_n(&[byte]))
    }

    pub fn write_bits_int_le(&mut self, n: u32, value: u64) -> Result<()> {
        self.align_for_bit_op(BitOrder::Le, BitMode::Write)?;
        let Stream { store, bits, .. } = self;
        bits.write_le(n, value, |byte| store.write_n(&[byte]))
    }

    // -- primitive byte codec --------------------------------------------

    fn read_primitive<T>(
        &mut self,
        width: usize,
        f: impl FnOnce(&mut &[u8]) -> std::io::Result<T>,
    ) -> Result<T> {
        self.enter_byte_mode()?;
        let bytes = self.store.read_n(width as u64)?;
        let mut slice = &bytes[..];
        Ok(f(&mut slice)?)
    }

    fn write_primitive(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.enter_byte_mode()?;
        self.store.write_n(&bytes)
    }

    pub fn read_u1(&mut self) -> Result<u8> {
        self.read_primitive(1, |s| s.read_u8())
    }

    pub fn read_s1(&mut self) -> Result<i8> {
        self.read_primitive(1, |s| s.read_i8())
    }

    pub fn write_u1(&mut self, v: u8) -> Result<()> {
        self.write_primitive(vec![v])
    }

    pub fn write_s1(&mut self, v: i8) -> Result<()> {
        self.write_primitive(vec![v as u8])
    }

    pub fn read_u2be(&mut self) -> Result<u16> {
        self.read_primitive(2, |s| s.read_u16::<BigEndian>())
    }
    pub fn read_u2le(&mut self) -> Result<u16> {
        self.read_primitive(2, |s| s.read_u16::<LittleEndian>())
    }
    pub fn read_s2be(&mut self) -> Result<i16> {
        self.read_primitive(2, |s| s.read_i16::<BigEndian>())
    }
    pub fn read_s2le(&mut self) -> Result<i16> {
        self.read_primitive(2, |s| s.read_i16::<LittleEndian>())
    }

    pub fn write_u2be(&mut self, v: u16) -> Result<()> {
        let mut buf = Vec::with_capacity(2);
        buf.write_u16::<BigEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_u2le(&mut self, v: u16) -> Result<()> {
        let mut buf = Vec::with_capacity(2);
        buf.write_u16::<LittleEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_s2be(&mut self, v: i16) -> Result<()> {
        let mut buf = Vec::with_capacity(2);
        buf.write_i16::<BigEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_s2le(&mut self, v: i16) -> Result<()> {
        let mut buf = Vec::with_capacity(2);
        buf.write_i16::<LittleEndian>(v)?;
        self.write_primitive(buf)
    }

    pub fn read_u4be(&mut self) -> Result<u32> {
        self.read_primitive(4, |s| s.read_u32::<BigEndian>())
    }
    pub fn read_u4le(&mut self) -> Result<u32> {
        self.read_primitive(4, |s| s.read_u32::<LittleEndian>())
    }
    pub fn read_s4be(&mut self) -> Result<i32> {
        self.read_primitive(4, |s| s.read_i32::<BigEndian>())
    }
    pub fn read_s4le(&mut self) -> Result<i32> {
        self.read_primitive(4, |s| s.read_i32::<LittleEndian>())
    }

    pub fn write_u4be(&mut self, v: u32) -> Result<()> {
        let mut buf = Vec::with_capacity(4);
        buf.write_u32::<BigEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_u4le(&mut self, v: u32) -> Result<()> {
        let mut buf = Vec::with_capacity(4);
        buf.write_u32::<LittleEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_s4be(&mut self, v: i32) -> Result<()> {
        let mut buf = Vec::with_capacity(4);
        buf.write_i32::<BigEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_s4le(&mut self, v: i32) -> Result<()> {
        let mut buf = Vec::with_capacity(4);
        buf.write_i32::<LittleEndian>(v)?;
        self.write_primitive(buf)
    }

    pub fn read_u8be(&mut self) -> Result<u64> {
        self.read_primitive(8, |s| s.read_u64::<BigEndian>())
    }
    pub fn read_u8le(&mut self) -> Result<u64> {
        self.read_primitive(8, |s| s.read_u64::<LittleEndian>())
    }
    pub fn read_s8be(&mut self) -> Result<i64> {
        self.read_primitive(8, |s| s.read_i64::<BigEndian>())
    }
    pub fn read_s8le(&mut self) -> Result<i64> {
        self.read_primitive(8, |s| s.read_i64::<LittleEndian>())
    }

    pub fn write_u8be(&mut self, v: u64) -> Result<()> {
        let mut buf = Vec::with_capacity(8);
        buf.write_u64::<BigEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_u8le(&mut self, v: u64) -> Result<()> {
        let mut buf = Vec::with_capacity(8);
        buf.write_u64::<LittleEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_s8be(&mut self, v: i64) -> Result<()> {
        let mut buf = Vec::with_capacity(8);
        buf.write_i64::<BigEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_s8le(&mut self, v: i64) -> Result<()> {
        let mut buf = Vec::with_capacity(8);
        buf.write_i64::<LittleEndian>(v)?;
        self.write_primitive(buf)
    }

    pub fn read_f4be(&mut self) -> Result<f32> {
        self.read_primitive(4, |s| s.read_f32::<BigEndian>())
    }
    pub fn read_f4le(&mut self) -> Result<f32> {
        self.read_primitive(4, |s| s.read_f32::<LittleEndian>())
    }
    pub fn write_f4be(&mut self, v: f32) -> Result<()> {
        let mut buf = Vec::with_capacity(4);
        buf.write_f32::<BigEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_f4le(&mut self, v: f32) -> Result<()> {
        let mut buf = Vec::with_capacity(4);
        buf.write_f32::<LittleEndian>(v)?;
        self.write_primitive(buf)
    }

    pub fn read_f8be(&mut self) -> Result<f64> {
        self.read_primitive(8, |s| s.read_f64::<BigEndian>())
    }
    pub fn read_f8le(&mut self) -> Result<f64> {
        self.read_primitive(8, |s| s.read_f64::<LittleEndian>())
    }
    pub fn write_f8be(&mut self, v: f64) -> Result<()> {
        let mut buf = Vec::with_capacity(8);
        buf.write_f64::<BigEndian>(v)?;
        self.write_primitive(buf)
    }
    pub fn write_f8le(&mut self, v: f64) -> Result<()> {
        let mut buf = Vec::with_capacity(8);
        buf.write_f64::<LittleEndian>(v)?;
        self.write_primitive(buf)
    }

    // -- byte-array reads -------------------------------------------------

    pub fn read_bytes(&mut self, n: u64) -> Result<Vec<u8>> {
        self.enter_byte_mode()?;
        self.store.read_n(n)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.enter_byte_mode()?;
        self.store.write_n(bytes)
    }

    /// Read every remaining byte to the end of the store.
    pub fn read_bytes_full(&mut self) -> Result<Vec<u8>> {
        self.enter_byte_mode()?;
        let remaining = self.store.size().saturating_sub(self.store.pos());
        self.store.read_n(remaining)
    }

    /// Read bytes up to the first occurrence of `term`.
    ///
    /// `include_term` keeps the terminator in the returned bytes;
    /// `consume_term` advances the cursor past it (otherwise the cursor is
    /// left immediately before it, so it can be read again). If EOF is
    /// reached with no match, `eos_error` decides between an error and
    /// returning everything read so far.
    pub fn read_bytes_term(
        &mut self,
        term: u8,
        include_term: bool,
        consume_term: bool,
        eos_error: bool,
    ) -> Result<Vec<u8>> {
        self.enter_byte_mode()?;
        let mut result = Vec::new();
        loop {
            if self.store.is_eof() {
                if eos_error {
                    return Err(StreamError::eos(self.store.pos(), 1, 0));
                }
                return Ok(result);
            }
            let byte = self.store.read_n(1)?[0];
            if byte == term {
                if include_term {
                    result.push(byte);
                }
                if !consume_term {
                    self.store.seek(self.store.pos() - 1)?;
                }
                return Ok(result);
            }
            result.push(byte);
        }
    }

    /// Read bytes up to the first occurrence of the byte sequence `term`.
    ///
    /// Unlike [`Stream::read_bytes_term`], an EOF that interrupts a
    /// mid-pattern match still returns the partial bytes already read rather
    /// than only the bytes strictly before any possible match start; this
    /// mirrors how a byte-at-a-time scan would have consumed them.
    pub fn read_bytes_term_multi(
        &mut self,
        term: &[u8],
        include_term: bool,
        consume_term: bool,
        eos_error: bool,
    ) -> Result<Vec<u8>> {
        self.enter_byte_mode()?;
        let start = self.store.pos();
        let remaining = self.store.size().saturating_sub(start);
        let buf = self.store.read_n(remaining)?;

        let found = if term.is_empty() {
            None
        } else {
            buf.windows(term.len()).position(|w| w == term)
        };

        match found {
            Some(i) => {
                let result_len = if include_term { i + term.len() } else { i };
                let result = buf[..result_len].to_vec();
                let consumed_len = if consume_term { i + term.len() } else { i };
                self.store.seek(start + consumed_len as u64)?;
                Ok(result)
            }
            None if eos_error => Err(StreamError::eos(start + buf.len() as u64, term.len() as u64, 0)),
            None => Ok(buf),
        }
    }

    /// Read exactly `expected.len()` bytes and fail with
    /// [`StreamError::UnexpectedFixedContent`] if they don't match.
    pub fn ensure_fixed_contents(&mut self, expected: &[u8]) -> Result<Vec<u8>> {
        let pos = self.pos();
        let actual = self.read_bytes(expected.len() as u64)?;
        if actual != expected {
            return Err(StreamError::UnexpectedFixedContent {
                pos,
                actual,
                expected: expected.to_vec(),
            });
        }
        Ok(actual)
    }

    // -- substreams & write-back ------------------------------------------

    /// Carve out a read-only child stream over the next `n` bytes,
    /// advancing this stream's cursor past them.
    pub fn substream(&mut self, n: u64) -> Result<Stream> {
        let bytes = self.read_bytes(n)?;
        Ok(Stream::from_bytes(bytes))
    }

    /// Create an independent, growable stream for a field whose size isn't
    /// known until its contents are serialized. Register it with
    /// [`Stream::add_child_stream`] once filled so [`Stream::write_back_child_streams`]
    /// can splice its bytes back into this stream at `offset`.
    pub fn new_write_substream() -> Stream {
        Stream::new_sink()
    }

    /// Register a filled child stream to be written back at `offset` when
    /// [`Stream::write_back_child_streams`] runs.
    pub fn add_child_stream(&mut self, offset: u64, child: Stream) {
        self.pending_children.push(PendingChild { offset, stream: child });
    }

    /// Recursively flush every registered child stream's bytes into this
    /// stream at its recorded offset, depth-first so nested children are
    /// resolved before their parent's bytes are written.
    pub fn write_back_child_streams(&mut self) -> Result<()> {
        let children = std::mem::take(&mut self.pending_children);
        for mut child in children {
            child.stream.write_back_child_streams()?;
            let bytes = child.stream.to_byte_array();
            self.seek(child.offset)?;
            self.write_bytes(&bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_round_trip_be_le() {
        let mut s = Stream::with_capacity(20);
        s.write_u4be(0xDEADBEEF).unwrap();
        s.write_u4le(0xDEADBEEF).unwrap();
        s.write_s2be(-1).unwrap();
        s.write_f8be(1.5).unwrap();
        s.seek(0).unwrap();
        assert_eq!(s.read_u4be().unwrap(), 0xDEADBEEF);
        assert_eq!(s.read_u4le().unwrap(), 0xDEADBEEF);
        assert_eq!(s.read_s2be().unwrap(), -1);
        assert_eq!(s.read_f8be().unwrap(), 1.5);
    }

    #[test]
    fn bit_then_byte_read_auto_aligns() {
        let mut s = Stream::from_bytes(vec![0b1010_0000, 0xFF]);
        assert_eq!(s.read_bits_int_be(4).unwrap(), 0b1010);
        // 4 bits of residue remain; a byte-level read discards them and
        // moves straight to the second byte.
        assert_eq!(s.read_u1().unwrap(), 0xFF);
    }

    #[test]
    fn close_after_partial_read_mode_bits_leaves_store_untouched() {
        // A partial *read*-mode bit residue must be discarded, not written
        // out as if it were pending write padding — closing must not
        // overwrite the next unread byte.
        let mut s = Stream::from_bytes(vec![0xFF, 0xAB]);
        assert_eq!(s.read_bits_int_be(3).unwrap(), 0b111);
        s.close().unwrap();
        assert_eq!(s.to_byte_array(), vec![0xFF, 0xAB]);
    }

    #[test]
    fn switching_bit_order_mid_field_aligns_first() {
        // Reading 3 BE bits off 0xFF leaves 5 bits of BE residue; a
        // following LE read must discard that residue and pull a fresh
        // byte rather than reinterpreting the stale bits under LE rules.
        let mut s = Stream::from_bytes(vec![0xFF, 0b0000_0010]);
        assert_eq!(s.read_bits_int_be(3).unwrap(), 0b111);
        assert_eq!(s.read_bits_int_le(2).unwrap(), 0b10);
        assert_eq!(s.pos(), 2);
    }

    #[test]
    fn switching_bit_mode_mid_field_flushes_pending_write_first() {
        // A pending write-mode bit residue must be flushed to the store
        // (not silently reinterpreted as read residue) before a read-mode
        // bit op runs on the same stream. No `seek`/`align` call happens
        // in between, so this exercises the automatic mode-switch align.
        let mut s = Stream::with_capacity(3);
        s.write_bits_int_be(3, 0b101).unwrap();
        let v = s.read_bits_int_be(5).unwrap();
        assert_eq!(v, 0); // fresh byte at index 1, zero-filled
        assert_eq!(s.pos(), 2);
        assert_eq!(s.to_byte_array()[0], 0b1010_0000); // pending write flushed first
    }

    #[test]
    fn ensure_fixed_contents_mismatch_errors() {
        let mut s = Stream::from_bytes(vec![1, 2, 3]);
        assert!(s.ensure_fixed_contents(&[1, 2, 9]).is_err());
    }

    #[test]
    fn ensure_fixed_contents_match() {
        let mut s = Stream::from_bytes(vec![1, 2, 3]);
        assert_eq!(s.ensure_fixed_contents(&[1, 2]).unwrap(), vec![1, 2]);
        assert_eq!(s.pos(), 2);
    }

    #[test]
    fn term_single_byte_include_and_consume_flags() {
        let mut s = Stream::from_bytes(vec![b'a', b'b', 0, b'c']);
        let result = s.read_bytes_term(0, false, true, true).unwrap();
        assert_eq!(result, vec![b'a', b'b']);
        assert_eq!(s.pos(), 3);
    }

    #[test]
    fn term_single_byte_no_consume_leaves_terminator() {
        let mut s = Stream::from_bytes(vec![b'a', 0, b'c']);
        let result = s.read_bytes_term(0, false, false, true).unwrap();
        assert_eq!(result, vec![b'a']);
        assert_eq!(s.pos(), 1);
        assert_eq!(s.read_u1().unwrap(), 0);
    }

    #[test]
    fn term_multi_byte_crlf() {
        let mut s = Stream::from_bytes(vec![b'h', b'i', 0x0D, 0x0A, b'x']);
        let result = s.read_bytes_term_multi(&[0x0D, 0x0A], false, true, true).unwrap();
        assert_eq!(result, vec![b'h', b'i']);
        assert_eq!(s.pos(), 4);
    }

    #[test]
    fn term_multi_byte_eof_without_match_returns_partial_when_not_erroring() {
        let mut s = Stream::from_bytes(vec![b'h', b'i', 0x0D]);
        let result = s.read_bytes_term_multi(&[0x0D, 0x0A], false, true, false).unwrap();
        assert_eq!(result, vec![b'h', b'i', 0x0D]);
    }

    #[test]
    fn term_multi_byte_eof_without_match_errors_when_requested() {
        let mut s = Stream::from_bytes(vec![b'h', b'i']);
        assert!(s.read_bytes_term_multi(&[0x0D, 0x0A], false, true, true).is_err());
    }

    #[test]
    fn write_substream_back_writes_at_recorded_offset() {
        let mut parent = Stream::with_capacity(8);
        parent.write_u4be(0).unwrap(); // placeholder length field
        let offset = parent.pos();
        let mut child = Stream::new_write_substream();
        child.write_u4be(0xAABBCCDD).unwrap();
        parent.add_child_stream(offset, child);
        parent.write_back_child_streams().unwrap();
        parent.seek(4).unwrap();
        assert_eq!(parent.read_u4be().unwrap(), 0xAABBCCDD);
    }

    #[test]
    fn read_substream_is_independent_of_parent() {
        let mut parent = Stream::from_bytes(vec![1, 2, 3, 4, 5]);
        let mut child = parent.substream(3).unwrap();
        assert_eq!(parent.pos(), 3);
        assert_eq!(child.read_bytes_full().unwrap(), vec![1, 2, 3]);
    }

    /// A backing store whose `write_n` (used to flush a pending bit
    /// residue) and `close` both always fail, to exercise the
    /// suppressed-context path in [`Stream::close`].
    #[derive(Debug)]
    struct DoubleFailStore;

    impl BackingStore for DoubleFailStore {
        fn pos(&self) -> u64 {
            0
        }
        fn size(&self) -> u64 {
            0
        }
        fn seek(&mut self, _pos: u64) -> Result<()> {
            Ok(())
        }
        fn read_n(&mut self, _n: u64) -> Result<Vec<u8>> {
            Err(StreamError::eos(0, 1, 0))
        }
        fn write_n(&mut self, _bytes: &[u8]) -> Result<()> {
            Err(StreamError::Arithmetic("flush failed".into()))
        }
        fn close(&mut self) -> Result<()> {
            Err(StreamError::Arithmetic("close failed".into()))
        }
        fn to_byte_array(&self) -> Vec<u8> {
            Vec::new()
        }
    }

    #[test]
    fn close_reports_close_error_primary_with_flush_suppressed() {
        let mut s = Stream::new(Box::new(DoubleFailStore));
        s.write_bits_int_be(3, 0b101).unwrap();
        let err = s.close().unwrap_err();
        match err {
            StreamError::Close { source, suppressed } => {
                assert!(matches!(*source, StreamError::Arithmetic(ref m) if m == "close failed"));
                assert!(matches!(*suppressed, StreamError::Arithmetic(ref m) if m == "flush failed"));
            }
            other => panic!("expected StreamError::Close, got {other:?}"),
        }
    }

    #[test]
    fn readonly_view_is_an_independent_copy() {
        let mut s = Stream::from_bytes(vec![9, 8, 7]);
        s.seek(1).unwrap();
        let view = s.as_readonly_view();
        assert_eq!(view.pos(), 0);
        assert_eq!(view.to_byte_array(), vec![9, 8, 7]);
    }
}
