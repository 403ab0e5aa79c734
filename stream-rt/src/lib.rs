//! Seekable dual-mode byte/bit stream engine for generated binary-format
//! parsers and serializers.
//!
//! [`Stream`] is the entry point: it reads and writes fixed-width integers
//! and floats in either endianness, packs/unpacks sub-byte integers via a
//! [`BitAccumulator`](bits::BitAccumulator), carves out substreams, and
//! defers child-stream write-back for length-prefixed output. [`transform`]
//! holds the pure byte-array helpers (`xor`, `rotate`, `zlib`, terminators,
//! comparisons) that generated code chains after a raw read or before a
//! write.

pub mod backing_store;
pub mod bits;
pub mod error;
pub mod span;
pub mod stream;
pub mod transform;

pub use backing_store::BackingStore;
pub use error::{Result, StreamError, ValidationError};
pub use span::{ArraySpan, Span};
pub use stream::Stream;
