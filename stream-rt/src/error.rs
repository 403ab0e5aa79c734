//! Error taxonomy shared by every fallible operation in this crate.

use std::fmt;
use thiserror::Error;

/// The result type threaded through every fallible stream operation.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Everything that can go wrong while reading, writing, or validating a
/// stream.
#[derive(Error, Debug)]
pub enum StreamError {
    /// A read or write ran past the end of the backing store.
    #[error("end of stream at position {pos} (wanted {wanted} more byte(s), {available} available)")]
    EndOfStream {
        pos: u64,
        wanted: u64,
        available: u64,
    },

    /// `ensure_fixed_contents` found a mismatch.
    #[error("unexpected fixed contents at position {pos}: expected {expected:02x?}, got {actual:02x?}")]
    UnexpectedFixedContent {
        pos: u64,
        actual: Vec<u8>,
        expected: Vec<u8>,
    },

    /// A schema-level endianness switch produced no match. The stream engine
    /// never raises this itself; it exists so generated code can propagate it
    /// through this crate's `Result`.
    #[error("no matching case for endianness switch")]
    UndecidedEndianness,

    /// A validation check failed.
    #[error("validation failed at position {pos} ({path}): {kind}")]
    ValidationFailed {
        kind: ValidationError,
        pos: u64,
        path: String,
    },

    /// An invalid modulo divisor was supplied to `mod`.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// An operation was requested that this implementation does not support.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The underlying backing store failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Both the pending bit-residue flush and the backing store's own
    /// `close` failed. The close error is primary (this is what
    /// [`std::error::Error::source`] points to); the flush error that
    /// preceded it is attached as suppressed context rather than discarded,
    /// per spec.md §5.
    #[error("failed to close stream: {source}")]
    Close {
        #[source]
        source: Box<StreamError>,
        suppressed: Box<StreamError>,
    },
}

/// The specific kind of validation failure, carried inside
/// [`StreamError::ValidationFailed`].
#[derive(Debug)]
pub enum ValidationError {
    NotEqual { actual: String, expected: String },
    LessThan { actual: String, min: String },
    GreaterThan { actual: String, max: String },
    NotAnyOf { actual: String },
    NotInEnum { actual: String },
    ExprFailed,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NotEqual { actual, expected } => {
                write!(f, "not equal: expected {expected}, got {actual}")
            }
            ValidationError::LessThan { actual, min } => {
                write!(f, "{actual} is less than the minimum of {min}")
            }
            ValidationError::GreaterThan { actual, max } => {
                write!(f, "{actual} is greater than the maximum of {max}")
            }
            ValidationError::NotAnyOf { actual } => {
                write!(f, "{actual} did not match any of the allowed values")
            }
            ValidationError::NotInEnum { actual } => {
                write!(f, "{actual} is not a member of the expected enum")
            }
            ValidationError::ExprFailed => write!(f, "validation expression failed"),
        }
    }
}

impl StreamError {
    /// Build an [`StreamError::EndOfStream`] for a read/write of `wanted`
    /// bytes attempted at `pos` against a store of `available` remaining
    /// bytes.
    pub fn eos(pos: u64, wanted: u64, available: u64) -> Self {
        StreamError::EndOfStream {
            pos,
            wanted,
            available,
        }
    }
}
