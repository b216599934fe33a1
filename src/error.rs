//! Error types for safeview
//!
//! Every stage of archive loading fails fast with one of these variants and
//! the first error is returned unchanged to the caller. None of them are
//! recovered internally.

use thiserror::Error;

/// Result type alias for safeview operations
pub type Result<T> = std::result::Result<T, SafeviewError>;

/// Error type for archive loading and lookup
#[derive(Debug, Error)]
pub enum SafeviewError {
    /// File is shorter than the 8-byte length prefix
    #[error("Header too small: file has {len} bytes, need at least 8")]
    HeaderTooSmall {
        /// Total length of the input
        len: u64,
    },

    /// Declared header length exceeds the configured ceiling
    #[error("Header too large: {header_len} bytes exceeds limit of {limit} bytes")]
    HeaderTooLarge {
        /// Declared header length
        header_len: u64,
        /// Configured maximum
        limit: u64,
    },

    /// Header end offset overflows or lies past the end of the file
    #[error("Invalid header length: header of {header_len} bytes does not fit in {file_len} byte file")]
    InvalidHeaderLength {
        /// Declared header length
        header_len: u64,
        /// Total length of the input
        file_len: u64,
    },

    /// Header bytes are not valid UTF-8
    #[error("Invalid header encoding: {0}")]
    InvalidHeaderEncoding(#[source] std::str::Utf8Error),

    /// Header is not a JSON object of well-formed tensor records
    #[error("Invalid header JSON: {0}")]
    InvalidHeaderJson(#[source] serde_json::Error),

    /// Tensor byte range is not contiguous with the previous one, or is reversed
    #[error("Invalid offsets for tensor '{name}' (#{index}): [{start}, {end}) but expected start {expected_start}")]
    OffsetInvalid {
        /// Tensor name
        name: String,
        /// Position in declaration order
        index: usize,
        /// Declared start offset
        start: u64,
        /// Declared end offset
        end: u64,
        /// Start offset the layout requires
        expected_start: u64,
    },

    /// Declared byte range does not match shape and dtype
    #[error("Shape/size mismatch for tensor '{name}' (#{index}): shape needs {expected} bytes, offsets declare {declared}")]
    ShapeSizeMismatch {
        /// Tensor name
        name: String,
        /// Position in declaration order
        index: usize,
        /// Byte count derived from shape and dtype
        expected: u64,
        /// Byte count derived from data offsets
        declared: u64,
    },

    /// Element or byte count does not fit in 64 bits
    #[error("Arithmetic overflow computing size of tensor '{name}' (#{index})")]
    ArithmeticOverflow {
        /// Tensor name
        name: String,
        /// Position in declaration order
        index: usize,
    },

    /// Tensor data does not cover the payload region exactly
    #[error("Buffer length mismatch: header describes {expected} bytes of file, found {actual}")]
    BufferLengthMismatch {
        /// File length implied by header and offsets (saturated on overflow)
        expected: u64,
        /// Actual file length
        actual: u64,
    },

    /// Lookup miss
    #[error("Tensor '{0}' not found")]
    TensorNotFound(String),

    /// Hand-built view whose buffer does not match its dtype and shape
    #[error("Invalid tensor view: dtype {dtype}, shape {shape:?}, buffer of {len} bytes")]
    InvalidTensorView {
        /// Element type
        dtype: crate::dtype::Dtype,
        /// Requested shape
        shape: Vec<u64>,
        /// Buffer length
        len: usize,
    },

    /// Underlying file or mapping failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
