//! Error types for I/O operations.
//!
//! Provides unified error handling for the container codec and the HDR
//! decoder. Pixel buffer errors from `ktx-core` are wrapped in
//! [`IoError::Core`].

use std::io;
use thiserror::Error;

/// Radiance scanline and header decoding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanlineError {
    /// File does not start with the `#?RADIANCE` signature.
    #[error("missing #?RADIANCE signature")]
    BadSignature,
    /// Resolution line has fewer than four tokens or bad numbers.
    #[error("bad resolution line")]
    BadResolutionLine,
    /// Old-style run marker `(1, 1, 1)` encountered.
    #[error("old-style repeat marker not implemented")]
    UnsupportedRepeatMarker,
    /// Old-style and new-style scanlines mixed in one file.
    #[error("mixed old-style and new-style scanlines")]
    InconsistentScanlineEncoding,
    /// A run would write past the scanline width.
    #[error("scanline overrun at x = {x}, width {width}")]
    ScanlineOverrun {
        /// Plane offset where the run started
        x: usize,
        /// Scanline width
        width: usize,
    },
    /// New-style scanline declares a length other than the image width.
    #[error("scanline length {actual} does not match width {expected}")]
    ScanlineLengthMismatch {
        /// Image width
        expected: usize,
        /// Length declared by the scanline
        actual: usize,
    },
    /// Stream ended before the image was complete.
    #[error("unexpected end of stream")]
    Truncated,
    /// Bytes remain after the last scanline.
    #[error("{0} bytes of trailing data")]
    TrailingData(usize),
}

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Pixel buffer or format error.
    #[error(transparent)]
    Core(#[from] ktx_core::Error),

    /// Bad magic or structurally inconsistent container.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// Supercompression scheme not implemented.
    #[error("unsupported supercompression scheme: {0}")]
    UnsupportedSuperCompression(u32),

    /// Inflated payload size differs from the declared size.
    #[error("corrupt payload: expected {expected} bytes, got {actual}")]
    CorruptPayload {
        /// Declared uncompressed length.
        expected: usize,
        /// Length actually produced.
        actual: usize,
    },

    /// Radiance HDR decoding error.
    #[error("HDR decode error: {0}")]
    Scanline(#[from] ScanlineError),

    /// Buffers handed to the writer do not agree.
    #[error("buffer {index} rejected: {reason}")]
    BufferMismatch {
        /// Index of the offending buffer.
        index: usize,
        /// What did not match.
        reason: String,
    },

    /// Unsupported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Feature not implemented by this codec.
    #[error("feature unavailable: {0}")]
    UnsupportedFeature(String),
}

impl IoError {
    /// Creates an [`IoError::MalformedContainer`] error.
    #[inline]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedContainer(msg.into())
    }

    /// Creates an [`IoError::BufferMismatch`] error.
    #[inline]
    pub fn buffer_mismatch(index: usize, reason: impl Into<String>) -> Self {
        Self::BufferMismatch {
            index,
            reason: reason.into(),
        }
    }

    /// Returns `true` for HDR decoding errors.
    #[inline]
    pub fn is_scanline_error(&self) -> bool {
        matches!(self, Self::Scanline(_))
    }
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;
