//! Error types for ktx-core operations.
//!
//! Every fallible operation on the format catalog and on pixel buffers
//! returns [`Result`], carrying one of the [`Error`] kinds below.
//!
//! # Usage
//!
//! ```rust
//! use ktx_core::{Error, Result};
//!
//! fn image_at(index: usize, count: usize) -> Result<()> {
//!     if index >= count {
//!         return Err(Error::index_out_of_range(index, count));
//!     }
//!     Ok(())
//! }
//! assert!(image_at(3, 2).is_err());
//! ```
//!
//! # Used By
//!
//! - [`crate::format`] - catalog lookups
//! - [`crate::buffer::PixelBuffer`] - construction and access
//! - `ktx-io` - wrapped as `IoError::Core`

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the format catalog and pixel buffers.
///
/// # Categories
///
/// - **Format errors**: [`UnsupportedFormat`](Error::UnsupportedFormat), [`WrongConstructor`](Error::WrongConstructor)
/// - **Construction errors**: [`InvalidDimensions`](Error::InvalidDimensions), [`SizeMismatch`](Error::SizeMismatch)
/// - **Access errors**: [`IndexOutOfRange`](Error::IndexOutOfRange), [`NotAvailable`](Error::NotAvailable), [`UseAfterDestroy`](Error::UseAfterDestroy)
#[derive(Debug, Error)]
pub enum Error {
    /// Format id or name is not in the catalog, or the format cannot be used
    /// for the requested byte-level operation (block-compressed formats).
    #[error("unsupported pixel format: {format}")]
    UnsupportedFormat {
        /// Format name or id
        format: String,
    },

    /// Face count, dimensions or derived sizes are not usable.
    #[error("invalid dimensions: {reason}")]
    InvalidDimensions {
        /// Why the dimensions were rejected
        reason: String,
    },

    /// Supplied array length does not match `imageCount * imageSize`.
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Length required by the buffer layout
        expected: usize,
        /// Length supplied
        actual: usize,
    },

    /// The constructor does not accept this kind of format.
    ///
    /// Float formats go through the float constructors, integer formats
    /// through the packed or array constructors.
    #[error("wrong constructor for format {format}")]
    WrongConstructor {
        /// Format name
        format: String,
    },

    /// Image index is past the end of the buffer.
    #[error("image index {index} out of range for {count} images")]
    IndexOutOfRange {
        /// Requested image index
        index: usize,
        /// Number of images in the buffer
        count: usize,
    },

    /// Conversion to float values is not defined for this format.
    #[error("float data not available for format {format}")]
    NotAvailable {
        /// Format name
        format: String,
    },

    /// The buffer storage was released by `destroy()`.
    #[error("pixel buffer used after destroy")]
    UseAfterDestroy,

    /// Worker pool could not be built.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::SizeMismatch`] error.
    #[inline]
    pub fn size_mismatch(expected: usize, actual: usize) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Creates an [`Error::WrongConstructor`] error.
    #[inline]
    pub fn wrong_constructor(format: impl Into<String>) -> Self {
        Self::WrongConstructor {
            format: format.into(),
        }
    }

    /// Creates an [`Error::IndexOutOfRange`] error.
    #[inline]
    pub fn index_out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange { index, count }
    }

    /// Creates an [`Error::NotAvailable`] error.
    #[inline]
    pub fn not_available(format: impl Into<String>) -> Self {
        Self::NotAvailable {
            format: format.into(),
        }
    }

    /// Returns `true` if this is a format-related error.
    #[inline]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::WrongConstructor { .. } | Self::NotAvailable { .. }
        )
    }

    /// Returns `true` if the buffer layout contract was violated.
    #[inline]
    pub fn is_layout_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions { .. } | Self::SizeMismatch { .. } | Self::IndexOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch() {
        let err = Error::size_mismatch(1200, 1100);
        let msg = err.to_string();
        assert!(msg.contains("1200"));
        assert!(msg.contains("1100"));
        assert!(err.is_layout_error());
    }

    #[test]
    fn test_format_errors() {
        assert!(Error::unsupported_format("VK_FORMAT_BC7_UNORM_BLOCK").is_format_error());
        assert!(Error::wrong_constructor("VK_FORMAT_R32_SFLOAT").is_format_error());
        assert!(!Error::UseAfterDestroy.is_format_error());
    }

    #[test]
    fn test_destroy_is_neither_format_nor_layout() {
        assert!(!Error::UseAfterDestroy.is_layout_error());
        assert!(Error::invalid_dimensions("image size overflows").is_layout_error());
    }
}
