//! # ktx-io
//!
//! Texture container I/O.
//!
//! - **KTX2** - Khronos texture container, level 0 with Zlib supercompression
//! - **HDR** - Radiance RGBE decoding into float or half-float buffers
//!
//! # Architecture
//!
//! - [`ImageHeader`] - parsed file, handing out a [`PixelBuffer`] and metadata
//! - [`ImageReader`] - Trait for format readers
//! - [`ImageWriter`] - Trait for format writers
//! - [`read`] - format auto-detection
//!
//! # Quick Start
//!
//! ```no_run
//! use ktx_io::ktx::KtxWriter;
//! use ktx_io::{read, ImageWriter};
//!
//! // Radiance in, KTX2 out
//! let header = read("sky.hdr")?;
//! let buffer = header.data()?;
//! KtxWriter::new().write("sky.ktx2", &[buffer])?;
//! # Ok::<(), ktx_io::IoError>(())
//! ```
//!
//! # Supported Formats
//!
//! | Format | Read | Write | Pixel formats |
//! |--------|------|-------|---------------|
//! | KTX2 | Yes | Yes | Any uncompressed VkFormat |
//! | HDR | Yes | No | RGB 32f, RGB 16f |
//!
//! # Feature Flags
//!
//! - `ktx` - KTX2 support (default)
//! - `hdr` - Radiance HDR support (default)
//! - `mmap` - memory-mapped container reads (default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod detect;
mod error;
pub mod metadata;
mod traits;

#[cfg(feature = "hdr")]
pub mod hdr;

#[cfg(feature = "ktx")]
pub mod ktx;

pub use detect::{Format, KTX2_IDENTIFIER};
pub use error::{IoError, IoResult, ScanlineError};
pub use metadata::{KeyValue, KeyValueData};
pub use traits::{ImageHeader, ImageReader, ImageWriter};

pub use ktx_core::{PixelBuffer, PixelFormat};

use std::path::Path;
use tracing::debug;

/// Opens an image file, auto-detecting the format.
///
/// The format is detected by magic bytes, then by file extension.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened
/// - The format is not supported (PNG and JPEG are recognized but not decoded)
/// - The file is corrupted
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<Box<dyn ImageHeader>> {
    let path = path.as_ref();
    let format = Format::detect(path)?;
    debug!(path = %path.display(), format = ?format, "Detected format");

    match format {
        #[cfg(feature = "ktx")]
        Format::Ktx2 => Ok(Box::new(ktx::KtxReader::new().read(path)?)),

        #[cfg(feature = "hdr")]
        Format::Hdr => Ok(Box::new(hdr::HdrReader::new().read(path)?)),

        _ => Err(IoError::UnsupportedFormat(format!(
            "{:?} input: {}",
            format,
            path.display()
        ))),
    }
}
