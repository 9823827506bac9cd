//! I/O traits for image readers and writers.
//!
//! [`ImageHeader`] is the surface a viewer or command-line front end
//! consumes: format and dimensions, the decoded [`PixelBuffer`], and the
//! key/value metadata. [`ImageReader`] and [`ImageWriter`] are implemented
//! per file format.

use std::path::Path;

use ktx_core::{PixelBuffer, PixelFormat, TextureType};

use crate::metadata::KeyValueData;
use crate::IoResult;

/// Parsed image file.
pub trait ImageHeader {
    /// Pixel format of the stored data.
    fn format(&self) -> PixelFormat;

    /// Width in texels.
    fn width(&self) -> u32;

    /// Height in texels.
    fn height(&self) -> u32;

    /// Depth in texels (0 for 2D images).
    fn depth(&self) -> u32;

    /// Mip level count as declared by the file.
    fn level_count(&self) -> u32;

    /// Array layer count (0 for non-arrays).
    fn layer_count(&self) -> u32;

    /// Face count (6 for cubemaps, 1 otherwise).
    fn face_count(&self) -> u32;

    /// Decodes the level-0 image data.
    fn data(&self) -> IoResult<PixelBuffer>;

    /// Key/value metadata, if the file carries any.
    fn metadata(&self) -> Option<&KeyValueData>;

    /// Releases the file data held by the header.
    fn destroy(&mut self);

    /// Shape of the texture.
    fn texture_type(&self) -> TextureType {
        TextureType::classify(
            self.layer_count(),
            self.face_count(),
            self.width(),
            self.height(),
            self.depth(),
        )
    }
}

/// Trait for image format readers.
///
/// # Example
///
/// ```rust,ignore
/// use ktx_io::{ImageReader, IoResult};
///
/// struct MyFormatReader;
///
/// impl ImageReader for MyFormatReader {
///     type Header = MyHeader;
///
///     fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<MyHeader> {
///         // Read implementation
///     }
///
///     fn read_from_memory(&self, data: &[u8]) -> IoResult<MyHeader> {
///         // Memory read implementation
///     }
/// }
/// ```
pub trait ImageReader {
    /// Header type produced by this reader.
    type Header: ImageHeader;

    /// Reads an image from a file path.
    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<Self::Header>;

    /// Reads an image from memory.
    fn read_from_memory(&self, data: &[u8]) -> IoResult<Self::Header>;
}

/// Trait for image format writers.
pub trait ImageWriter {
    /// Writes one or more buffers to a file path.
    fn write<P: AsRef<Path>>(&self, path: P, buffers: &[PixelBuffer]) -> IoResult<()>;

    /// Writes one or more buffers to memory.
    fn write_to_memory(&self, buffers: &[PixelBuffer]) -> IoResult<Vec<u8>>;
}
