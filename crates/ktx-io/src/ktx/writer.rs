//! KTX2 writer.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use ktx_core::PixelBuffer;
use tracing::{debug, trace};

use super::dfd::DataFormatDescriptor;
use super::{
    zlib, Index, Ktx2Header, LevelIndex, Settings, SuperCompression, HEADER_SIZE, KTX2_IDENTIFIER,
    LEVEL_ENTRY_SIZE, LEVEL_INDEX_OFFSET,
};
use crate::metadata::KeyValueData;
use crate::{ImageWriter, IoError, IoResult};

/// Write adapter tracking the stream position.
struct Counted<W> {
    inner: W,
    written: usize,
}

impl<W: Write> Write for Counted<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// KTX2 file writer.
///
/// # Example
///
/// ```rust
/// use ktx_core::{BufferLayout, PixelBuffer, PixelFormat};
/// use ktx_io::ktx::{KtxWriter, SuperCompression};
/// use ktx_io::ImageWriter;
///
/// let buffer = PixelBuffer::from_bytes(vec![7; 4 * 4 * 4], PixelFormat::R8G8B8A8_UNORM, BufferLayout::new(4, 4))?;
/// let bytes = KtxWriter::new()
///     .with_supercompression(SuperCompression::None)
///     .write_to_memory(&[buffer])?;
/// assert_eq!(bytes.len() % 4, 0);
/// # Ok::<(), ktx_io::IoError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KtxWriter {
    supercompression: SuperCompression,
    level: u8,
    metadata: bool,
}

impl Default for KtxWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl KtxWriter {
    /// Zlib level 9 with `MIN` / `MAX` / `AVG` metadata.
    pub fn new() -> Self {
        Self {
            supercompression: SuperCompression::Zlib,
            level: zlib::DEFAULT_LEVEL,
            metadata: true,
        }
    }

    /// Sets the payload supercompression.
    pub fn with_supercompression(mut self, scheme: SuperCompression) -> Self {
        self.supercompression = scheme;
        self
    }

    /// Sets the zlib compression level (0-10).
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    /// Enables or disables the luminance metadata block.
    pub fn with_metadata(mut self, metadata: bool) -> Self {
        self.metadata = metadata;
        self
    }

    /// Checks that the buffers can share one container.
    ///
    /// A single buffer is written with its own face and layer counts.
    /// Several buffers become the faces of one texture and must each hold
    /// a single image of the first buffer's format and size.
    pub fn settings_for(buffers: &[PixelBuffer]) -> IoResult<Settings> {
        let first = buffers
            .first()
            .ok_or_else(|| IoError::buffer_mismatch(0, "no buffers to write"))?;
        if buffers.len() == 1 {
            return Ok(Settings::from_buffer(first));
        }

        for (index, buffer) in buffers.iter().enumerate() {
            if buffer.format() != first.format() {
                return Err(IoError::buffer_mismatch(
                    index,
                    format!("format {} differs from {}", buffer.format(), first.format()),
                ));
            }
            if buffer.width() != first.width() || buffer.height() != first.height() {
                return Err(IoError::buffer_mismatch(
                    index,
                    format!(
                        "size {}x{} differs from {}x{}",
                        buffer.width(),
                        buffer.height(),
                        first.width(),
                        first.height()
                    ),
                ));
            }
            if buffer.layer_count() != 0 || buffer.face_count() != 1 {
                return Err(IoError::buffer_mismatch(
                    index,
                    format!(
                        "{} layers, {} faces; face buffers must hold one image",
                        buffer.layer_count(),
                        buffer.face_count()
                    ),
                ));
            }
        }
        Ok(Settings::from_buffer(first).with_faces(buffers.len() as u32))
    }

    /// Writes buffers as the faces of one texture, returning the bytes written.
    pub fn write_buffers<W: Write>(&self, writer: &mut W, buffers: &[PixelBuffer]) -> IoResult<usize> {
        let settings = Self::settings_for(buffers)?;
        let metadata = if self.metadata {
            Some(KeyValueData::from_buffers(buffers)?)
        } else {
            None
        };

        let mut payload = Vec::with_capacity(settings.uncompressed_size()?);
        for buffer in buffers {
            payload.extend_from_slice(buffer.packed()?);
        }
        self.write_raw(writer, metadata.as_ref(), &settings, &payload)
    }

    /// Writes an already concatenated level-0 payload.
    ///
    /// `bytes` must hold `settings.uncompressed_size()` bytes. Empty
    /// metadata is not written.
    ///
    /// # Panics
    ///
    /// Panics if a computed region offset does not match the position it is
    /// written at.
    pub fn write_raw<W: Write>(
        &self,
        writer: &mut W,
        metadata: Option<&KeyValueData>,
        settings: &Settings,
        bytes: &[u8],
    ) -> IoResult<usize> {
        trace!(
            format = settings.format.name(),
            width = settings.width,
            height = settings.height,
            faces = settings.face_count,
            len = bytes.len(),
            "KtxWriter::write_raw"
        );
        if settings.level_count > 1 {
            return Err(IoError::UnsupportedFeature(format!(
                "{} mip levels, only level 0 is written",
                settings.level_count
            )));
        }
        if !self.supercompression.is_supported() {
            return Err(IoError::UnsupportedSuperCompression(self.supercompression.as_u32()));
        }
        let uncompressed = settings.uncompressed_size()?;
        if bytes.len() != uncompressed {
            return Err(ktx_core::Error::size_mismatch(uncompressed, bytes.len()).into());
        }

        let dfd = DataFormatDescriptor::for_format(settings.format)?;
        let metadata = metadata.filter(|kvd| !kvd.is_empty());
        let kvd_length = metadata.map_or(0, KeyValueData::byte_len);

        let stored: Cow<'_, [u8]> = match self.supercompression {
            SuperCompression::Zlib => Cow::Owned(zlib::compress(bytes, self.level)),
            _ => Cow::Borrowed(bytes),
        };

        let dfd_offset = LEVEL_INDEX_OFFSET + LEVEL_ENTRY_SIZE;
        let kvd_offset = dfd_offset + dfd.total_size();
        let level_offset = kvd_offset + kvd_length;

        let format = settings.format;
        let header = Ktx2Header {
            vk_format: format.id(),
            type_size: type_size(format),
            pixel_width: settings.width,
            pixel_height: settings.height,
            pixel_depth: settings.depth,
            layer_count: settings.layer_count,
            face_count: settings.face_count,
            level_count: settings.level_count,
            supercompression: self.supercompression.as_u32(),
        };
        let index = Index {
            dfd_offset: dfd_offset as u32,
            dfd_length: dfd.total_size() as u32,
            kvd_offset: if kvd_length > 0 { kvd_offset as u32 } else { 0 },
            kvd_length: kvd_length as u32,
            sgd_offset: 0,
            sgd_length: 0,
        };
        let level = LevelIndex {
            byte_offset: level_offset as u64,
            byte_length: stored.len() as u64,
            uncompressed_length: uncompressed as u64,
        };

        let mut out = Counted {
            inner: writer,
            written: 0,
        };
        out.write_all(&KTX2_IDENTIFIER)?;
        header.write_to(&mut out)?;
        assert_eq!(out.written, HEADER_SIZE, "header size");
        index.write_to(&mut out)?;
        assert_eq!(out.written, LEVEL_INDEX_OFFSET, "level index offset");
        level.write_to(&mut out)?;
        assert_eq!(out.written, dfd_offset, "DFD offset");
        dfd.write_to(&mut out)?;
        assert_eq!(out.written, kvd_offset, "KVD offset");
        if let Some(kvd) = metadata {
            kvd.write_kvd(&mut out)?;
        }
        assert_eq!(out.written, level_offset, "level 0 offset");
        out.write_all(&stored)?;
        out.flush()?;

        debug!(
            format = format.name(),
            uncompressed,
            stored = stored.len(),
            kvd = kvd_length,
            total = out.written,
            "Wrote KTX2"
        );
        Ok(out.written)
    }
}

/// `typeSize` header field: component width for whole-byte formats, the
/// texel size for packed formats.
fn type_size(format: ktx_core::PixelFormat) -> u32 {
    if format.is_packed() {
        format.byte_size().max(1) as u32
    } else {
        format.component_size().unwrap_or(1) as u32
    }
}

impl ImageWriter for KtxWriter {
    fn write<P: AsRef<Path>>(&self, path: P, buffers: &[PixelBuffer]) -> IoResult<()> {
        trace!(path = %path.as_ref().display(), buffers = buffers.len(), "ktx::write");
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_buffers(&mut writer, buffers)?;
        writer.flush()?;
        Ok(())
    }

    fn write_to_memory(&self, buffers: &[PixelBuffer]) -> IoResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write_buffers(&mut out, buffers)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktx_core::{BufferLayout, PixelFormat};

    fn rgba(width: u32, height: u32, fill: u8) -> PixelBuffer {
        let len = (width * height * 4) as usize;
        PixelBuffer::from_bytes(vec![fill; len], PixelFormat::R8G8B8A8_UNORM, BufferLayout::new(width, height))
            .unwrap()
    }

    #[test]
    fn test_offsets_without_metadata() {
        let bytes = KtxWriter::new()
            .with_supercompression(SuperCompression::None)
            .with_metadata(false)
            .write_to_memory(&[rgba(2, 2, 9)])
            .unwrap();
        let dfd_size = 4 + 24 + 4 * 16;
        assert_eq!(bytes.len(), 104 + dfd_size + 16);
        assert_eq!(u32::from_le_bytes(bytes[48..52].try_into().unwrap()), 104);
        assert_eq!(u32::from_le_bytes(bytes[56..60].try_into().unwrap()), 0);
        assert_eq!(u64::from_le_bytes(bytes[80..88].try_into().unwrap()), (104 + dfd_size) as u64);
        assert!(bytes[104 + dfd_size..].iter().all(|&b| b == 9));
    }

    #[test]
    fn test_face_validation() {
        let err = KtxWriter::settings_for(&[rgba(2, 2, 0), rgba(4, 2, 0)]).unwrap_err();
        assert!(matches!(err, IoError::BufferMismatch { index: 1, .. }));

        let other = PixelBuffer::from_bytes(vec![0; 4], PixelFormat::R8_UNORM, BufferLayout::new(2, 2)).unwrap();
        let err = KtxWriter::settings_for(&[rgba(2, 2, 0), other]).unwrap_err();
        assert!(matches!(err, IoError::BufferMismatch { index: 1, .. }));

        let settings = KtxWriter::settings_for(&[rgba(2, 2, 0), rgba(2, 2, 1)]).unwrap();
        assert_eq!(settings.face_count, 2);
        assert!(KtxWriter::settings_for(&[]).is_err());
    }

    #[test]
    fn test_rejects_mip_chain() {
        let buffer = rgba(2, 2, 0);
        let settings = Settings {
            level_count: 3,
            ..Settings::from_buffer(&buffer)
        };
        let err = KtxWriter::new()
            .write_raw(&mut Vec::new(), None, &settings, buffer.packed().unwrap())
            .unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFeature(_)));
    }

    #[test]
    fn test_rejects_unimplemented_scheme() {
        let err = KtxWriter::new()
            .with_supercompression(SuperCompression::Zstandard)
            .write_to_memory(&[rgba(1, 1, 0)])
            .unwrap_err();
        assert!(matches!(err, IoError::UnsupportedSuperCompression(2)));
    }

    #[test]
    fn test_raw_size_checked() {
        let settings = Settings::from_buffer(&rgba(2, 2, 0));
        let err = KtxWriter::new()
            .write_raw(&mut Vec::new(), None, &settings, &[0; 15])
            .unwrap_err();
        assert!(matches!(
            err,
            IoError::Core(ktx_core::Error::SizeMismatch { expected: 16, actual: 15 })
        ));
    }

    #[test]
    fn test_type_size() {
        assert_eq!(type_size(PixelFormat::R32G32B32_SFLOAT), 4);
        assert_eq!(type_size(PixelFormat::R16G16B16A16_SFLOAT), 2);
        assert_eq!(type_size(PixelFormat::R8G8B8A8_UNORM), 1);
        assert_eq!(type_size(PixelFormat::B10G11R11_UFLOAT_PACK32), 4);
    }
}
