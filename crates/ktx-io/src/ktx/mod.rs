//! KTX2 (Khronos Texture 2.0) container support.
//!
//! Reads and writes the level-0 payload of a KTX2 container together with
//! its Data Format Descriptor and key/value metadata.
//!
//! # Layout
//!
//! ```text
//! [identifier: 12][header: 9 x u32][index: 4 x u32 + 2 x u64]
//! [level index: max(1, levelCount) x 24][DFD][KVD][payload]
//! ```
//!
//! Everything is little-endian.
//!
//! # Features
//!
//! - Uncompressed (`None`) and `Zlib` supercompression
//! - Cubemaps and arrays, one face or layer after another in the payload
//! - `MIN` / `MAX` / `AVG` luminance metadata for float payloads
//!
//! # Limitations
//!
//! - Only mip level 0 is read or written
//! - BasisLZ and Zstandard supercompression are rejected
//!
//! # Example
//!
//! ```no_run
//! use ktx_core::{BufferLayout, PixelBuffer, PixelFormat};
//! use ktx_io::ktx::{KtxReader, KtxWriter};
//! use ktx_io::{ImageHeader, ImageReader, ImageWriter};
//!
//! let texels = vec![0.5f32; 16 * 16 * 3];
//! let buffer = PixelBuffer::from_f32(&texels, PixelFormat::R32G32B32_SFLOAT, BufferLayout::new(16, 16), None)?;
//! KtxWriter::new().write("out.ktx2", &[buffer])?;
//!
//! let header = KtxReader::new().read("out.ktx2")?;
//! println!("{} {}x{}", header.format(), header.width(), header.height());
//! # Ok::<(), ktx_io::IoError>(())
//! ```

pub mod dfd;
mod reader;
mod writer;
mod zlib;

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ktx_core::{BufferLayout, PixelBuffer, PixelFormat};

use crate::{IoError, IoResult};

pub use dfd::{DataFormatDescriptor, DfdBlock, DfdSample};
pub use reader::{KtxHeader, KtxReader};
pub use writer::KtxWriter;

pub use crate::detect::KTX2_IDENTIFIER;

/// Identifier plus the nine header fields.
pub const HEADER_SIZE: usize = 48;
/// DFD / KVD / SGD offsets and lengths.
pub const INDEX_SIZE: usize = 32;
/// Offset of the first level index entry.
pub const LEVEL_INDEX_OFFSET: usize = HEADER_SIZE + INDEX_SIZE;
/// Bytes per level index entry.
pub const LEVEL_ENTRY_SIZE: usize = 24;

/// Payload supercompression scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum SuperCompression {
    /// Stored as-is.
    None = 0,
    /// Basis Universal ETC1S.
    BasisLz = 1,
    /// Zstandard.
    Zstandard = 2,
    /// zlib-wrapped DEFLATE.
    #[default]
    Zlib = 3,
}

impl SuperCompression {
    /// Scheme for a header value.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::BasisLz),
            2 => Some(Self::Zstandard),
            3 => Some(Self::Zlib),
            _ => None,
        }
    }

    /// Header value.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Returns `true` for schemes this codec can encode and decode.
    pub fn is_supported(self) -> bool {
        matches!(self, Self::None | Self::Zlib)
    }

    /// Scheme for a header value, failing for anything not implemented.
    pub fn supported(value: u32) -> IoResult<Self> {
        match Self::from_u32(value) {
            Some(scheme) if scheme.is_supported() => Ok(scheme),
            _ => Err(IoError::UnsupportedSuperCompression(value)),
        }
    }
}

/// Format and shape of the texture being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Pixel format.
    pub format: PixelFormat,
    /// Mip level count, 0 or 1.
    pub level_count: u32,
    /// Cubemap faces (1 or 6).
    pub face_count: u32,
    /// Array layers (0 for non-arrays).
    pub layer_count: u32,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels (0 for 2D).
    pub depth: u32,
}

impl Settings {
    /// Single-level settings matching a buffer.
    pub fn from_buffer(buffer: &PixelBuffer) -> Self {
        let layout = buffer.layout();
        Self {
            format: buffer.format(),
            level_count: 1,
            face_count: layout.face_count,
            layer_count: layout.layer_count,
            width: layout.width,
            height: layout.height,
            depth: layout.depth,
        }
    }

    /// Sets the face count.
    pub fn with_faces(mut self, face_count: u32) -> Self {
        self.face_count = face_count;
        self
    }

    /// Buffer layout of the level-0 payload.
    pub fn layout(&self) -> BufferLayout {
        BufferLayout::new(self.width, self.height)
            .with_faces(self.face_count)
            .with_layers(self.layer_count)
            .with_depth(self.depth)
    }

    /// `max(1, layers) * faces * width * max(1, height) * max(1, depth) * byteSize`.
    pub fn uncompressed_size(&self) -> IoResult<usize> {
        Ok(self.layout().total_size(self.format)?)
    }
}

/// The nine fixed header fields after the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ktx2Header {
    /// VkFormat value.
    pub vk_format: u32,
    /// Size of the data type for endianness conversion.
    pub type_size: u32,
    /// Width in texels.
    pub pixel_width: u32,
    /// Height in texels.
    pub pixel_height: u32,
    /// Depth in texels.
    pub pixel_depth: u32,
    /// Array layers.
    pub layer_count: u32,
    /// Cubemap faces.
    pub face_count: u32,
    /// Mip levels.
    pub level_count: u32,
    /// Supercompression scheme value.
    pub supercompression: u32,
}

impl Ktx2Header {
    fn read_from<R: Read>(reader: &mut R) -> IoResult<Self> {
        Ok(Self {
            vk_format: reader.read_u32::<LittleEndian>()?,
            type_size: reader.read_u32::<LittleEndian>()?,
            pixel_width: reader.read_u32::<LittleEndian>()?,
            pixel_height: reader.read_u32::<LittleEndian>()?,
            pixel_depth: reader.read_u32::<LittleEndian>()?,
            layer_count: reader.read_u32::<LittleEndian>()?,
            face_count: reader.read_u32::<LittleEndian>()?,
            level_count: reader.read_u32::<LittleEndian>()?,
            supercompression: reader.read_u32::<LittleEndian>()?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        for field in [
            self.vk_format,
            self.type_size,
            self.pixel_width,
            self.pixel_height,
            self.pixel_depth,
            self.layer_count,
            self.face_count,
            self.level_count,
            self.supercompression,
        ] {
            writer.write_u32::<LittleEndian>(field)?;
        }
        Ok(())
    }
}

/// Offsets and lengths of the DFD, KVD and SGD regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Index {
    /// DFD offset.
    pub dfd_offset: u32,
    /// DFD length, including its size field.
    pub dfd_length: u32,
    /// KVD offset (0 when absent).
    pub kvd_offset: u32,
    /// KVD length.
    pub kvd_length: u32,
    /// Supercompression global data offset.
    pub sgd_offset: u64,
    /// Supercompression global data length.
    pub sgd_length: u64,
}

impl Index {
    fn read_from<R: Read>(reader: &mut R) -> IoResult<Self> {
        Ok(Self {
            dfd_offset: reader.read_u32::<LittleEndian>()?,
            dfd_length: reader.read_u32::<LittleEndian>()?,
            kvd_offset: reader.read_u32::<LittleEndian>()?,
            kvd_length: reader.read_u32::<LittleEndian>()?,
            sgd_offset: reader.read_u64::<LittleEndian>()?,
            sgd_length: reader.read_u64::<LittleEndian>()?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_u32::<LittleEndian>(self.dfd_offset)?;
        writer.write_u32::<LittleEndian>(self.dfd_length)?;
        writer.write_u32::<LittleEndian>(self.kvd_offset)?;
        writer.write_u32::<LittleEndian>(self.kvd_length)?;
        writer.write_u64::<LittleEndian>(self.sgd_offset)?;
        writer.write_u64::<LittleEndian>(self.sgd_length)?;
        Ok(())
    }
}

/// One level index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LevelIndex {
    /// Payload offset.
    pub byte_offset: u64,
    /// Stored (possibly compressed) length.
    pub byte_length: u64,
    /// Length after decompression.
    pub uncompressed_length: u64,
}

impl LevelIndex {
    fn read_from<R: Read>(reader: &mut R) -> IoResult<Self> {
        Ok(Self {
            byte_offset: reader.read_u64::<LittleEndian>()?,
            byte_length: reader.read_u64::<LittleEndian>()?,
            uncompressed_length: reader.read_u64::<LittleEndian>()?,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_u64::<LittleEndian>(self.byte_offset)?;
        writer.write_u64::<LittleEndian>(self.byte_length)?;
        writer.write_u64::<LittleEndian>(self.uncompressed_length)?;
        Ok(())
    }
}
