//! KTX2 reader.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use ktx_core::{BufferLayout, PixelBuffer, PixelFormat};
use tracing::{debug, trace};

use super::dfd::DataFormatDescriptor;
use super::{
    zlib, Index, Ktx2Header, LevelIndex, SuperCompression, KTX2_IDENTIFIER, LEVEL_ENTRY_SIZE,
    LEVEL_INDEX_OFFSET,
};
use crate::metadata::KeyValueData;
use crate::{ImageHeader, ImageReader, IoError, IoResult};

/// Container bytes, owned or mapped.
enum Source {
    Owned(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mapped(memmap2::Mmap),
}

impl Source {
    fn bytes(&self) -> &[u8] {
        match self {
            Source::Owned(data) => data,
            #[cfg(feature = "mmap")]
            Source::Mapped(map) => map,
        }
    }
}

/// Bounds-checked `[offset, offset + length)` window.
fn region<'a>(data: &'a [u8], offset: u64, length: u64, what: &str) -> IoResult<&'a [u8]> {
    let start = usize::try_from(offset).ok();
    let end = offset.checked_add(length).and_then(|end| usize::try_from(end).ok());
    match (start, end) {
        (Some(start), Some(end)) if end <= data.len() => Ok(&data[start..end]),
        _ => Err(IoError::malformed(format!(
            "{what} [{offset}, +{length}) outside file of {} bytes",
            data.len()
        ))),
    }
}

/// KTX2 file reader.
#[derive(Debug, Clone, Copy)]
pub struct KtxReader {
    mmap: bool,
}

impl Default for KtxReader {
    fn default() -> Self {
        Self::new()
    }
}

impl KtxReader {
    /// Reader that maps files when the `mmap` feature is enabled.
    pub fn new() -> Self {
        Self {
            mmap: cfg!(feature = "mmap"),
        }
    }

    /// Chooses between mapping and reading files into memory.
    ///
    /// Has no effect without the `mmap` feature.
    pub fn with_mmap(mut self, mmap: bool) -> Self {
        self.mmap = mmap && cfg!(feature = "mmap");
        self
    }

    #[cfg(feature = "mmap")]
    fn open(&self, path: &Path) -> IoResult<Source> {
        if !self.mmap {
            return Ok(Source::Owned(std::fs::read(path)?));
        }
        let file = std::fs::File::open(path)?;
        // SAFETY: the mapping is read-only and lives as long as the header.
        let map = unsafe { memmap2::Mmap::map(&file)? };
        Ok(Source::Mapped(map))
    }

    #[cfg(not(feature = "mmap"))]
    fn open(&self, path: &Path) -> IoResult<Source> {
        Ok(Source::Owned(std::fs::read(path)?))
    }
}

impl ImageReader for KtxReader {
    type Header = KtxHeader;

    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<KtxHeader> {
        let path = path.as_ref();
        trace!(path = %path.display(), mmap = self.mmap, "ktx::read");
        KtxHeader::parse(self.open(path)?)
    }

    fn read_from_memory(&self, data: &[u8]) -> IoResult<KtxHeader> {
        KtxHeader::parse(Source::Owned(data.to_vec()))
    }
}

/// Parsed KTX2 container.
///
/// Holds the file bytes until [`ImageHeader::destroy`]; the level-0
/// payload is decompressed on each [`ImageHeader::data`] call.
pub struct KtxHeader {
    header: Ktx2Header,
    index: Index,
    levels: Vec<LevelIndex>,
    format: PixelFormat,
    scheme: SuperCompression,
    dfd: DataFormatDescriptor,
    metadata: Option<KeyValueData>,
    source: Option<Source>,
}

fn layout_of(header: &Ktx2Header) -> BufferLayout {
    BufferLayout::new(header.pixel_width, header.pixel_height)
        .with_faces(header.face_count)
        .with_layers(header.layer_count)
        .with_depth(header.pixel_depth)
}

impl fmt::Debug for KtxHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KtxHeader")
            .field("header", &self.header)
            .field("format", &self.format.name())
            .field("scheme", &self.scheme)
            .field("levels", &self.levels)
            .field("metadata", &self.metadata)
            .field("destroyed", &self.source.is_none())
            .finish()
    }
}

impl KtxHeader {
    fn parse(source: Source) -> IoResult<Self> {
        let data = source.bytes();
        trace!(len = data.len(), "KtxHeader::parse");
        if data.len() < LEVEL_INDEX_OFFSET || data[..12] != KTX2_IDENTIFIER {
            return Err(IoError::malformed("not a KTX2 file"));
        }

        let mut cursor = Cursor::new(&data[12..LEVEL_INDEX_OFFSET]);
        let header = Ktx2Header::read_from(&mut cursor)?;
        let index = Index::read_from(&mut cursor)?;

        let entries = header.level_count.max(1) as usize;
        let level_bytes = region(
            data,
            LEVEL_INDEX_OFFSET as u64,
            (entries * LEVEL_ENTRY_SIZE) as u64,
            "level index",
        )?;
        let mut cursor = Cursor::new(level_bytes);
        let levels = (0..entries)
            .map(|_| LevelIndex::read_from(&mut cursor))
            .collect::<IoResult<Vec<_>>>()?;

        let format = PixelFormat::from_id(header.vk_format)
            .ok_or_else(|| IoError::UnsupportedFormat(format!("VkFormat {}", header.vk_format)))?;
        let scheme = SuperCompression::supported(header.supercompression)?;
        if header.face_count == 0 {
            return Err(IoError::malformed("face count is 0"));
        }

        let dfd_bytes = region(data, index.dfd_offset as u64, index.dfd_length as u64, "DFD")?;
        let dfd = DataFormatDescriptor::parse(dfd_bytes, format)?;

        let metadata = if index.kvd_length > 0 {
            let kvd = region(data, index.kvd_offset as u64, index.kvd_length as u64, "KVD")?;
            Some(KeyValueData::parse_kvd(kvd)?)
        } else {
            None
        };

        let level0 = levels[0];
        region(data, level0.byte_offset, level0.byte_length, "level 0")?;
        let expected = layout_of(&header).total_size(format).map_err(|e| {
            if e.is_format_error() {
                IoError::Core(e)
            } else {
                IoError::malformed(format!("level 0 size: {e}"))
            }
        })?;
        if level0.uncompressed_length != expected as u64 {
            return Err(IoError::malformed(format!(
                "level 0 uncompressed length {} does not match {expected} bytes of {}",
                level0.uncompressed_length,
                format.name()
            )));
        }

        debug!(
            format = format.name(),
            width = header.pixel_width,
            height = header.pixel_height,
            faces = header.face_count,
            layers = header.layer_count,
            scheme = ?scheme,
            "Parsed KTX2 header"
        );
        Ok(Self {
            header,
            index,
            levels,
            format,
            scheme,
            dfd,
            metadata,
            source: Some(source),
        })
    }

    /// Raw header fields.
    pub fn header(&self) -> &Ktx2Header {
        &self.header
    }

    /// DFD / KVD / SGD index.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Level index entries, `max(1, levelCount)` of them.
    pub fn levels(&self) -> &[LevelIndex] {
        &self.levels
    }

    /// Parsed Data Format Descriptor.
    pub fn dfd(&self) -> &DataFormatDescriptor {
        &self.dfd
    }

    /// Payload supercompression.
    pub fn supercompression(&self) -> SuperCompression {
        self.scheme
    }

    /// Layout of the level-0 payload.
    pub fn layout(&self) -> BufferLayout {
        layout_of(&self.header)
    }

    /// Level-0 payload after supercompression is undone.
    ///
    /// The declared uncompressed length was checked against the format and
    /// dimensions at parse time and bounds the inflated size.
    pub fn payload(&self) -> IoResult<Vec<u8>> {
        let source = self
            .source
            .as_ref()
            .ok_or(IoError::Core(ktx_core::Error::UseAfterDestroy))?;
        let level = self.levels[0];
        let stored = region(source.bytes(), level.byte_offset, level.byte_length, "level 0")?;
        let expected = self.layout().total_size(self.format)?;

        let payload = match self.scheme {
            SuperCompression::None => {
                if stored.len() != expected {
                    return Err(IoError::CorruptPayload {
                        expected,
                        actual: stored.len(),
                    });
                }
                stored.to_vec()
            }
            SuperCompression::Zlib => zlib::decompress(stored, expected)?,
            other => return Err(IoError::UnsupportedSuperCompression(other.as_u32())),
        };
        debug!(stored = stored.len(), inflated = payload.len(), "Decoded level 0");
        Ok(payload)
    }
}

impl ImageHeader for KtxHeader {
    fn format(&self) -> PixelFormat {
        self.format
    }

    fn width(&self) -> u32 {
        self.header.pixel_width
    }

    fn height(&self) -> u32 {
        self.header.pixel_height
    }

    fn depth(&self) -> u32 {
        self.header.pixel_depth
    }

    fn level_count(&self) -> u32 {
        self.header.level_count
    }

    fn layer_count(&self) -> u32 {
        self.header.layer_count
    }

    fn face_count(&self) -> u32 {
        self.header.face_count
    }

    fn data(&self) -> IoResult<PixelBuffer> {
        let payload = self.payload()?;
        Ok(PixelBuffer::from_raw(payload, self.format, self.layout())?)
    }

    fn metadata(&self) -> Option<&KeyValueData> {
        self.metadata.as_ref()
    }

    fn destroy(&mut self) {
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_bounds() {
        let data = [0u8; 16];
        assert_eq!(region(&data, 4, 8, "x").unwrap().len(), 8);
        assert!(region(&data, 12, 8, "x").is_err());
        assert!(region(&data, u64::MAX, 2, "x").is_err());
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = vec![0u8; 128];
        data[..12].copy_from_slice(&KTX2_IDENTIFIER);
        data[1] = b'X';
        assert!(matches!(
            KtxReader::new().read_from_memory(&data),
            Err(IoError::MalformedContainer(_))
        ));
        assert!(matches!(
            KtxReader::new().read_from_memory(&KTX2_IDENTIFIER),
            Err(IoError::MalformedContainer(_))
        ));
    }
}
