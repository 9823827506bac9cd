//! Data Format Descriptor.
//!
//! A DFD is a `u32` total size followed by one or more descriptor blocks.
//! Each basic block is a 24-byte header and one 16-byte sample record per
//! component:
//!
//! ```text
//! word 0  vendorId:17 | descriptorType:15
//! word 1  versionNumber:16 | descriptorBlockSize:16
//! word 2  colorModel:8 | colorPrimaries:8 | transferFunction:8 | flags:8
//! word 3  texelBlockDimension[4]
//! word 4  bytesPlane[0..4]
//! word 5  bytesPlane[4..8]
//! sample  bitOffset:16 | bitLength:8 | channelType:8, samplePosition[4], sampleLower, sampleUpper
//! ```

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use ktx_core::PixelFormat;
use tracing::{debug, trace};

use crate::{IoError, IoResult};

/// Block header bytes.
pub const DFD_HEADER_SIZE: usize = 24;
/// Bytes per sample record.
pub const DFD_SAMPLE_SIZE: usize = 16;

/// Version of the basic descriptor block.
pub const KHR_DF_VERSION: u16 = 2;
/// RGB(A) color model.
pub const KHR_DF_MODEL_RGBSDA: u8 = 1;
/// BT.709 / sRGB primaries.
pub const KHR_DF_PRIMARIES_BT709: u8 = 1;
/// Linear transfer.
pub const KHR_DF_TRANSFER_LINEAR: u8 = 1;
/// sRGB transfer.
pub const KHR_DF_TRANSFER_SRGB: u8 = 2;

const CHANNEL_ALPHA: u8 = 15;

/// Size of one basic block describing `format`.
pub fn block_size(format: PixelFormat) -> usize {
    DFD_HEADER_SIZE + DFD_SAMPLE_SIZE * format.component_count().max(0) as usize
}

/// One sample (component) record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DfdSample {
    bit_offset: u16,
    bit_length: u8,
    channel_type: u8,
    position: [u8; 4],
    lower: u32,
    upper: u32,
}

impl DfdSample {
    /// First bit of the sample inside the texel.
    pub fn bit_offset(&self) -> u16 {
        self.bit_offset
    }

    /// Number of bits in the sample.
    pub fn bit_length(&self) -> u32 {
        self.bit_length as u32 + 1
    }

    /// Channel id with qualifier flags in the high nibble.
    pub fn channel_type(&self) -> u8 {
        self.channel_type
    }

    /// Channel id without qualifiers.
    pub fn channel_id(&self) -> u8 {
        self.channel_type & 0x0F
    }

    /// Sample position inside the texel block.
    pub fn position(&self) -> [u8; 4] {
        self.position
    }

    /// Value mapped to the lower end of the range (raw bits).
    pub fn lower(&self) -> u32 {
        self.lower
    }

    /// Value mapped to the upper end of the range (raw bits).
    pub fn upper(&self) -> u32 {
        self.upper
    }

    fn parse(data: &[u8]) -> Self {
        Self {
            bit_offset: LittleEndian::read_u16(&data[0..2]),
            bit_length: data[2],
            channel_type: data[3],
            position: [data[4], data[5], data[6], data[7]],
            lower: LittleEndian::read_u32(&data[8..12]),
            upper: LittleEndian::read_u32(&data[12..16]),
        }
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_u16::<LittleEndian>(self.bit_offset)?;
        writer.write_u8(self.bit_length)?;
        writer.write_u8(self.channel_type)?;
        writer.write_all(&self.position)?;
        writer.write_u32::<LittleEndian>(self.lower)?;
        writer.write_u32::<LittleEndian>(self.upper)?;
        Ok(())
    }
}

/// One descriptor block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DfdBlock {
    vendor_id: u32,
    descriptor_type: u32,
    version: u16,
    block_size: u16,
    color_model: u8,
    primaries: u8,
    transfer: u8,
    flags: u8,
    texel_block_dimension: [u8; 4],
    bytes_plane: [u8; 8],
    samples: Vec<DfdSample>,
}

impl DfdBlock {
    /// Basic block for an uncompressed format.
    ///
    /// Declares the RGBSDA model, BT.709 primaries and a linear transfer;
    /// data must already be linear.
    pub fn for_format(format: PixelFormat) -> IoResult<Self> {
        let components = format.component_count();
        if components <= 0 {
            return Err(IoError::UnsupportedFormat(format!(
                "no DFD for {}",
                format.name()
            )));
        }
        let texel = format.texel_size()?;
        let data_type = format.data_type();
        let layout = if format.is_packed() {
            packed_channels(format).ok_or_else(|| {
                IoError::UnsupportedFormat(format!("no DFD for {}", format.name()))
            })?
        } else {
            let bits = (texel * 8 / components as usize) as u32;
            channel_ids(components as usize, format.is_reverse_order())
                .into_iter()
                .enumerate()
                .map(|(i, channel)| (channel, i as u32 * bits, bits))
                .collect()
        };

        let samples = layout
            .into_iter()
            .map(|(channel, offset, bits)| {
                let (lower, upper) = sample_range(format, bits);
                DfdSample {
                    bit_offset: offset as u16,
                    bit_length: (bits - 1) as u8,
                    channel_type: channel | data_type,
                    position: [0; 4],
                    lower,
                    upper,
                }
            })
            .collect::<Vec<_>>();

        let mut bytes_plane = [0u8; 8];
        bytes_plane[0] = texel as u8;
        Ok(Self {
            vendor_id: 0,
            descriptor_type: 0,
            version: KHR_DF_VERSION,
            block_size: block_size(format) as u16,
            color_model: KHR_DF_MODEL_RGBSDA,
            primaries: KHR_DF_PRIMARIES_BT709,
            transfer: KHR_DF_TRANSFER_LINEAR,
            flags: 0,
            texel_block_dimension: [0; 4],
            bytes_plane,
            samples,
        })
    }

    /// Khronos vendor id (0).
    pub fn vendor_id(&self) -> u32 {
        self.vendor_id
    }

    /// Descriptor type (0 = basic).
    pub fn descriptor_type(&self) -> u32 {
        self.descriptor_type
    }

    /// Block version number.
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Block size in bytes, header included.
    pub fn block_size(&self) -> usize {
        self.block_size as usize
    }

    /// Color model.
    pub fn color_model(&self) -> u8 {
        self.color_model
    }

    /// Color primaries.
    pub fn primaries(&self) -> u8 {
        self.primaries
    }

    /// Transfer function.
    pub fn transfer(&self) -> u8 {
        self.transfer
    }

    /// Block flags.
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Texel block dimensions minus one.
    pub fn texel_block_dimension(&self) -> [u8; 4] {
        self.texel_block_dimension
    }

    /// Bytes per plane.
    pub fn bytes_plane(&self) -> [u8; 8] {
        self.bytes_plane
    }

    /// Sample records.
    pub fn samples(&self) -> &[DfdSample] {
        &self.samples
    }

    fn parse(data: &[u8]) -> IoResult<Self> {
        if data.len() < DFD_HEADER_SIZE {
            return Err(IoError::malformed("truncated DFD block header"));
        }
        let word0 = LittleEndian::read_u32(&data[0..4]);
        let word1 = LittleEndian::read_u32(&data[4..8]);
        let block_size = (word1 >> 16) as u16;
        if (block_size as usize) < DFD_HEADER_SIZE || block_size as usize > data.len() {
            return Err(IoError::malformed(format!("bad DFD block size {block_size}")));
        }
        let samples = data[DFD_HEADER_SIZE..block_size as usize]
            .chunks_exact(DFD_SAMPLE_SIZE)
            .map(DfdSample::parse)
            .collect();

        let mut bytes_plane = [0u8; 8];
        bytes_plane.copy_from_slice(&data[16..24]);
        Ok(Self {
            vendor_id: word0 & 0x1_FFFF,
            descriptor_type: word0 >> 17,
            version: (word1 & 0xFFFF) as u16,
            block_size,
            color_model: data[8],
            primaries: data[9],
            transfer: data[10],
            flags: data[11],
            texel_block_dimension: [data[12], data[13], data[14], data[15]],
            bytes_plane,
            samples,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> IoResult<()> {
        writer.write_u32::<LittleEndian>(self.vendor_id | (self.descriptor_type << 17))?;
        writer.write_u32::<LittleEndian>(self.version as u32 | ((self.block_size as u32) << 16))?;
        writer.write_all(&[self.color_model, self.primaries, self.transfer, self.flags])?;
        writer.write_all(&self.texel_block_dimension)?;
        writer.write_all(&self.bytes_plane)?;
        for sample in &self.samples {
            sample.write_to(writer)?;
        }
        Ok(())
    }
}

/// Channel ids in storage order.
fn channel_ids(components: usize, reverse: bool) -> Vec<u8> {
    let mut ids: Vec<u8> = match components {
        1 => vec![0],
        2 => vec![0, 1],
        3 => vec![0, 1, 2],
        _ => vec![0, 1, 2, CHANNEL_ALPHA],
    };
    if reverse {
        ids.reverse();
    }
    ids
}

/// `(channel, bit offset, bit length)` of each channel of a packed format,
/// lowest bits first.
///
/// The first channel in the name occupies the most significant bits.
/// Returns `None` for layouts with exponent, padding or depth channels.
fn packed_channels(format: PixelFormat) -> Option<Vec<(u8, u32, u32)>> {
    let layout = format.name().strip_prefix("VK_FORMAT_")?.split('_').next()?;
    let mut channels = Vec::new();
    let mut rest = layout;
    while let Some(letter) = rest.chars().next() {
        let channel = match letter {
            'R' => 0,
            'G' => 1,
            'B' => 2,
            'A' => CHANNEL_ALPHA,
            _ => return None,
        };
        let digits = rest[1..].find(|c: char| !c.is_ascii_digit()).map_or(rest.len(), |n| n + 1);
        let bits: u32 = rest[1..digits].parse().ok()?;
        channels.push((channel, bits));
        rest = &rest[digits..];
    }

    let total: u32 = channels.iter().map(|&(_, bits)| bits).sum();
    if channels.len() != format.component_count() as usize || total != format.byte_size() as u32 * 8 {
        return None;
    }
    let mut offset = 0;
    Some(
        channels
            .into_iter()
            .rev()
            .map(|(channel, bits)| {
                let sample = (channel, offset, bits);
                offset += bits;
                sample
            })
            .collect(),
    )
}

/// Raw `sampleLower` / `sampleUpper` for one sample.
fn sample_range(format: PixelFormat, bits: u32) -> (u32, u32) {
    if format.is_float() {
        ((-1.0f32).to_bits(), 1.0f32.to_bits())
    } else {
        (0, ((1u64 << bits.min(32)) - 1) as u32)
    }
}

/// Parsed or synthesized DFD.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataFormatDescriptor {
    total_size: u32,
    blocks: Vec<DfdBlock>,
}

impl DataFormatDescriptor {
    /// Single-block descriptor for `format`.
    pub fn for_format(format: PixelFormat) -> IoResult<Self> {
        let block = DfdBlock::for_format(format)?;
        Ok(Self {
            total_size: (4 + block.block_size()) as u32,
            blocks: vec![block],
        })
    }

    /// Parses a DFD region (total size field included).
    ///
    /// The block count is `(totalSize - 4) / blockSize(format)`; formats
    /// without a component count fall back to the size each block declares.
    /// The first block must be a Khronos basic block, version 2.
    pub fn parse(data: &[u8], format: PixelFormat) -> IoResult<Self> {
        trace!(len = data.len(), format = format.name(), "DataFormatDescriptor::parse");
        if data.len() < 4 {
            return Err(IoError::malformed("truncated DFD size"));
        }
        let total_size = LittleEndian::read_u32(&data[0..4]);
        if total_size as usize > data.len() || (total_size as usize) < 4 {
            return Err(IoError::malformed(format!(
                "DFD size {total_size} outside region of {} bytes",
                data.len()
            )));
        }
        let body = &data[4..total_size as usize];

        let expected = (format.component_count() > 0).then(|| block_size(format));
        let mut blocks = Vec::new();
        let mut offset = 0usize;
        while offset < body.len() {
            let block = DfdBlock::parse(&body[offset..])?;
            if let Some(size) = expected {
                if block.block_size() != size {
                    return Err(IoError::malformed(format!(
                        "DFD block size {} does not match {} for {}",
                        block.block_size(),
                        size,
                        format.name()
                    )));
                }
            }
            offset += block.block_size();
            blocks.push(block);
        }

        let first = blocks
            .first()
            .ok_or_else(|| IoError::malformed("empty DFD"))?;
        if first.version != KHR_DF_VERSION || first.vendor_id != 0 || first.descriptor_type != 0 {
            return Err(IoError::malformed(format!(
                "unsupported DFD block: vendor {} type {} version {}",
                first.vendor_id, first.descriptor_type, first.version
            )));
        }
        debug!(blocks = blocks.len(), total_size, "Parsed DFD");
        Ok(Self { total_size, blocks })
    }

    /// Encoded size, including the size field.
    pub fn total_size(&self) -> usize {
        self.total_size as usize
    }

    /// Descriptor blocks.
    pub fn blocks(&self) -> &[DfdBlock] {
        &self.blocks
    }

    /// Number of descriptor blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Writes the descriptor, returning the bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> IoResult<usize> {
        writer.write_u32::<LittleEndian>(self.total_size)?;
        for block in &self.blocks {
            block.write_to(writer)?;
        }
        Ok(self.total_size as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb32f_descriptor() {
        let dfd = DataFormatDescriptor::for_format(PixelFormat::R32G32B32_SFLOAT).unwrap();
        assert_eq!(dfd.total_size(), 4 + 24 + 3 * 16);

        let block = &dfd.blocks()[0];
        assert_eq!(block.color_model(), KHR_DF_MODEL_RGBSDA);
        assert_eq!(block.primaries(), KHR_DF_PRIMARIES_BT709);
        assert_eq!(block.transfer(), KHR_DF_TRANSFER_LINEAR);
        assert_eq!(block.bytes_plane()[0], 12);

        let offsets: Vec<u16> = block.samples().iter().map(DfdSample::bit_offset).collect();
        assert_eq!(offsets, vec![0, 32, 64]);
        let green = block.samples()[1];
        assert_eq!(green.bit_length(), 32);
        assert_eq!(green.channel_id(), 1);
        assert_eq!(green.channel_type() & 0xF0, 0x80 | 0x40 | 0x10);
        assert_eq!(f32::from_bits(green.lower()), -1.0);
        assert_eq!(f32::from_bits(green.upper()), 1.0);
    }

    #[test]
    fn test_unorm_and_reverse_order() {
        let dfd = DataFormatDescriptor::for_format(PixelFormat::B8G8R8_UNORM).unwrap();
        let samples = dfd.blocks()[0].samples();
        let ids: Vec<u8> = samples.iter().map(DfdSample::channel_id).collect();
        assert_eq!(ids, vec![2, 1, 0]);
        assert_eq!(samples[0].bit_length(), 8);
        assert_eq!(samples[0].upper(), 255);
        assert_eq!(samples[0].lower(), 0);
    }

    #[test]
    fn test_write_then_parse() {
        let format = PixelFormat::R16G16B16A16_SFLOAT;
        let dfd = DataFormatDescriptor::for_format(format).unwrap();
        let mut bytes = Vec::new();
        assert_eq!(dfd.write_to(&mut bytes).unwrap(), bytes.len());
        assert_eq!(bytes.len(), 4 + 24 + 4 * 16);

        let parsed = DataFormatDescriptor::parse(&bytes, format).unwrap();
        assert_eq!(parsed, dfd);
        assert_eq!(parsed.block_count(), 1);
        assert_eq!(parsed.blocks()[0].version(), 2);
        assert_eq!(parsed.blocks()[0].samples()[3].channel_id(), 15);
    }

    #[test]
    fn test_parse_rejects_vendor_block() {
        let format = PixelFormat::R8_UNORM;
        let mut bytes = Vec::new();
        DataFormatDescriptor::for_format(format)
            .unwrap()
            .write_to(&mut bytes)
            .unwrap();
        bytes[4] = 1;
        assert!(matches!(
            DataFormatDescriptor::parse(&bytes, format),
            Err(IoError::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_no_descriptor_for_block_formats() {
        let bc1 = PixelFormat::from_name("BC1_RGB_UNORM_BLOCK").unwrap();
        assert!(DataFormatDescriptor::for_format(bc1).is_err());
    }

    fn sample_layout(format: PixelFormat) -> Vec<(u8, u16, u32)> {
        DataFormatDescriptor::for_format(format).unwrap().blocks()[0]
            .samples()
            .iter()
            .map(|s| (s.channel_id(), s.bit_offset(), s.bit_length()))
            .collect()
    }

    #[test]
    fn test_packed_channel_widths() {
        let r5g6b5 = PixelFormat::from_id(4).unwrap();
        assert_eq!(sample_layout(r5g6b5), vec![(2, 0, 5), (1, 5, 6), (0, 11, 5)]);
        let green = DataFormatDescriptor::for_format(r5g6b5).unwrap().blocks()[0].samples()[1];
        assert_eq!(green.upper(), 63);

        let a2r10g10b10 = PixelFormat::from_id(58).unwrap();
        assert_eq!(
            sample_layout(a2r10g10b10),
            vec![(2, 0, 10), (1, 10, 10), (0, 20, 10), (15, 30, 2)]
        );

        assert_eq!(
            sample_layout(PixelFormat::A8B8G8R8_UNORM_PACK32),
            vec![(0, 0, 8), (1, 8, 8), (2, 16, 8), (15, 24, 8)]
        );
        assert_eq!(
            sample_layout(PixelFormat::B10G11R11_UFLOAT_PACK32),
            vec![(0, 0, 11), (1, 11, 11), (2, 22, 10)]
        );
    }

    #[test]
    fn test_packed_without_color_channels() {
        for id in [123, 125] {
            let format = PixelFormat::from_id(id).unwrap();
            assert!(matches!(
                DataFormatDescriptor::for_format(format),
                Err(IoError::UnsupportedFormat(_))
            ));
        }
    }
}
