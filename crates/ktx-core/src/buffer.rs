//! Pixel buffers holding one or more same-format images.
//!
//! A [`PixelBuffer`] represents `max(1, layers) * faces * max(1, depth)`
//! images that share one [`PixelFormat`], width and height. Images are
//! stored back to back in `layer -> face -> depth slice` order, each taking
//! exactly `width * height * format.byte_size()` bytes, little-endian.
//!
//! # Storage
//!
//! A buffer either owns a packed byte buffer, or keeps the typed array it
//! was built from (bytes, shorts or ints) and packs it on first byte-level
//! access. Packing happens at most once; afterwards every read goes through
//! the packed bytes.
//!
//! Float buffers carry a [`Precision`] (32-bit or 16-bit storage) and an
//! [`HdrProperties`] luminance summary.
//!
//! # Example
//!
//! ```rust
//! use ktx_core::buffer::{BufferLayout, PixelBuffer};
//! use ktx_core::format::PixelFormat;
//!
//! let layout = BufferLayout::new(2, 1);
//! let buffer = PixelBuffer::from_bytes(
//!     vec![10, 20, 30, 40, 50, 60],
//!     PixelFormat::R8G8B8_UNORM,
//!     layout,
//! )
//! .unwrap();
//!
//! assert!(!buffer.is_materialized());
//! assert_eq!(buffer.image_bytes(0).unwrap(), &[10, 20, 30, 40, 50, 60]);
//! assert!(buffer.is_materialized());
//! ```

use std::fmt;
use std::sync::OnceLock;

use byteorder::{ByteOrder, LittleEndian};
use half::f16;
use tracing::{debug, trace};

use crate::format::{PixelFormat, Precision};
use crate::half_float;
use crate::srgb::LinearizePool;
use crate::stats::HdrProperties;
use crate::texture::TextureType;
use crate::{Error, Result};

/// Transfer function applied to the stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransferFunction {
    /// Values are linear.
    #[default]
    Linear,
    /// Values are sRGB encoded.
    Srgb,
}

/// Image counts and dimensions of a buffer.
///
/// Zero layer and depth counts mean "not an array" and "not a volume"; they
/// address the same single image as a count of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferLayout {
    /// Array layers (0 for non-array textures).
    pub layer_count: u32,
    /// Cubemap faces (1 for non-cubemaps), must be at least 1.
    pub face_count: u32,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// Depth in texels (0 for 2D textures).
    pub depth: u32,
}

impl BufferLayout {
    /// Single 2D image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            layer_count: 0,
            face_count: 1,
            width,
            height,
            depth: 0,
        }
    }

    /// Sets the face count.
    pub fn with_faces(mut self, face_count: u32) -> Self {
        self.face_count = face_count;
        self
    }

    /// Sets the layer count.
    pub fn with_layers(mut self, layer_count: u32) -> Self {
        self.layer_count = layer_count;
        self
    }

    /// Sets the depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// `max(1, layers) * faces * max(1, depth)`.
    pub fn image_count(&self) -> usize {
        (self.layer_count.max(1) as usize)
            .saturating_mul(self.face_count as usize)
            .saturating_mul(self.depth.max(1) as usize)
    }

    /// Texels in one image; a zero height counts as one row.
    pub fn texel_count(&self) -> usize {
        (self.width as usize).saturating_mul(self.height.max(1) as usize)
    }

    /// Shape of the texture this layout describes.
    pub fn texture_type(&self) -> TextureType {
        TextureType::classify(
            self.layer_count,
            self.face_count,
            self.width,
            self.height,
            self.depth,
        )
    }

    fn validate(&self) -> Result<()> {
        if self.face_count == 0 {
            return Err(Error::invalid_dimensions("face count must be at least 1"));
        }
        Ok(())
    }

    /// Bytes of one image in `format`.
    pub fn image_size(&self, format: PixelFormat) -> Result<usize> {
        let texel = format.texel_size()?;
        self.texel_count()
            .checked_mul(texel)
            .ok_or_else(|| Error::invalid_dimensions("image size overflows"))
    }

    /// Bytes of all images in `format`.
    pub fn total_size(&self, format: PixelFormat) -> Result<usize> {
        self.image_size(format)?
            .checked_mul(self.image_count())
            .ok_or_else(|| Error::invalid_dimensions("buffer size overflows"))
    }
}

/// Typed array a buffer can be built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeArray {
    /// 8-bit values.
    Bytes(Vec<u8>),
    /// 16-bit values.
    Shorts(Vec<u16>),
    /// 32-bit values.
    Ints(Vec<u32>),
}

impl NativeArray {
    /// Size of the array in bytes.
    pub fn byte_len(&self) -> usize {
        match self {
            NativeArray::Bytes(v) => v.len(),
            NativeArray::Shorts(v) => v.len() * 2,
            NativeArray::Ints(v) => v.len() * 4,
        }
    }

    /// Packs the array into little-endian bytes.
    pub fn to_packed(&self) -> Vec<u8> {
        match self {
            NativeArray::Bytes(v) => v.clone(),
            NativeArray::Shorts(v) => {
                let mut out = vec![0u8; v.len() * 2];
                LittleEndian::write_u16_into(v, &mut out);
                out
            }
            NativeArray::Ints(v) => {
                let mut out = vec![0u8; v.len() * 4];
                LittleEndian::write_u32_into(v, &mut out);
                out
            }
        }
    }
}

#[derive(Clone)]
enum Storage {
    Packed(Vec<u8>),
    Pending {
        source: NativeArray,
        packed: OnceLock<Vec<u8>>,
    },
}

impl Storage {
    fn pending(source: NativeArray) -> Self {
        Storage::Pending {
            source,
            packed: OnceLock::new(),
        }
    }

    fn bytes(&self) -> &[u8] {
        match self {
            Storage::Packed(bytes) => bytes,
            Storage::Pending { source, packed } => packed.get_or_init(|| {
                debug!(bytes = source.byte_len(), "Materializing packed buffer");
                source.to_packed()
            }),
        }
    }

    fn is_materialized(&self) -> bool {
        match self {
            Storage::Packed(_) => true,
            Storage::Pending { packed, .. } => packed.get().is_some(),
        }
    }

    fn into_packed(self) -> Vec<u8> {
        match self {
            Storage::Packed(bytes) => bytes,
            Storage::Pending { source, packed } => {
                packed.into_inner().unwrap_or_else(|| source.to_packed())
            }
        }
    }
}

/// One or more same-format, same-size images.
#[derive(Clone)]
pub struct PixelBuffer {
    format: PixelFormat,
    layout: BufferLayout,
    precision: Option<Precision>,
    transfer: TransferFunction,
    hdr: OnceLock<HdrProperties>,
    storage: Option<Storage>,
}

impl PixelBuffer {
    fn build(
        storage: Storage,
        format: PixelFormat,
        layout: BufferLayout,
        precision: Option<Precision>,
    ) -> Self {
        Self {
            format,
            layout,
            precision,
            transfer: TransferFunction::Linear,
            hdr: OnceLock::new(),
            storage: Some(storage),
        }
    }

    fn check_layout(format: PixelFormat, layout: &BufferLayout, actual: usize) -> Result<()> {
        layout.validate()?;
        let expected = layout.total_size(format)?;
        if expected != actual {
            return Err(Error::size_mismatch(expected, actual));
        }
        Ok(())
    }

    fn require_integer(format: PixelFormat) -> Result<()> {
        if format.is_float() {
            return Err(Error::wrong_constructor(format.name()));
        }
        Ok(())
    }

    fn require_precision(format: PixelFormat) -> Result<Precision> {
        format
            .precision()
            .ok_or_else(|| Error::wrong_constructor(format.name()))
    }

    /// Wraps packed bytes of a non-float format.
    pub fn from_packed(data: Vec<u8>, format: PixelFormat, layout: BufferLayout) -> Result<Self> {
        trace!(format = format.name(), len = data.len(), "PixelBuffer::from_packed");
        Self::require_integer(format)?;
        Self::check_layout(format, &layout, data.len())?;
        Ok(Self::build(Storage::Packed(data), format, layout, None))
    }

    /// Wraps packed bytes of any per-texel format.
    ///
    /// Used by decoders that already hold the buffer layout, such as the
    /// container reader. Float formats get their precision from the format
    /// and compute the luminance summary on first request.
    pub fn from_raw(data: Vec<u8>, format: PixelFormat, layout: BufferLayout) -> Result<Self> {
        trace!(format = format.name(), len = data.len(), "PixelBuffer::from_raw");
        Self::check_layout(format, &layout, data.len())?;
        Ok(Self::build(Storage::Packed(data), format, layout, format.precision()))
    }

    /// Builds a float buffer from 32-bit floats.
    ///
    /// `format` must be a 32-bit or 16-bit float format; 16-bit targets
    /// are encoded with [`half_float::encode`]. Without `summary`, the
    /// luminance summary is computed over all samples.
    pub fn from_f32(
        data: &[f32],
        format: PixelFormat,
        layout: BufferLayout,
        summary: Option<HdrProperties>,
    ) -> Result<Self> {
        trace!(format = format.name(), len = data.len(), "PixelBuffer::from_f32");
        let precision = Self::require_precision(format)?;
        let components = format.component_count() as usize;
        Self::check_layout(format, &layout, data.len() * precision.bytes())?;

        let summary = summary.unwrap_or_else(|| HdrProperties::from_samples(data, components));
        let packed = match precision {
            Precision::F32 => {
                let mut out = vec![0u8; data.len() * 4];
                LittleEndian::write_f32_into(data, &mut out);
                out
            }
            Precision::F16 => {
                let mut out = vec![0u8; data.len() * 2];
                LittleEndian::write_u16_into(&half_float::encode_slice(data), &mut out);
                out
            }
        };

        let buffer = Self::build(Storage::Packed(packed), format, layout, Some(precision));
        let _ = buffer.hdr.set(summary);
        Ok(buffer)
    }

    /// Builds a half-float buffer from 16-bit floats.
    ///
    /// The halves are kept as-is and packed lazily.
    pub fn from_f16(
        data: Vec<f16>,
        format: PixelFormat,
        layout: BufferLayout,
        summary: Option<HdrProperties>,
    ) -> Result<Self> {
        trace!(format = format.name(), len = data.len(), "PixelBuffer::from_f16");
        let precision = Self::require_precision(format)?;
        if precision != Precision::F16 {
            return Err(Error::wrong_constructor(format.name()));
        }
        Self::check_layout(format, &layout, data.len() * 2)?;

        let bits: Vec<u16> = data.into_iter().map(f16::to_bits).collect();
        let summary = summary.unwrap_or_else(|| {
            HdrProperties::from_samples(
                &half_float::decode_slice(&bits),
                format.component_count() as usize,
            )
        });

        let buffer = Self::build(
            Storage::pending(NativeArray::Shorts(bits)),
            format,
            layout,
            Some(precision),
        );
        let _ = buffer.hdr.set(summary);
        Ok(buffer)
    }

    /// Builds a buffer over a typed array, packed on first access.
    pub fn from_array(source: NativeArray, format: PixelFormat, layout: BufferLayout) -> Result<Self> {
        trace!(format = format.name(), len = source.byte_len(), "PixelBuffer::from_array");
        Self::require_integer(format)?;
        Self::check_layout(format, &layout, source.byte_len())?;
        Ok(Self::build(Storage::pending(source), format, layout, None))
    }

    /// Builds a buffer over a byte array, packed on first access.
    pub fn from_bytes(data: Vec<u8>, format: PixelFormat, layout: BufferLayout) -> Result<Self> {
        Self::from_array(NativeArray::Bytes(data), format, layout)
    }

    /// Builds a buffer over a short array, packed on first access.
    pub fn from_shorts(data: Vec<u16>, format: PixelFormat, layout: BufferLayout) -> Result<Self> {
        Self::from_array(NativeArray::Shorts(data), format, layout)
    }

    /// Builds a buffer over an int array, packed on first access.
    pub fn from_ints(data: Vec<u32>, format: PixelFormat, layout: BufferLayout) -> Result<Self> {
        Self::from_array(NativeArray::Ints(data), format, layout)
    }

    /// Tags the stored values with a transfer function.
    pub fn with_transfer(mut self, transfer: TransferFunction) -> Self {
        self.transfer = transfer;
        self
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Counts and dimensions.
    #[inline]
    pub fn layout(&self) -> BufferLayout {
        self.layout
    }

    /// Array layer count.
    #[inline]
    pub fn layer_count(&self) -> u32 {
        self.layout.layer_count
    }

    /// Face count.
    #[inline]
    pub fn face_count(&self) -> u32 {
        self.layout.face_count
    }

    /// Width in texels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    /// Height in texels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Depth in texels.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.layout.depth
    }

    /// Float storage precision, `None` for integer formats.
    #[inline]
    pub fn precision(&self) -> Option<Precision> {
        self.precision
    }

    /// Transfer function of the stored values.
    #[inline]
    pub fn transfer(&self) -> TransferFunction {
        self.transfer
    }

    /// Number of images in the buffer.
    #[inline]
    pub fn image_count(&self) -> usize {
        self.layout.image_count()
    }

    /// Bytes of one image.
    pub fn image_size(&self) -> usize {
        self.layout.texel_count() * self.format.byte_size().max(0) as usize
    }

    /// Shape of the texture.
    pub fn texture_type(&self) -> TextureType {
        self.layout.texture_type()
    }

    /// Returns `true` once `destroy()` has been called.
    pub fn is_destroyed(&self) -> bool {
        self.storage.is_none()
    }

    /// Returns `true` if the packed bytes exist.
    pub fn is_materialized(&self) -> bool {
        self.storage.as_ref().is_some_and(Storage::is_materialized)
    }

    fn storage(&self) -> Result<&Storage> {
        self.storage.as_ref().ok_or(Error::UseAfterDestroy)
    }

    /// The whole packed buffer, materializing it if needed.
    pub fn packed(&self) -> Result<&[u8]> {
        Ok(self.storage()?.bytes())
    }

    /// Takes the packed buffer out of the pixel buffer.
    pub fn into_packed(self) -> Result<Vec<u8>> {
        self.storage
            .map(Storage::into_packed)
            .ok_or(Error::UseAfterDestroy)
    }

    /// Byte window of image `index`.
    pub fn image_bytes(&self, index: usize) -> Result<&[u8]> {
        let bytes = self.packed()?;
        let count = self.image_count();
        if index >= count {
            return Err(Error::index_out_of_range(index, count));
        }
        let size = self.image_size();
        Ok(&bytes[index * size..(index + 1) * size])
    }

    /// Decodes image `index` to per-channel floats.
    ///
    /// Float formats return their values directly; 8-bit and 16-bit
    /// integer formats are normalized to `0..=1`. Channels of
    /// reverse-order formats are flipped to R-first order.
    pub fn as_f32(&self, index: usize) -> Result<Vec<f32>> {
        let bytes = self.image_bytes(index)?;

        let mut out = match self.precision {
            Some(Precision::F32) => {
                let mut out = vec![0f32; bytes.len() / 4];
                LittleEndian::read_f32_into(bytes, &mut out);
                out
            }
            Some(Precision::F16) => {
                let mut bits = vec![0u16; bytes.len() / 2];
                LittleEndian::read_u16_into(bytes, &mut bits);
                half_float::decode_slice(&bits)
            }
            None if self.format.is_float() => {
                return Err(Error::not_available(self.format.name()));
            }
            None => match self.format.component_size() {
                Some(1) => bytes.iter().map(|&b| b as f32 / 255.0).collect(),
                Some(2) => {
                    let mut shorts = vec![0u16; bytes.len() / 2];
                    LittleEndian::read_u16_into(bytes, &mut shorts);
                    shorts.into_iter().map(|s| s as f32 / 65535.0).collect()
                }
                _ => return Err(Error::not_available(self.format.name())),
            },
        };

        let components = self.format.component_count() as usize;
        if self.format.is_reverse_order() && (2..=4).contains(&components) {
            out.chunks_exact_mut(components).for_each(<[f32]>::reverse);
        }
        Ok(out)
    }

    /// Luminance summary of a float buffer, `None` for integer formats.
    ///
    /// Buffers built from float arrays carry the summary from construction;
    /// buffers wrapping packed float bytes compute it over all images on
    /// first request.
    pub fn hdr_properties(&self) -> Result<Option<HdrProperties>> {
        if let Some(props) = self.hdr.get() {
            return Ok(Some(*props));
        }
        if self.precision.is_none() {
            return Ok(None);
        }
        let components = self.format.component_count() as usize;
        let mut props = HdrProperties::new();
        for index in 0..self.image_count() {
            props.add_samples(&self.as_f32(index)?, components);
        }
        Ok(Some(*self.hdr.get_or_init(|| props)))
    }

    /// Replaces the luminance summary.
    pub fn set_hdr_properties(&mut self, props: HdrProperties) {
        self.hdr = OnceLock::from(props);
    }

    /// Converts sRGB-encoded 8-bit or 16-bit values to linear in place.
    ///
    /// Works on the packed bytes, so a pending typed array is materialized
    /// first. `A8B8G8R8` packed words keep their alpha byte. sRGB formats
    /// switch to their UNORM counterpart. Buffers that are already linear
    /// are left untouched.
    pub fn linearize(&mut self, pool: &LinearizePool) -> Result<()> {
        if self.transfer == TransferFunction::Linear && !self.format.is_srgb() {
            return Ok(());
        }
        trace!(format = self.format.name(), "PixelBuffer::linearize");
        let component_size = if is_abgr8_pack32(self.format) {
            4
        } else {
            self.format
                .component_size()
                .filter(|_| !self.format.is_float())
                .ok_or_else(|| Error::not_available(self.format.name()))?
        };

        let mut bytes = self
            .storage
            .take()
            .ok_or(Error::UseAfterDestroy)?
            .into_packed();
        match component_size {
            1 => {
                pool.to_linear_u8(&mut bytes);
            }
            2 => {
                let mut shorts = vec![0u16; bytes.len() / 2];
                LittleEndian::read_u16_into(&bytes, &mut shorts);
                pool.to_linear_u16(&mut shorts);
                LittleEndian::write_u16_into(&shorts, &mut bytes);
            }
            4 => {
                let mut words = vec![0u32; bytes.len() / 4];
                LittleEndian::read_u32_into(&bytes, &mut words);
                pool.to_linear_u32(&mut words);
                LittleEndian::write_u32_into(&words, &mut bytes);
            }
            _ => {
                self.storage = Some(Storage::Packed(bytes));
                return Err(Error::not_available(self.format.name()));
            }
        }
        self.storage = Some(Storage::Packed(bytes));

        if self.format.is_srgb() {
            self.format = self.format.to_unorm()?;
        }
        self.transfer = TransferFunction::Linear;
        Ok(())
    }

    /// Releases the backing storage.
    ///
    /// Every later accessor fails with [`Error::UseAfterDestroy`].
    pub fn destroy(&mut self) {
        debug!(format = self.format.name(), "PixelBuffer destroyed");
        self.storage = None;
        self.hdr = OnceLock::new();
    }
}

/// 8-bit channels packed into one little-endian 32-bit word, alpha on top.
fn is_abgr8_pack32(format: PixelFormat) -> bool {
    matches!(format.id(), 51..=57)
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("format", &self.format.name())
            .field("layout", &self.layout)
            .field("precision", &self.precision)
            .field("transfer", &self.transfer)
            .field("materialized", &self.is_materialized())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rgb_layout() -> BufferLayout {
        BufferLayout::new(2, 2)
    }

    #[test]
    fn test_layout_counts() {
        let layout = BufferLayout::new(4, 4).with_faces(6).with_layers(2).with_depth(0);
        assert_eq!(layout.image_count(), 12);
        assert_eq!(layout.image_size(PixelFormat::R8G8B8A8_UNORM).unwrap(), 64);
        assert_eq!(BufferLayout::new(4, 4).with_depth(3).image_count(), 3);
        assert!(layout.texture_type().is_cubemap());
    }

    #[test]
    fn test_huge_layout_overflows_to_error() {
        let layout = BufferLayout::new(u32::MAX, u32::MAX)
            .with_faces(u32::MAX)
            .with_layers(u32::MAX)
            .with_depth(u32::MAX);
        assert!(matches!(
            layout.total_size(PixelFormat::R32G32B32A32_SFLOAT),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_zero_faces_rejected() {
        let layout = BufferLayout::new(2, 2).with_faces(0);
        let err = PixelBuffer::from_packed(vec![], PixelFormat::R8G8B8_UNORM, layout).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
    }

    #[test]
    fn test_size_mismatch() {
        let err = PixelBuffer::from_bytes(vec![0; 11], PixelFormat::R8G8B8_UNORM, rgb_layout())
            .unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 12, actual: 11 }));

        let err = PixelBuffer::from_f32(&[0.0; 10], PixelFormat::R32G32B32_SFLOAT, rgb_layout(), None)
            .unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 48, actual: 40 }));
    }

    #[test]
    fn test_wrong_constructor() {
        let err = PixelBuffer::from_packed(vec![0; 48], PixelFormat::R32G32B32_SFLOAT, rgb_layout())
            .unwrap_err();
        assert!(matches!(err, Error::WrongConstructor { .. }));
        let err = PixelBuffer::from_f32(&[0.0; 12], PixelFormat::R8G8B8_UNORM, rgb_layout(), None)
            .unwrap_err();
        assert!(matches!(err, Error::WrongConstructor { .. }));
        let err = PixelBuffer::from_f16(
            vec![f16::ZERO; 12],
            PixelFormat::R32G32B32_SFLOAT,
            rgb_layout(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::WrongConstructor { .. }));
    }

    #[test]
    fn test_block_compressed_rejected() {
        let bc1 = PixelFormat::from_id(131).unwrap();
        let err = PixelBuffer::from_packed(vec![0; 8], bc1, rgb_layout()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_image_windows() {
        let layout = BufferLayout::new(1, 1).with_faces(3);
        let buffer =
            PixelBuffer::from_packed((0u8..9).collect(), PixelFormat::R8G8B8_UNORM, layout).unwrap();
        assert_eq!(buffer.image_count(), 3);
        assert_eq!(buffer.image_bytes(1).unwrap(), &[3, 4, 5]);
        assert_eq!(buffer.image_bytes(2).unwrap(), &[6, 7, 8]);
        let err = buffer.image_bytes(3).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 3, count: 3 }));
    }

    #[test]
    fn test_lazy_shorts_and_ints() {
        let shorts = PixelBuffer::from_shorts(vec![0x0102, 0xFFFF], PixelFormat::R16_UNORM, BufferLayout::new(2, 1))
            .unwrap();
        assert!(!shorts.is_materialized());
        assert_eq!(shorts.packed().unwrap(), &[0x02, 0x01, 0xFF, 0xFF]);
        assert!(shorts.is_materialized());
        let values = shorts.as_f32(0).unwrap();
        assert_relative_eq!(values[1], 1.0);

        let ints = PixelBuffer::from_ints(vec![0x4030_2010], PixelFormat::R8G8B8A8_UNORM, BufferLayout::new(1, 1))
            .unwrap();
        assert_eq!(ints.packed().unwrap(), &[0x10, 0x20, 0x30, 0x40]);
    }

    #[test]
    fn test_reverse_order_decode() {
        let bgr = PixelBuffer::from_bytes(vec![0, 51, 255], PixelFormat::B8G8R8_UNORM, BufferLayout::new(1, 1))
            .unwrap();
        assert_eq!(bgr.as_f32(0).unwrap(), vec![1.0, 0.2, 0.0]);

        let abgr = PixelBuffer::from_bytes(
            vec![255, 0, 51, 102],
            PixelFormat::A8B8G8R8_UNORM_PACK32,
            BufferLayout::new(1, 1),
        )
        .unwrap();
        assert_eq!(abgr.as_f32(0).unwrap(), vec![0.4, 0.2, 0.0, 1.0]);
    }

    #[test]
    fn test_float_buffers() {
        let data = [0.5f32, 1.0, 2.0, 4.0, 0.0, 0.25, 1.5, 1.5, 1.5, 8.0, 8.0, 8.0];
        let f32_buffer = PixelBuffer::from_f32(&data, PixelFormat::R32G32B32_SFLOAT, rgb_layout(), None).unwrap();
        assert_eq!(f32_buffer.precision(), Some(Precision::F32));
        assert_eq!(f32_buffer.as_f32(0).unwrap(), data.to_vec());
        let props = f32_buffer.hdr_properties().unwrap().unwrap();
        assert_eq!(props.max_value(), 8.0);
        assert_eq!(props.count(), 4);

        let f16_buffer = PixelBuffer::from_f32(&data, PixelFormat::R16G16B16_SFLOAT, rgb_layout(), None).unwrap();
        assert_eq!(f16_buffer.precision(), Some(Precision::F16));
        assert_eq!(f16_buffer.packed().unwrap().len(), 24);
        assert_eq!(f16_buffer.as_f32(0).unwrap(), data.to_vec());

        let halves: Vec<f16> = data.iter().map(|&v| half_float::to_f16(v)).collect();
        let lazy = PixelBuffer::from_f16(halves, PixelFormat::R16G16B16_SFLOAT, rgb_layout(), None).unwrap();
        assert!(!lazy.is_materialized());
        assert_eq!(lazy.packed().unwrap(), f16_buffer.packed().unwrap());
        assert_eq!(lazy.hdr_properties().unwrap(), f16_buffer.hdr_properties().unwrap());
    }

    #[test]
    fn test_raw_float_summary_is_lazy() {
        let data = [1.0f32, 2.0, 3.0];
        let mut bytes = vec![0u8; 12];
        LittleEndian::write_f32_into(&data, &mut bytes);
        let buffer = PixelBuffer::from_raw(bytes, PixelFormat::R32G32B32_SFLOAT, BufferLayout::new(1, 1)).unwrap();
        let props = buffer.hdr_properties().unwrap().unwrap();
        assert_eq!(props.min_value(), 1.0);
        assert_eq!(props.max_value(), 3.0);

        let packed = PixelBuffer::from_raw(vec![0; 4], PixelFormat::B10G11R11_UFLOAT_PACK32, BufferLayout::new(1, 1))
            .unwrap();
        assert!(matches!(packed.as_f32(0), Err(Error::NotAvailable { .. })));
        assert_eq!(packed.hdr_properties().unwrap(), None);
    }

    #[test]
    fn test_destroy() {
        let mut buffer = PixelBuffer::from_bytes(vec![1, 2, 3], PixelFormat::R8G8B8_UNORM, BufferLayout::new(1, 1))
            .unwrap();
        buffer.destroy();
        assert!(buffer.is_destroyed());
        assert!(matches!(buffer.packed(), Err(Error::UseAfterDestroy)));
        assert!(matches!(buffer.image_bytes(0), Err(Error::UseAfterDestroy)));
        assert!(matches!(buffer.as_f32(0), Err(Error::UseAfterDestroy)));
        assert!(matches!(buffer.clone().into_packed(), Err(Error::UseAfterDestroy)));
    }

    #[test]
    fn test_linearize() {
        let pool = LinearizePool::new(2).unwrap();
        let srgb = PixelFormat::R8G8B8_UNORM.to_srgb().unwrap();
        let mut buffer = PixelBuffer::from_bytes(vec![0, 128, 255], srgb, BufferLayout::new(1, 1)).unwrap();
        buffer.linearize(&pool).unwrap();
        assert_eq!(buffer.format(), PixelFormat::R8G8B8_UNORM);
        assert_eq!(buffer.transfer(), TransferFunction::Linear);
        let bytes = buffer.packed().unwrap();
        assert_eq!(bytes[0], 0);
        assert!(bytes[1] < 128);
        assert_eq!(bytes[2], 255);

        let mut tagged = PixelBuffer::from_shorts(vec![32768], PixelFormat::R16_UNORM, BufferLayout::new(1, 1))
            .unwrap()
            .with_transfer(TransferFunction::Srgb);
        tagged.linearize(&pool).unwrap();
        assert_eq!(tagged.format(), PixelFormat::R16_UNORM);
        assert!(tagged.as_f32(0).unwrap()[0] < 0.25);
    }

    #[test]
    fn test_linearize_pack32() {
        let pool = LinearizePool::new(2).unwrap();
        let srgb = PixelFormat::from_id(57).unwrap();
        let texels = [0u8, 128, 255, 77].repeat(4);
        let mut buffer = PixelBuffer::from_packed(texels, srgb, rgb_layout()).unwrap();
        buffer.linearize(&pool).unwrap();
        assert_eq!(buffer.format(), PixelFormat::A8B8G8R8_UNORM_PACK32);
        assert_eq!(buffer.transfer(), TransferFunction::Linear);

        let bytes = buffer.packed().unwrap();
        assert_eq!(bytes.len(), 16);
        for texel in bytes.chunks_exact(4) {
            assert_eq!(texel[0], 0);
            assert!(texel[1] < 128);
            assert_eq!(texel[2], 255);
            assert_eq!(texel[3], 77);
        }
    }

    #[test]
    fn test_linearize_rejects_wide_pack32() {
        let pool = LinearizePool::new(1).unwrap();
        let format = PixelFormat::from_id(64).unwrap();
        let mut buffer = PixelBuffer::from_packed(vec![0; 4], format, BufferLayout::new(1, 1))
            .unwrap()
            .with_transfer(TransferFunction::Srgb);
        assert!(matches!(buffer.linearize(&pool), Err(Error::NotAvailable { .. })));
    }
}
