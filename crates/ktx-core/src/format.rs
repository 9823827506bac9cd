//! Vulkan pixel format catalog.
//!
//! Maps the numeric `VkFormat` identifiers used by KTX2 containers to their
//! component count and byte size, plus float / reverse-order / sRGB
//! classification. The table is immutable and shared process-wide.
//!
//! Block-compressed formats (BC, ETC2, EAC, ASTC) are listed so that their
//! ids resolve, but carry a component count and byte size of `-1`: they are
//! metadata only and cannot be used for byte-level buffer operations.
//!
//! # Usage
//!
//! ```rust
//! use ktx_core::format::PixelFormat;
//!
//! let format = PixelFormat::from_id(106).unwrap();
//! assert_eq!(format.name(), "VK_FORMAT_R32G32B32_SFLOAT");
//! assert_eq!(format.component_count(), 3);
//! assert_eq!(format.byte_size(), 12);
//! assert!(format.is_float());
//!
//! let by_name = PixelFormat::from_name("VK_FORMAT_B8G8R8_UNORM").unwrap();
//! assert!(by_name.is_reverse_order());
//! assert_eq!(by_name.to_srgb().unwrap().id(), 36);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::{Error, Result};

/// Number of catalog entries (`VkFormat` 0..=184).
pub const FORMAT_COUNT: usize = 185;

/// DFD channel qualifier: sample is floating point.
pub const DATATYPE_FLOAT: u8 = 0x80;
/// DFD channel qualifier: sample is signed.
pub const DATATYPE_SIGNED: u8 = 0x40;
/// DFD channel qualifier: sample is a shared exponent.
pub const DATATYPE_EXPONENT: u8 = 0x20;
/// DFD channel qualifier: sample is linearly encoded.
pub const DATATYPE_LINEAR: u8 = 0x10;

/// Float storage precision of a float-backed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    /// 32-bit IEEE-754 single.
    F32,
    /// 16-bit IEEE-754 half.
    F16,
}

impl Precision {
    /// Bytes per stored component.
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            Precision::F32 => 4,
            Precision::F16 => 2,
        }
    }
}

/// Immutable descriptor of one `VkFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    id: u32,
    name: &'static str,
    component_count: i32,
    byte_size: i32,
}

const fn entry(id: u32, name: &'static str, component_count: i32, byte_size: i32) -> PixelFormat {
    PixelFormat {
        id,
        name,
        component_count,
        byte_size,
    }
}

const CATALOG: [PixelFormat; FORMAT_COUNT] = [
    entry(0, "VK_FORMAT_UNDEFINED", -1, -1),
    entry(1, "VK_FORMAT_R4G4_UNORM_PACK8", 2, 1),
    entry(2, "VK_FORMAT_R4G4B4A4_UNORM_PACK16", 4, 2),
    entry(3, "VK_FORMAT_B4G4R4A4_UNORM_PACK16", 4, 2),
    entry(4, "VK_FORMAT_R5G6B5_UNORM_PACK16", 3, 2),
    entry(5, "VK_FORMAT_B5G6R5_UNORM_PACK16", 3, 2),
    entry(6, "VK_FORMAT_R5G5B5A1_UNORM_PACK16", 4, 2),
    entry(7, "VK_FORMAT_B5G5R5A1_UNORM_PACK16", 4, 2),
    entry(8, "VK_FORMAT_A1R5G5B5_UNORM_PACK16", 4, 2),
    entry(9, "VK_FORMAT_R8_UNORM", 1, 1),
    entry(10, "VK_FORMAT_R8_SNORM", 1, 1),
    entry(11, "VK_FORMAT_R8_USCALED", 1, 1),
    entry(12, "VK_FORMAT_R8_SSCALED", 1, 1),
    entry(13, "VK_FORMAT_R8_UINT", 1, 1),
    entry(14, "VK_FORMAT_R8_SINT", 1, 1),
    entry(15, "VK_FORMAT_R8_SRGB", 1, 1),
    entry(16, "VK_FORMAT_R8G8_UNORM", 2, 2),
    entry(17, "VK_FORMAT_R8G8_SNORM", 2, 2),
    entry(18, "VK_FORMAT_R8G8_USCALED", 2, 2),
    entry(19, "VK_FORMAT_R8G8_SSCALED", 2, 2),
    entry(20, "VK_FORMAT_R8G8_UINT", 2, 2),
    entry(21, "VK_FORMAT_R8G8_SINT", 2, 2),
    entry(22, "VK_FORMAT_R8G8_SRGB", 2, 2),
    entry(23, "VK_FORMAT_R8G8B8_UNORM", 3, 3),
    entry(24, "VK_FORMAT_R8G8B8_SNORM", 3, 3),
    entry(25, "VK_FORMAT_R8G8B8_USCALED", 3, 3),
    entry(26, "VK_FORMAT_R8G8B8_SSCALED", 3, 3),
    entry(27, "VK_FORMAT_R8G8B8_UINT", 3, 3),
    entry(28, "VK_FORMAT_R8G8B8_SINT", 3, 3),
    entry(29, "VK_FORMAT_R8G8B8_SRGB", 3, 3),
    entry(30, "VK_FORMAT_B8G8R8_UNORM", 3, 3),
    entry(31, "VK_FORMAT_B8G8R8_SNORM", 3, 3),
    entry(32, "VK_FORMAT_B8G8R8_USCALED", 3, 3),
    entry(33, "VK_FORMAT_B8G8R8_SSCALED", 3, 3),
    entry(34, "VK_FORMAT_B8G8R8_UINT", 3, 3),
    entry(35, "VK_FORMAT_B8G8R8_SINT", 3, 3),
    entry(36, "VK_FORMAT_B8G8R8_SRGB", 3, 3),
    entry(37, "VK_FORMAT_R8G8B8A8_UNORM", 4, 4),
    entry(38, "VK_FORMAT_R8G8B8A8_SNORM", 4, 4),
    entry(39, "VK_FORMAT_R8G8B8A8_USCALED", 4, 4),
    entry(40, "VK_FORMAT_R8G8B8A8_SSCALED", 4, 4),
    entry(41, "VK_FORMAT_R8G8B8A8_UINT", 4, 4),
    entry(42, "VK_FORMAT_R8G8B8A8_SINT", 4, 4),
    entry(43, "VK_FORMAT_R8G8B8A8_SRGB", 4, 4),
    entry(44, "VK_FORMAT_B8G8R8A8_UNORM", 4, 4),
    entry(45, "VK_FORMAT_B8G8R8A8_SNORM", 4, 4),
    entry(46, "VK_FORMAT_B8G8R8A8_USCALED", 4, 4),
    entry(47, "VK_FORMAT_B8G8R8A8_SSCALED", 4, 4),
    entry(48, "VK_FORMAT_B8G8R8A8_UINT", 4, 4),
    entry(49, "VK_FORMAT_B8G8R8A8_SINT", 4, 4),
    entry(50, "VK_FORMAT_B8G8R8A8_SRGB", 4, 4),
    entry(51, "VK_FORMAT_A8B8G8R8_UNORM_PACK32", 4, 4),
    entry(52, "VK_FORMAT_A8B8G8R8_SNORM_PACK32", 4, 4),
    entry(53, "VK_FORMAT_A8B8G8R8_USCALED_PACK32", 4, 4),
    entry(54, "VK_FORMAT_A8B8G8R8_SSCALED_PACK32", 4, 4),
    entry(55, "VK_FORMAT_A8B8G8R8_UINT_PACK32", 4, 4),
    entry(56, "VK_FORMAT_A8B8G8R8_SINT_PACK32", 4, 4),
    entry(57, "VK_FORMAT_A8B8G8R8_SRGB_PACK32", 4, 4),
    entry(58, "VK_FORMAT_A2R10G10B10_UNORM_PACK32", 4, 4),
    entry(59, "VK_FORMAT_A2R10G10B10_SNORM_PACK32", 4, 4),
    entry(60, "VK_FORMAT_A2R10G10B10_USCALED_PACK32", 4, 4),
    entry(61, "VK_FORMAT_A2R10G10B10_SSCALED_PACK32", 4, 4),
    entry(62, "VK_FORMAT_A2R10G10B10_UINT_PACK32", 4, 4),
    entry(63, "VK_FORMAT_A2R10G10B10_SINT_PACK32", 4, 4),
    entry(64, "VK_FORMAT_A2B10G10R10_UNORM_PACK32", 4, 4),
    entry(65, "VK_FORMAT_A2B10G10R10_SNORM_PACK32", 4, 4),
    entry(66, "VK_FORMAT_A2B10G10R10_USCALED_PACK32", 4, 4),
    entry(67, "VK_FORMAT_A2B10G10R10_SSCALED_PACK32", 4, 4),
    entry(68, "VK_FORMAT_A2B10G10R10_UINT_PACK32", 4, 4),
    entry(69, "VK_FORMAT_A2B10G10R10_SINT_PACK32", 4, 4),
    entry(70, "VK_FORMAT_R16_UNORM", 1, 2),
    entry(71, "VK_FORMAT_R16_SNORM", 1, 2),
    entry(72, "VK_FORMAT_R16_USCALED", 1, 2),
    entry(73, "VK_FORMAT_R16_SSCALED", 1, 2),
    entry(74, "VK_FORMAT_R16_UINT", 1, 2),
    entry(75, "VK_FORMAT_R16_SINT", 1, 2),
    entry(76, "VK_FORMAT_R16_SFLOAT", 1, 2),
    entry(77, "VK_FORMAT_R16G16_UNORM", 2, 4),
    entry(78, "VK_FORMAT_R16G16_SNORM", 2, 4),
    entry(79, "VK_FORMAT_R16G16_USCALED", 2, 4),
    entry(80, "VK_FORMAT_R16G16_SSCALED", 2, 4),
    entry(81, "VK_FORMAT_R16G16_UINT", 2, 4),
    entry(82, "VK_FORMAT_R16G16_SINT", 2, 4),
    entry(83, "VK_FORMAT_R16G16_SFLOAT", 2, 4),
    entry(84, "VK_FORMAT_R16G16B16_UNORM", 3, 6),
    entry(85, "VK_FORMAT_R16G16B16_SNORM", 3, 6),
    entry(86, "VK_FORMAT_R16G16B16_USCALED", 3, 6),
    entry(87, "VK_FORMAT_R16G16B16_SSCALED", 3, 6),
    entry(88, "VK_FORMAT_R16G16B16_UINT", 3, 6),
    entry(89, "VK_FORMAT_R16G16B16_SINT", 3, 6),
    entry(90, "VK_FORMAT_R16G16B16_SFLOAT", 3, 6),
    entry(91, "VK_FORMAT_R16G16B16A16_UNORM", 4, 8),
    entry(92, "VK_FORMAT_R16G16B16A16_SNORM", 4, 8),
    entry(93, "VK_FORMAT_R16G16B16A16_USCALED", 4, 8),
    entry(94, "VK_FORMAT_R16G16B16A16_SSCALED", 4, 8),
    entry(95, "VK_FORMAT_R16G16B16A16_UINT", 4, 8),
    entry(96, "VK_FORMAT_R16G16B16A16_SINT", 4, 8),
    entry(97, "VK_FORMAT_R16G16B16A16_SFLOAT", 4, 8),
    entry(98, "VK_FORMAT_R32_UINT", 1, 4),
    entry(99, "VK_FORMAT_R32_SINT", 1, 4),
    entry(100, "VK_FORMAT_R32_SFLOAT", 1, 4),
    entry(101, "VK_FORMAT_R32G32_UINT", 2, 8),
    entry(102, "VK_FORMAT_R32G32_SINT", 2, 8),
    entry(103, "VK_FORMAT_R32G32_SFLOAT", 2, 8),
    entry(104, "VK_FORMAT_R32G32B32_UINT", 3, 12),
    entry(105, "VK_FORMAT_R32G32B32_SINT", 3, 12),
    entry(106, "VK_FORMAT_R32G32B32_SFLOAT", 3, 12),
    entry(107, "VK_FORMAT_R32G32B32A32_UINT", 4, 16),
    entry(108, "VK_FORMAT_R32G32B32A32_SINT", 4, 16),
    entry(109, "VK_FORMAT_R32G32B32A32_SFLOAT", 4, 16),
    entry(110, "VK_FORMAT_R64_UINT", 1, 8),
    entry(111, "VK_FORMAT_R64_SINT", 1, 8),
    entry(112, "VK_FORMAT_R64_SFLOAT", 1, 8),
    entry(113, "VK_FORMAT_R64G64_UINT", 2, 16),
    entry(114, "VK_FORMAT_R64G64_SINT", 2, 16),
    entry(115, "VK_FORMAT_R64G64_SFLOAT", 2, 16),
    entry(116, "VK_FORMAT_R64G64B64_UINT", 3, 24),
    entry(117, "VK_FORMAT_R64G64B64_SINT", 3, 24),
    entry(118, "VK_FORMAT_R64G64B64_SFLOAT", 3, 24),
    entry(119, "VK_FORMAT_R64G64B64A64_UINT", 4, 32),
    entry(120, "VK_FORMAT_R64G64B64A64_SINT", 4, 32),
    entry(121, "VK_FORMAT_R64G64B64A64_SFLOAT", 4, 32),
    entry(122, "VK_FORMAT_B10G11R11_UFLOAT_PACK32", 3, 4),
    entry(123, "VK_FORMAT_E5B9G9R9_UFLOAT_PACK32", 3, 4),
    entry(124, "VK_FORMAT_D16_UNORM", 1, 2),
    entry(125, "VK_FORMAT_X8_D24_UNORM_PACK32", 2, 4),
    entry(126, "VK_FORMAT_D32_SFLOAT", 1, 4),
    entry(127, "VK_FORMAT_S8_UINT", 1, 1),
    entry(128, "VK_FORMAT_D16_UNORM_S8_UINT", 1, 2),
    entry(129, "VK_FORMAT_D24_UNORM_S8_UINT", 1, 3),
    entry(130, "VK_FORMAT_D32_SFLOAT_S8_UINT", 1, 4),
    entry(131, "VK_FORMAT_BC1_RGB_UNORM_BLOCK", -1, -1),
    entry(132, "VK_FORMAT_BC1_RGB_SRGB_BLOCK", -1, -1),
    entry(133, "VK_FORMAT_BC1_RGBA_UNORM_BLOCK", -1, -1),
    entry(134, "VK_FORMAT_BC1_RGBA_SRGB_BLOCK", -1, -1),
    entry(135, "VK_FORMAT_BC2_UNORM_BLOCK", -1, -1),
    entry(136, "VK_FORMAT_BC2_SRGB_BLOCK", -1, -1),
    entry(137, "VK_FORMAT_BC3_UNORM_BLOCK", -1, -1),
    entry(138, "VK_FORMAT_BC3_SRGB_BLOCK", -1, -1),
    entry(139, "VK_FORMAT_BC4_UNORM_BLOCK", -1, -1),
    entry(140, "VK_FORMAT_BC4_SNORM_BLOCK", -1, -1),
    entry(141, "VK_FORMAT_BC5_UNORM_BLOCK", -1, -1),
    entry(142, "VK_FORMAT_BC5_SNORM_BLOCK", -1, -1),
    entry(143, "VK_FORMAT_BC6H_UFLOAT_BLOCK", -1, -1),
    entry(144, "VK_FORMAT_BC6H_SFLOAT_BLOCK", -1, -1),
    entry(145, "VK_FORMAT_BC7_UNORM_BLOCK", -1, -1),
    entry(146, "VK_FORMAT_BC7_SRGB_BLOCK", -1, -1),
    entry(147, "VK_FORMAT_ETC2_R8G8B8_UNORM_BLOCK", -1, -1),
    entry(148, "VK_FORMAT_ETC2_R8G8B8_SRGB_BLOCK", -1, -1),
    entry(149, "VK_FORMAT_ETC2_R8G8B8A1_UNORM_BLOCK", -1, -1),
    entry(150, "VK_FORMAT_ETC2_R8G8B8A1_SRGB_BLOCK", -1, -1),
    entry(151, "VK_FORMAT_ETC2_R8G8B8A8_UNORM_BLOCK", -1, -1),
    entry(152, "VK_FORMAT_ETC2_R8G8B8A8_SRGB_BLOCK", -1, -1),
    entry(153, "VK_FORMAT_EAC_R11_UNORM_BLOCK", -1, -1),
    entry(154, "VK_FORMAT_EAC_R11_SNORM_BLOCK", -1, -1),
    entry(155, "VK_FORMAT_EAC_R11G11_UNORM_BLOCK", -1, -1),
    entry(156, "VK_FORMAT_EAC_R11G11_SNORM_BLOCK", -1, -1),
    entry(157, "VK_FORMAT_ASTC_4x4_UNORM_BLOCK", -1, -1),
    entry(158, "VK_FORMAT_ASTC_4x4_SRGB_BLOCK", -1, -1),
    entry(159, "VK_FORMAT_ASTC_5x4_UNORM_BLOCK", -1, -1),
    entry(160, "VK_FORMAT_ASTC_5x4_SRGB_BLOCK", -1, -1),
    entry(161, "VK_FORMAT_ASTC_5x5_UNORM_BLOCK", -1, -1),
    entry(162, "VK_FORMAT_ASTC_5x5_SRGB_BLOCK", -1, -1),
    entry(163, "VK_FORMAT_ASTC_6x5_UNORM_BLOCK", -1, -1),
    entry(164, "VK_FORMAT_ASTC_6x5_SRGB_BLOCK", -1, -1),
    entry(165, "VK_FORMAT_ASTC_6x6_UNORM_BLOCK", -1, -1),
    entry(166, "VK_FORMAT_ASTC_6x6_SRGB_BLOCK", -1, -1),
    entry(167, "VK_FORMAT_ASTC_8x5_UNORM_BLOCK", -1, -1),
    entry(168, "VK_FORMAT_ASTC_8x5_SRGB_BLOCK", -1, -1),
    entry(169, "VK_FORMAT_ASTC_8x6_UNORM_BLOCK", -1, -1),
    entry(170, "VK_FORMAT_ASTC_8x6_SRGB_BLOCK", -1, -1),
    entry(171, "VK_FORMAT_ASTC_8x8_UNORM_BLOCK", -1, -1),
    entry(172, "VK_FORMAT_ASTC_8x8_SRGB_BLOCK", -1, -1),
    entry(173, "VK_FORMAT_ASTC_10x5_UNORM_BLOCK", -1, -1),
    entry(174, "VK_FORMAT_ASTC_10x5_SRGB_BLOCK", -1, -1),
    entry(175, "VK_FORMAT_ASTC_10x6_UNORM_BLOCK", -1, -1),
    entry(176, "VK_FORMAT_ASTC_10x6_SRGB_BLOCK", -1, -1),
    entry(177, "VK_FORMAT_ASTC_10x8_UNORM_BLOCK", -1, -1),
    entry(178, "VK_FORMAT_ASTC_10x8_SRGB_BLOCK", -1, -1),
    entry(179, "VK_FORMAT_ASTC_10x10_UNORM_BLOCK", -1, -1),
    entry(180, "VK_FORMAT_ASTC_10x10_SRGB_BLOCK", -1, -1),
    entry(181, "VK_FORMAT_ASTC_12x10_UNORM_BLOCK", -1, -1),
    entry(182, "VK_FORMAT_ASTC_12x10_SRGB_BLOCK", -1, -1),
    entry(183, "VK_FORMAT_ASTC_12x12_UNORM_BLOCK", -1, -1),
    entry(184, "VK_FORMAT_ASTC_12x12_SRGB_BLOCK", -1, -1),
];

static BY_NAME: LazyLock<HashMap<&'static str, PixelFormat>> =
    LazyLock::new(|| CATALOG.iter().map(|f| (f.name, *f)).collect());

impl PixelFormat {
    /// `VK_FORMAT_UNDEFINED`.
    pub const UNDEFINED: PixelFormat = CATALOG[0];
    /// `VK_FORMAT_R8_UNORM`.
    pub const R8_UNORM: PixelFormat = CATALOG[9];
    /// `VK_FORMAT_R8G8_UNORM`.
    pub const R8G8_UNORM: PixelFormat = CATALOG[16];
    /// `VK_FORMAT_R8G8B8_UNORM`.
    pub const R8G8B8_UNORM: PixelFormat = CATALOG[23];
    /// `VK_FORMAT_B8G8R8_UNORM`.
    pub const B8G8R8_UNORM: PixelFormat = CATALOG[30];
    /// `VK_FORMAT_R8G8B8A8_UNORM`.
    pub const R8G8B8A8_UNORM: PixelFormat = CATALOG[37];
    /// `VK_FORMAT_B8G8R8A8_UNORM`.
    pub const B8G8R8A8_UNORM: PixelFormat = CATALOG[44];
    /// `VK_FORMAT_A8B8G8R8_UNORM_PACK32`.
    pub const A8B8G8R8_UNORM_PACK32: PixelFormat = CATALOG[51];
    /// `VK_FORMAT_R16_UNORM`.
    pub const R16_UNORM: PixelFormat = CATALOG[70];
    /// `VK_FORMAT_R16_SFLOAT`.
    pub const R16_SFLOAT: PixelFormat = CATALOG[76];
    /// `VK_FORMAT_R16G16B16_UNORM`.
    pub const R16G16B16_UNORM: PixelFormat = CATALOG[84];
    /// `VK_FORMAT_R16G16B16_SFLOAT`.
    pub const R16G16B16_SFLOAT: PixelFormat = CATALOG[90];
    /// `VK_FORMAT_R16G16B16A16_SFLOAT`.
    pub const R16G16B16A16_SFLOAT: PixelFormat = CATALOG[97];
    /// `VK_FORMAT_R32_SFLOAT`.
    pub const R32_SFLOAT: PixelFormat = CATALOG[100];
    /// `VK_FORMAT_R32G32B32_SFLOAT`.
    pub const R32G32B32_SFLOAT: PixelFormat = CATALOG[106];
    /// `VK_FORMAT_R32G32B32A32_SFLOAT`.
    pub const R32G32B32A32_SFLOAT: PixelFormat = CATALOG[109];
    /// `VK_FORMAT_B10G11R11_UFLOAT_PACK32`.
    pub const B10G11R11_UFLOAT_PACK32: PixelFormat = CATALOG[122];
    /// `VK_FORMAT_E5B9G9R9_UFLOAT_PACK32`.
    pub const E5B9G9R9_UFLOAT_PACK32: PixelFormat = CATALOG[123];

    /// Looks up a format by its `VkFormat` value.
    pub fn from_id(id: u32) -> Option<PixelFormat> {
        CATALOG.get(id as usize).copied()
    }

    /// Looks up a format by symbolic name.
    ///
    /// Accepts the full `VK_FORMAT_R8G8B8_UNORM` spelling as well as the
    /// name without the `VK_FORMAT_` prefix.
    pub fn from_name(name: &str) -> Option<PixelFormat> {
        BY_NAME
            .get(name)
            .or_else(|| BY_NAME.get(format!("VK_FORMAT_{name}").as_str()))
            .copied()
    }

    /// All catalog entries in id order.
    pub fn all() -> &'static [PixelFormat] {
        &CATALOG
    }

    /// `VkFormat` value.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Symbolic `VK_FORMAT_*` name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of components, `-1` for block-compressed formats.
    #[inline]
    pub fn component_count(&self) -> i32 {
        self.component_count
    }

    /// Bytes per texel, `-1` for block-compressed formats.
    #[inline]
    pub fn byte_size(&self) -> i32 {
        self.byte_size
    }

    /// Returns `true` for formats that cannot be addressed per texel.
    #[inline]
    pub fn is_block_compressed(&self) -> bool {
        self.component_count < 0 || self.byte_size < 0
    }

    /// Returns `true` for bit-packed formats (`*_PACK8/16/32`).
    #[inline]
    pub fn is_packed(&self) -> bool {
        self.name.contains("_PACK")
    }

    /// Bytes per texel as `usize`, failing for block-compressed formats.
    pub fn texel_size(&self) -> Result<usize> {
        if self.is_block_compressed() {
            return Err(Error::unsupported_format(self.name));
        }
        Ok(self.byte_size as usize)
    }

    /// Bytes per component when every component has the same whole-byte
    /// width, `None` for bit-packed and block-compressed formats.
    pub fn component_size(&self) -> Option<usize> {
        if self.is_block_compressed() || self.is_packed() || self.component_count == 0 {
            return None;
        }
        let components = self.component_count as usize;
        let bytes = self.byte_size as usize;
        (bytes % components == 0).then_some(bytes / components)
    }

    /// Component storage order is reversed (B before R).
    pub fn is_reverse_order(&self) -> bool {
        matches!(self.id, 5..=7 | 30..=36 | 51..=57 | 64..=69)
    }

    /// Components are floating point.
    pub fn is_float(&self) -> bool {
        matches!(
            self.id,
            76 | 83 | 90 | 97 | 100 | 103 | 106 | 109 | 112 | 115 | 118 | 121 | 122 | 123 | 126
                | 130
                | 143
                | 144
        )
    }

    /// Components are sRGB encoded.
    pub fn is_srgb(&self) -> bool {
        matches!(self.id, 15 | 22 | 29 | 36 | 43 | 50 | 57)
    }

    /// Float storage precision for formats a float buffer can hold.
    ///
    /// Only whole-byte 32-bit and 16-bit float formats qualify; packed
    /// (`B10G11R11`, `E5B9G9R9`) and 64-bit formats return `None`.
    pub fn precision(&self) -> Option<Precision> {
        if !self.is_float() {
            return None;
        }
        match self.component_size() {
            Some(4) => Some(Precision::F32),
            Some(2) => Some(Precision::F16),
            _ => None,
        }
    }

    /// Returns the sRGB counterpart of an 8-bit UNORM format.
    pub fn to_srgb(&self) -> Result<PixelFormat> {
        let srgb = match self.id {
            9 => 15,
            16 => 22,
            23 => 29,
            30 => 36,
            37 => 43,
            44 => 50,
            51 => 57,
            _ => return Err(Error::unsupported_format(self.name)),
        };
        Ok(CATALOG[srgb])
    }

    /// Returns the UNORM counterpart of an 8-bit sRGB format.
    pub fn to_unorm(&self) -> Result<PixelFormat> {
        CATALOG
            .iter()
            .find(|f| f.to_srgb().is_ok_and(|srgb| srgb.id == self.id))
            .copied()
            .ok_or_else(|| Error::unsupported_format(self.name))
    }

    /// DFD channel-type qualifier flags for this format's samples.
    pub fn data_type(&self) -> u8 {
        if self.is_float() {
            if self.name.contains("SFLOAT") {
                DATATYPE_FLOAT | DATATYPE_SIGNED | DATATYPE_LINEAR
            } else {
                DATATYPE_FLOAT | DATATYPE_LINEAR
            }
        } else if self.name.contains("SNORM")
            || self.name.contains("SINT")
            || self.name.contains("SSCALED")
        {
            DATATYPE_SIGNED | DATATYPE_LINEAR
        } else {
            DATATYPE_LINEAR
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TryFrom<u32> for PixelFormat {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self> {
        PixelFormat::from_id(id).ok_or_else(|| Error::unsupported_format(format!("VkFormat {id}")))
    }
}
