//! # ktx-core
//!
//! Core types for packing images into KTX2 texture containers.
//!
//! - [`PixelFormat`] - Vulkan format catalog with float / reverse-order / sRGB classification
//! - [`half_float`] - bit-exact software half-float codec and RGBE expansion
//! - [`PixelBuffer`] - one or more same-format images over packed or typed-array storage
//! - [`HdrProperties`] - min/max/mean luminance summary of float images
//! - [`TextureType`] - 1D/2D/3D/cubemap/array classification
//! - [`LinearizePool`] - parallel sRGB to linear conversion
//!
//! ## Crate Structure
//!
//! ```text
//! ktx-core (this crate)
//!    ^
//!    |
//!    +-- ktx-io (Radiance HDR decoder, KTX2 reader/writer)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ktx_core::prelude::*;
//!
//! let data = vec![0.25f32; 4 * 4 * 3];
//! let buffer = PixelBuffer::from_f32(
//!     &data,
//!     PixelFormat::R16G16B16_SFLOAT,
//!     BufferLayout::new(4, 4),
//!     None,
//! )?;
//! assert_eq!(buffer.image_size(), 4 * 4 * 6);
//! assert_eq!(buffer.as_f32(0)?[0], 0.25);
//! # Ok::<(), ktx_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod format;
pub mod half_float;
pub mod srgb;
pub mod stats;
pub mod texture;

pub use buffer::{BufferLayout, NativeArray, PixelBuffer, TransferFunction};
pub use error::{Error, Result};
pub use format::{PixelFormat, Precision};
pub use srgb::LinearizePool;
pub use stats::{luminance_bt2100, HdrProperties, BT2100_LUMA};
pub use texture::TextureType;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::buffer::{BufferLayout, NativeArray, PixelBuffer, TransferFunction};
    pub use crate::error::{Error, Result};
    pub use crate::format::{PixelFormat, Precision};
    pub use crate::half_float;
    pub use crate::stats::HdrProperties;
    pub use crate::texture::TextureType;
}
