//! Texture type classification.
//!
//! Derives the GPU image-view type of a texture from its layer / face
//! counts and dimensions, the way a KTX2 loader picks the Vulkan view type.

/// Texture shape, carrying the matching `VkImageViewType` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    /// One-dimensional texture.
    Type1D,
    /// Two-dimensional texture.
    Type2D,
    /// Three-dimensional texture.
    Type3D,
    /// Six-face cubemap.
    Cubemap,
    /// Array of 1D textures.
    Type1DArray,
    /// Array of 2D textures.
    Type2DArray,
    /// Array of 3D textures (no Vulkan view type).
    Type3DArray,
    /// Array of cubemaps.
    CubemapArray,
}

impl TextureType {
    /// Classifies a texture.
    ///
    /// Six faces make a cubemap (an array when more than one layer), any
    /// other layered texture is an array, and depth / width pick 3D, 2D
    /// or 1D.
    pub fn classify(layer_count: u32, face_count: u32, width: u32, _height: u32, depth: u32) -> Self {
        if face_count == 6 {
            if layer_count > 1 {
                TextureType::CubemapArray
            } else {
                TextureType::Cubemap
            }
        } else if layer_count > 0 {
            if depth > 1 {
                TextureType::Type3DArray
            } else if width > 0 {
                TextureType::Type2DArray
            } else {
                TextureType::Type1DArray
            }
        } else if depth > 1 {
            TextureType::Type3D
        } else if width > 0 {
            TextureType::Type2D
        } else {
            TextureType::Type1D
        }
    }

    /// `VkImageViewType` value, `-1` for 3D arrays.
    pub fn vk_value(self) -> i32 {
        match self {
            TextureType::Type1D => 0,
            TextureType::Type2D => 1,
            TextureType::Type3D => 2,
            TextureType::Cubemap => 3,
            TextureType::Type1DArray => 4,
            TextureType::Type2DArray => 5,
            TextureType::CubemapArray => 6,
            TextureType::Type3DArray => -1,
        }
    }

    /// Returns `true` for cubemaps and cubemap arrays.
    pub fn is_cubemap(self) -> bool {
        matches!(self, TextureType::Cubemap | TextureType::CubemapArray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(TextureType::classify(0, 6, 64, 64, 0), TextureType::Cubemap);
        assert_eq!(TextureType::classify(1, 6, 64, 64, 0), TextureType::Cubemap);
        assert_eq!(TextureType::classify(4, 6, 64, 64, 0), TextureType::CubemapArray);
        assert_eq!(TextureType::classify(3, 1, 64, 64, 0), TextureType::Type2DArray);
        assert_eq!(TextureType::classify(3, 1, 64, 64, 8), TextureType::Type3DArray);
        assert_eq!(TextureType::classify(3, 1, 0, 0, 0), TextureType::Type1DArray);
        assert_eq!(TextureType::classify(0, 1, 64, 64, 0), TextureType::Type2D);
        assert_eq!(TextureType::classify(0, 1, 64, 64, 16), TextureType::Type3D);
        assert_eq!(TextureType::classify(0, 1, 0, 0, 0), TextureType::Type1D);
    }

    #[test]
    fn test_vk_values() {
        assert_eq!(TextureType::Cubemap.vk_value(), 3);
        assert_eq!(TextureType::Type3DArray.vk_value(), -1);
        assert!(TextureType::CubemapArray.is_cubemap());
        assert!(!TextureType::Type2D.is_cubemap());
    }
}
