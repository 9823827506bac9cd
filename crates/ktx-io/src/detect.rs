//! Format detection utilities.
//!
//! Detects input formats from magic bytes and file extensions.

use crate::IoResult;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// KTX2 file identifier.
pub const KTX2_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

/// Formats recognized on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// KTX2 texture container.
    Ktx2,
    /// Radiance HDR format.
    Hdr,
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// Unknown/unsupported format.
    Unknown,
}

impl Format {
    /// Detects format from file path (magic bytes, then extension).
    pub fn detect<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();

        if let Ok(format) = Self::from_magic_bytes(path) {
            if format != Format::Unknown {
                return Ok(format);
            }
        }

        Ok(Self::from_extension(path))
    }

    /// Detects format from file extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("ktx2") => Format::Ktx2,
            Some("hdr") | Some("pic") | Some("rgbe") => Format::Hdr,
            Some("png") => Format::Png,
            Some("jpg") | Some("jpeg") => Format::Jpeg,
            _ => Format::Unknown,
        }
    }

    /// Detects format from file magic bytes.
    pub fn from_magic_bytes<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let mut file = File::open(path)?;
        let mut header = [0u8; 12];

        let bytes_read = file.read(&mut header)?;
        Ok(Self::from_bytes(&header[..bytes_read]))
    }

    /// Detects format from raw bytes (magic number check).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.starts_with(&KTX2_IDENTIFIER) {
            return Format::Ktx2;
        }

        // HDR: "#?RADIANCE" or "#?RGBE"
        if bytes.starts_with(b"#?") {
            return Format::Hdr;
        }

        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Format::Png;
        }

        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Format::Jpeg;
        }

        Format::Unknown
    }

    /// Returns the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Ktx2 => "ktx2",
            Format::Hdr => "hdr",
            Format::Png => "png",
            Format::Jpeg => "jpg",
            Format::Unknown => "",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Ktx2 => "image/ktx2",
            Format::Hdr => "image/vnd.radiance",
            Format::Png => "image/png",
            Format::Jpeg => "image/jpeg",
            Format::Unknown => "application/octet-stream",
        }
    }

    /// Returns true if this crate can decode the format.
    pub fn is_readable(&self) -> bool {
        match self {
            Format::Ktx2 => cfg!(feature = "ktx"),
            Format::Hdr => cfg!(feature = "hdr"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        assert_eq!(Format::from_extension("sky.KTX2"), Format::Ktx2);
        assert_eq!(Format::from_extension("sky.hdr"), Format::Hdr);
        assert_eq!(Format::from_extension("sky.pic"), Format::Hdr);
        assert_eq!(Format::from_extension("photo.jpeg"), Format::Jpeg);
        assert_eq!(Format::from_extension("photo.png"), Format::Png);
        assert_eq!(Format::from_extension("notes.txt"), Format::Unknown);
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(Format::from_bytes(&KTX2_IDENTIFIER), Format::Ktx2);
        assert_eq!(Format::from_bytes(b"#?RADIANCE\n"), Format::Hdr);

        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(Format::from_bytes(&png), Format::Png);

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(Format::from_bytes(&jpeg), Format::Jpeg);

        assert_eq!(Format::from_bytes(&[0, 0, 0, 0]), Format::Unknown);
        assert_eq!(Format::from_bytes(&[]), Format::Unknown);
    }

    #[test]
    fn test_format_properties() {
        assert_eq!(Format::Ktx2.extension(), "ktx2");
        assert_eq!(Format::Hdr.mime_type(), "image/vnd.radiance");
        assert!(!Format::Png.is_readable());
    }
}
