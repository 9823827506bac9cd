//! Radiance HDR (RGBE) decoder.
//!
//! Parses the `#?RADIANCE` text header, its `KEY=VALUE` variables and the
//! `-Y H +X W` resolution line, then decodes the scanline body. Both body
//! encodings are supported:
//!
//! - **new-style RLE**: each scanline starts with `2, 2, len_hi, len_lo`,
//!   followed by the R, G, B and E planes, each run-length encoded on its
//!   own (a code above 128 repeats the next byte `code - 128` times, any
//!   other code is followed by that many literal bytes);
//! - **old-style**: literal 4-byte pixels. The `(1, 1, 1)` repeat marker is
//!   not supported.
//!
//! A file may not mix both encodings and must end right after the last
//! scanline.
//!
//! Decoded pixels are expanded to `R32G32B32_SFLOAT` (default) or
//! `R16G16B16_SFLOAT`, with a luminance summary gathered on the way.
//!
//! # Example
//!
//! ```no_run
//! use ktx_io::hdr::HdrReader;
//! use ktx_io::{ImageHeader, ImageReader};
//!
//! let header = HdrReader::new().read("sky.hdr")?;
//! let buffer = header.data()?;
//! println!("{}x{}, {:?}", buffer.width(), buffer.height(), buffer.hdr_properties()?);
//! # Ok::<(), ktx_io::IoError>(())
//! ```

use std::path::Path;

use half::f16;
use ktx_core::{half_float, BufferLayout, HdrProperties, PixelBuffer, PixelFormat, Precision};
use tracing::{debug, trace, warn};

use crate::metadata::KeyValueData;
use crate::{ImageHeader, ImageReader, IoError, IoResult, ScanlineError};

const SIGNATURE: &[u8] = b"#?RADIANCE";
const SIGNATURE_RGBE: &[u8] = b"#?RGBE";

/// Reads a Radiance file into a `R32G32B32_SFLOAT` buffer.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    HdrReader::new().read(path)?.data()
}

/// Radiance file reader.
#[derive(Debug, Clone, Copy)]
pub struct HdrReader {
    target: PixelFormat,
}

impl Default for HdrReader {
    fn default() -> Self {
        Self::new()
    }
}

impl HdrReader {
    /// Reader producing 32-bit float RGB.
    pub fn new() -> Self {
        Self {
            target: PixelFormat::R32G32B32_SFLOAT,
        }
    }

    /// Sets the output format, `R32G32B32_SFLOAT` or `R16G16B16_SFLOAT`.
    pub fn with_target(mut self, target: PixelFormat) -> Self {
        self.target = target;
        self
    }

    fn check_target(&self) -> IoResult<Precision> {
        match (self.target.component_count(), self.target.precision()) {
            (3, Some(precision)) => Ok(precision),
            _ => Err(IoError::UnsupportedFormat(format!(
                "HDR target {}",
                self.target.name()
            ))),
        }
    }
}

impl ImageReader for HdrReader {
    type Header = HdrHeader;

    fn read<P: AsRef<Path>>(&self, path: P) -> IoResult<HdrHeader> {
        trace!(path = %path.as_ref().display(), "hdr::read");
        self.check_target()?;
        let data = std::fs::read(path.as_ref())?;
        HdrHeader::parse(data, self.target)
    }

    fn read_from_memory(&self, data: &[u8]) -> IoResult<HdrHeader> {
        self.check_target()?;
        HdrHeader::parse(data.to_vec(), self.target)
    }
}

/// Parsed Radiance header; the body is decoded by [`ImageHeader::data`].
#[derive(Debug, Clone)]
pub struct HdrHeader {
    variables: KeyValueData,
    orientation: String,
    width: u32,
    height: u32,
    target: PixelFormat,
    body_offset: usize,
    file: Option<Vec<u8>>,
}

impl HdrHeader {
    /// Parses the text header of a Radiance file held in memory.
    pub fn parse(file: Vec<u8>, target: PixelFormat) -> IoResult<Self> {
        let mut cursor = Cursor::new(&file);

        let signature = cursor.line()?;
        if signature != SIGNATURE && signature != SIGNATURE_RGBE {
            return Err(ScanlineError::BadSignature.into());
        }

        let mut variables = KeyValueData::new();
        loop {
            let line = cursor.line()?;
            if line.is_empty() {
                break;
            }
            let line = String::from_utf8_lossy(line);
            let mut tokens = line.split('=').filter(|t| !t.is_empty());
            if let (Some(key), Some(value)) = (tokens.next(), tokens.next()) {
                variables.push(key.to_uppercase(), value);
            }
        }
        if let Some(format) = variables.get("FORMAT") {
            if format.trim() != "32-bit_rle_rgbe" {
                warn!(format, "HDR pixels are not RGBE, decoding as RGBE");
            }
        }

        let resolution = String::from_utf8_lossy(cursor.line()?).into_owned();
        let (orientation, height, width) = parse_resolution(&resolution)?;
        debug!(width, height, orientation = %orientation, variables = variables.len(), "Parsed HDR header");

        let body_offset = cursor.pos;
        Ok(Self {
            variables,
            orientation,
            width,
            height,
            target,
            body_offset,
            file: Some(file),
        })
    }

    /// Header variables with upper-cased keys.
    pub fn variables(&self) -> &KeyValueData {
        &self.variables
    }

    /// Concatenated orientation tags of the resolution line, e.g. `-Y+X`.
    pub fn orientation(&self) -> &str {
        &self.orientation
    }

    /// Decodes the scanline body to interleaved RGBE bytes.
    pub fn decode_rgbe(&self) -> IoResult<Vec<u8>> {
        let file = self
            .file
            .as_ref()
            .ok_or(IoError::Core(ktx_core::Error::UseAfterDestroy))?;
        let width = self.width as usize;
        let height = self.height as usize;
        trace!(width, height, "hdr::decode_rgbe");

        let mut decoder = ScanlineDecoder {
            cursor: Cursor {
                data: file,
                pos: self.body_offset,
            },
            width,
            style: None,
        };
        let required = min_scanline_len(self.width).saturating_mul(self.height as u64);
        if (decoder.cursor.remaining() as u64) < required {
            return Err(ScanlineError::Truncated.into());
        }
        let size = width
            .checked_mul(height)
            .and_then(|texels| texels.checked_mul(4))
            .ok_or_else(|| IoError::malformed(format!("{width}x{height} image overflows")))?;
        let mut rgbe = vec![0u8; size];
        if width > 0 {
            for scanline in rgbe.chunks_exact_mut(width * 4) {
                decoder.decode(scanline)?;
            }
        }

        let remaining = decoder.cursor.remaining();
        if remaining != 0 {
            return Err(ScanlineError::TrailingData(remaining).into());
        }
        debug!(style = ?decoder.style, "Decoded HDR scanlines");
        Ok(rgbe)
    }

    fn layout(&self) -> BufferLayout {
        BufferLayout::new(self.width, self.height)
    }

    fn to_f32(&self, rgbe: &[u8]) -> IoResult<PixelBuffer> {
        let mut props = HdrProperties::new();
        let mut expanded = Vec::with_capacity(rgbe.len() / 4 * 3);
        for pixel in rgbe.chunks_exact(4) {
            let [r, g, b] = half_float::rgbe_to_f32(pixel[3], [pixel[0], pixel[1], pixel[2]]);
            props.add(r, g, b);
            expanded.extend_from_slice(&[r, g, b]);
        }
        debug!(luminance = ?props.luminance(), "Converted RGBE to f32");
        Ok(PixelBuffer::from_f32(&expanded, self.target, self.layout(), Some(props))?)
    }

    fn to_f16(&self, rgbe: &[u8]) -> IoResult<PixelBuffer> {
        let mut props = HdrProperties::new();
        let mut expanded: Vec<f16> = Vec::with_capacity(rgbe.len() / 4 * 3);
        for pixel in rgbe.chunks_exact(4) {
            let half = half_float::rgbe_to_half(pixel[3], [pixel[0], pixel[1], pixel[2]]);
            let [r, g, b] = half.map(half_float::from_f16);
            props.add(r, g, b);
            expanded.extend_from_slice(&half);
        }
        debug!(luminance = ?props.luminance(), "Converted RGBE to f16");
        Ok(PixelBuffer::from_f16(expanded, self.target, self.layout(), Some(props))?)
    }
}

impl ImageHeader for HdrHeader {
    fn format(&self) -> PixelFormat {
        self.target
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn depth(&self) -> u32 {
        0
    }

    fn level_count(&self) -> u32 {
        0
    }

    fn layer_count(&self) -> u32 {
        0
    }

    fn face_count(&self) -> u32 {
        1
    }

    fn data(&self) -> IoResult<PixelBuffer> {
        let rgbe = self.decode_rgbe()?;
        match self.target.precision() {
            Some(Precision::F16) => self.to_f16(&rgbe),
            _ => self.to_f32(&rgbe),
        }
    }

    fn metadata(&self) -> Option<&KeyValueData> {
        Some(&self.variables)
    }

    fn destroy(&mut self) {
        self.file = None;
    }
}

/// Fewest bytes any scanline of `width` pixels encodes to: literal
/// pixels, or the 4-byte marker plus one maximal run per 127 pixels in
/// each plane.
fn min_scanline_len(width: u32) -> u64 {
    let width = width as u64;
    (4 * width).min(4 + 8 * width.div_ceil(127))
}

/// Resolution line: orientation, height, orientation, width.
fn parse_resolution(line: &str) -> Result<(String, u32, u32), ScanlineError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(ScanlineError::BadResolutionLine);
    }
    let height = tokens[1].parse().map_err(|_| ScanlineError::BadResolutionLine)?;
    let width = tokens[3].parse().map_err(|_| ScanlineError::BadResolutionLine)?;
    Ok((format!("{}{}", tokens[0], tokens[2]), height, width))
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn byte(&mut self) -> Result<u8, ScanlineError> {
        let b = *self.data.get(self.pos).ok_or(ScanlineError::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn peek4(&self) -> Result<[u8; 4], ScanlineError> {
        match self.data.get(self.pos..self.pos + 4) {
            Some(b) => Ok([b[0], b[1], b[2], b[3]]),
            None => Err(ScanlineError::Truncated),
        }
    }

    /// Next `\n`-terminated line without the terminator (and a trailing `\r`).
    fn line(&mut self) -> Result<&'a [u8], ScanlineError> {
        let data = self.data;
        let rest = &data[self.pos..];
        let end = rest
            .iter()
            .position(|&b| b == b'\n')
            .ok_or(ScanlineError::Truncated)?;
        self.pos += end + 1;
        let line = &rest[..end];
        Ok(line.strip_suffix(b"\r").unwrap_or(line))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Old,
    New,
}

struct ScanlineDecoder<'a> {
    cursor: Cursor<'a>,
    width: usize,
    style: Option<Style>,
}

impl ScanlineDecoder<'_> {
    fn set_style(&mut self, style: Style) -> Result<(), ScanlineError> {
        match self.style {
            Some(current) if current != style => Err(ScanlineError::InconsistentScanlineEncoding),
            _ => {
                self.style = Some(style);
                Ok(())
            }
        }
    }

    /// Decodes one scanline into `out` (`width * 4` interleaved RGBE bytes).
    fn decode(&mut self, out: &mut [u8]) -> Result<(), ScanlineError> {
        let run = self.cursor.peek4()?;
        if run[0] == 2 && run[1] == 2 && run[2] & 0x80 == 0 {
            self.set_style(Style::New)?;
            self.cursor.pos += 4;
            let length = ((run[2] as usize) << 8) | run[3] as usize;
            if length != self.width {
                return Err(ScanlineError::ScanlineLengthMismatch {
                    expected: self.width,
                    actual: length,
                });
            }
            for plane in 0..4 {
                self.decode_plane(out, plane)?;
            }
        } else {
            self.set_style(Style::Old)?;
            for pixel in out.chunks_exact_mut(4) {
                let rgbe = self.cursor.peek4()?;
                if rgbe[0] == 1 && rgbe[1] == 1 && rgbe[2] == 1 {
                    return Err(ScanlineError::UnsupportedRepeatMarker);
                }
                self.cursor.pos += 4;
                pixel.copy_from_slice(&rgbe);
            }
        }
        Ok(())
    }

    fn decode_plane(&mut self, out: &mut [u8], plane: usize) -> Result<(), ScanlineError> {
        let width = self.width;
        let mut x = 0usize;
        while x < width {
            let code = self.cursor.byte()?;
            let (count, repeat) = if code > 128 {
                ((code & 127) as usize, true)
            } else {
                (code as usize, false)
            };
            if x + count > width {
                return Err(ScanlineError::ScanlineOverrun { x, width });
            }
            if repeat {
                let value = self.cursor.byte()?;
                for i in x..x + count {
                    out[i * 4 + plane] = value;
                }
            } else {
                for i in x..x + count {
                    out[i * 4 + plane] = self.cursor.byte()?;
                }
            }
            x += count;
        }
        Ok(())
    }
}
