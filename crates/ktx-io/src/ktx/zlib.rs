//! Zlib supercompression of the level payload.

use crate::{IoError, IoResult};

/// Default compression level.
pub const DEFAULT_LEVEL: u8 = 9;

/// Compresses a payload into a zlib stream.
pub fn compress(data: &[u8], level: u8) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(data, level.min(10))
}

/// Inflates a zlib stream that must produce exactly `expected_size` bytes.
pub fn decompress(compressed: &[u8], expected_size: usize) -> IoResult<Vec<u8>> {
    let options = zune_inflate::DeflateOptions::default()
        .set_limit(expected_size)
        .set_size_hint(expected_size);
    let mut decoder = zune_inflate::DeflateDecoder::new_with_options(compressed, options);
    let inflated = decoder.decode_zlib().map_err(|e| IoError::CorruptPayload {
        expected: expected_size,
        actual: e.data.len(),
    })?;
    if inflated.len() != expected_size {
        return Err(IoError::CorruptPayload {
            expected: expected_size,
            actual: inflated.len(),
        });
    }
    Ok(inflated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_payload() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 7) as u8).collect();
        let compressed = compress(&data, DEFAULT_LEVEL);
        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed, data.len()).unwrap(), data);
    }

    #[test]
    fn short_payload_is_corrupt() {
        let compressed = compress(&[1, 2, 3, 4], DEFAULT_LEVEL);
        assert!(matches!(
            decompress(&compressed, 8),
            Err(IoError::CorruptPayload { expected: 8, actual: 4 })
        ));
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(matches!(
            decompress(&[0xFF; 16], 8),
            Err(IoError::CorruptPayload { expected: 8, .. })
        ));
    }
}
