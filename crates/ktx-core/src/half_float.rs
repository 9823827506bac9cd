//! Software half-float codec.
//!
//! Bit-exact conversion between `f32` and IEEE-754 binary16 using the
//! classic log2 / trial-exponent algorithm instead of hardware rounding:
//! the fraction is truncated against a reconstructed power-of-two
//! magnitude, subnormals are produced below `2^-14`, and values past the
//! half range clamp to [`MAX_VALUE`] instead of becoming infinity.
//!
//! The Radiance RGBE expansion helpers used by the HDR decoder live here as
//! well.
//!
//! # Example
//!
//! ```rust
//! use ktx_core::half_float::{decode, encode, MAX_VALUE};
//!
//! assert_eq!(encode(1.0), 0x3C00);
//! assert_eq!(decode(0x3C00), 1.0);
//! assert_eq!(decode(encode(1.0e6)), MAX_VALUE);
//! ```

use half::f16;

/// Largest finite half-float value.
pub const MAX_VALUE: f32 = 65504.0;

/// Largest subnormal half-float value.
pub const MAX_SUBNORMAL: f32 = 0.000060975552;

#[inline]
fn pow2(exponent: i32) -> f32 {
    2f64.powi(exponent) as f32
}

/// Encodes a 32-bit float as half-float bits.
pub fn encode(value: f32) -> u16 {
    let sign = ((value.to_bits() >> 16) & 0x8000) as u16;
    let mut value = value;
    if value < 0.0 {
        value = -value;
    } else if value == 0.0 {
        return sign;
    }

    let mut log2 = ((value as f64).ln() / 2f64.ln()) as i32;
    if log2 < 0 {
        log2 -= 1;
    }
    let mut exponent = if log2 < -15 {
        0
    } else if log2 > 15 {
        30
    } else {
        log2 + 15
    };

    let mut magnitude = pow2(exponent - 15);
    if magnitude > value {
        if exponent > 0 {
            exponent -= 1;
            magnitude = pow2(exponent - 15);
        } else {
            // subnormal
            magnitude = pow2(exponent - 14);
        }
    }

    let mut fraction = ((value / magnitude) * 1024.0) as i32 - 1024;
    if fraction >= 1024 {
        if exponent < 30 {
            exponent += 1;
            fraction -= 1024;
        } else {
            fraction = 1023;
        }
    } else if fraction < 0 {
        fraction += 1024;
    }

    ((exponent << 10) as u16) | (fraction as u16) | sign
}

/// Decodes half-float bits to a 32-bit float.
pub fn decode(bits: u16) -> f32 {
    let exponent = ((bits >> 10) & 0x1f) as i32;
    let fraction = (bits & 0x3ff) as i32;
    let magnitude = if exponent != 0 {
        pow2(exponent - 15) * ((fraction | 0x400) as f32 / 1024.0)
    } else {
        pow2(-14) * (fraction as f32 / 1024.0)
    };
    if bits & 0x8000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Encodes a 32-bit float into a typed [`f16`].
#[inline]
pub fn to_f16(value: f32) -> f16 {
    f16::from_bits(encode(value))
}

/// Decodes a typed [`f16`].
#[inline]
pub fn from_f16(value: f16) -> f32 {
    decode(value.to_bits())
}

/// Expands an RGBE pixel to linear floats.
///
/// `component = (mantissa / 255) * 2^(exponent - 128)`; a zero exponent
/// byte yields black regardless of the mantissas.
pub fn rgbe_to_f32(exponent: u8, mantissa: [u8; 3]) -> [f32; 3] {
    if exponent == 0 {
        return [0.0; 3];
    }
    let scale = pow2(exponent as i32 - 128);
    mantissa.map(|m| (m as f32 / 255.0) * scale)
}

/// Expands an RGBE pixel to half-floats.
///
/// When the brightest component exceeds [`MAX_VALUE`], the triplet is
/// scaled as a whole in the float domain before encoding so the channel
/// ratios survive.
pub fn rgbe_to_half(exponent: u8, mantissa: [u8; 3]) -> [f16; 3] {
    if exponent == 0 {
        return [f16::ZERO; 3];
    }
    let source = rgbe_to_f32(exponent, mantissa);
    let max = source.iter().fold(0f32, |acc, &v| acc.max(v));
    let normalize = if max > MAX_VALUE { MAX_VALUE / max } else { 1.0 };
    source.map(|v| to_f16(v * normalize))
}

/// Encodes a slice of floats into half-float bits.
pub fn encode_slice(src: &[f32]) -> Vec<u16> {
    src.iter().map(|&v| encode(v)).collect()
}

/// Decodes a slice of half-float bits.
pub fn decode_slice(src: &[u16]) -> Vec<f32> {
    src.iter().map(|&v| decode(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn check_binade(min: f32, max: f32, precision: f32) {
        const STEPS: u32 = 4096;
        let step = (max - min) / STEPS as f32;
        for i in 0..STEPS {
            let x = min + step * i as f32;
            let decoded = decode(encode(x));
            if x >= MAX_VALUE {
                assert_eq!(decoded, MAX_VALUE, "x = {x}");
            } else {
                assert!((decoded - x).abs() <= precision, "x = {x}, decoded = {decoded}");
            }
            assert_eq!(decode(encode(-x)), -decoded, "x = -{x}");
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(encode(0.0), 0x0000);
        assert_eq!(encode(-0.0), 0x8000);
        assert_eq!(encode(1.0), 0x3C00);
        assert_eq!(encode(0.5), 0x3800);
        assert_eq!(encode(-2.0), 0xC000);
        assert_eq!(encode(MAX_VALUE), 0x7BFF);
        assert_eq!(encode(1.0e6), 0x7BFF);
        assert_eq!(encode(f32::INFINITY), 0x7BFF);

        assert_eq!(decode(0x3C00), 1.0);
        assert_eq!(decode(0xC000), -2.0);
        assert_eq!(decode(0x7BFF), MAX_VALUE);
        assert_eq!(decode(0x0001), 2f32.powi(-24));
        assert_relative_eq!(decode(0x03FF), MAX_SUBNORMAL, max_relative = 1e-6);
    }

    #[test]
    fn test_decode_matches_ieee() {
        for bits in 0..=u16::MAX {
            if (bits >> 10) & 0x1f == 0x1f {
                continue;
            }
            assert_eq!(decode(bits), f16::from_bits(bits).to_f32(), "bits = {bits:#06x}");
        }
    }

    #[test]
    fn test_precision_per_binade() {
        check_binade(0.0, 1.0 / 16.0, (1.0 / 16.0) / 1023.0);
        for e in -4..=30 {
            let min = 2f32.powi(e);
            let max = 2f32.powi(e + 1);
            check_binade(min, max, min / 1023.0);
        }
    }

    #[test]
    fn test_rgbe_zero_exponent() {
        assert_eq!(rgbe_to_half(0, [255, 128, 7]), [f16::ZERO; 3]);
        assert_eq!(rgbe_to_f32(0, [255, 128, 7]), [0.0; 3]);
    }

    #[test]
    fn test_rgbe_expansion() {
        let rgb = rgbe_to_f32(129, [255, 0, 51]);
        assert_relative_eq!(rgb[0], 2.0);
        assert_eq!(rgb[1], 0.0);
        assert_relative_eq!(rgb[2], 0.4, max_relative = 1e-6);

        let half = rgbe_to_half(129, [255, 0, 51]);
        assert_eq!(half[0].to_bits(), encode(2.0));
        assert_eq!(half[2].to_bits(), encode(rgb[2]));
    }

    #[test]
    fn test_rgbe_overflow_keeps_ratio() {
        // 2^20 * (255/255) overflows half range; green is half of red.
        let half = rgbe_to_half(148, [254, 127, 0]);
        let r = from_f16(half[0]);
        let g = from_f16(half[1]);
        assert!(r <= MAX_VALUE);
        assert!(r > 60000.0);
        assert_relative_eq!(g / r, 0.5, max_relative = 2e-3);
        assert_eq!(from_f16(half[2]), 0.0);
    }

    #[test]
    fn test_slices() {
        let values = [0.25f32, 1.5, -3.0, 100.0];
        let bits = encode_slice(&values);
        assert_eq!(decode_slice(&bits), values.to_vec());
    }
}
