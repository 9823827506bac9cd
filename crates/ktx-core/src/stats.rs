//! Luminance summary of HDR pixel data.
//!
//! [`HdrProperties`] accumulates the min/max component value and the
//! min/max/mean luminance of float images. Float-backed pixel buffers carry
//! one, the HDR decoder fills it while expanding RGBE, and the container
//! writer turns it into `MIN` / `MAX` / `AVG` metadata.
//!
//! # Example
//!
//! ```rust
//! use ktx_core::stats::HdrProperties;
//!
//! let mut props = HdrProperties::new();
//! props.add(1.0, 1.0, 1.0);
//! props.add(0.0, 0.0, 0.0);
//! assert_eq!(props.max_value(), 1.0);
//! assert_eq!(props.min_value(), 0.0);
//! assert_eq!(props.count(), 2);
//! ```

/// BT.2100 luminance coefficient for red channel.
pub const BT2100_LUMA_R: f32 = 0.292;

/// BT.2100 luminance coefficient for green channel.
pub const BT2100_LUMA_G: f32 = 0.797;

/// BT.2100 luminance coefficient for blue channel.
pub const BT2100_LUMA_B: f32 = 0.046;

/// BT.2100 luminance coefficients as an array [R, G, B].
pub const BT2100_LUMA: [f32; 3] = [BT2100_LUMA_R, BT2100_LUMA_G, BT2100_LUMA_B];

/// Luminance of a linear RGB triplet.
#[inline]
pub fn luminance_bt2100(r: f32, g: f32, b: f32) -> f32 {
    r * BT2100_LUMA_R + g * BT2100_LUMA_G + b * BT2100_LUMA_B
}

/// Running min/max/mean summary over RGB samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HdrProperties {
    min_value: f32,
    max_value: f32,
    min_luminance: f32,
    max_luminance: f32,
    total_luminance: f64,
    count: u64,
}

impl Default for HdrProperties {
    fn default() -> Self {
        Self::new()
    }
}

impl HdrProperties {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self {
            min_value: f32::MAX,
            max_value: f32::MIN,
            min_luminance: f32::MAX,
            max_luminance: f32::MIN,
            total_luminance: 0.0,
            count: 0,
        }
    }

    /// Builds a summary over interleaved samples with `components` channels.
    pub fn from_samples(data: &[f32], components: usize) -> Self {
        let mut props = Self::new();
        props.add_samples(data, components);
        props
    }

    /// Adds one pixel.
    pub fn add(&mut self, r: f32, g: f32, b: f32) {
        let l = luminance_bt2100(r, g, b);
        self.min_luminance = self.min_luminance.min(l);
        self.max_luminance = self.max_luminance.max(l);
        self.min_value = self.min_value.min(r.min(g).min(b));
        self.max_value = self.max_value.max(r.max(g).max(b));
        self.total_luminance += l as f64;
        self.count += 1;
    }

    /// Adds interleaved samples.
    ///
    /// One channel is treated as gray, two as red/green, and a fourth
    /// (alpha) channel is ignored.
    pub fn add_samples(&mut self, data: &[f32], components: usize) {
        match components {
            0 => {}
            1 => data.iter().for_each(|&v| self.add(v, v, v)),
            2 => data.chunks_exact(2).for_each(|p| self.add(p[0], p[1], 0.0)),
            n => data.chunks_exact(n).for_each(|p| self.add(p[0], p[1], p[2])),
        }
    }

    /// Folds another summary into this one.
    pub fn merge(&mut self, other: &HdrProperties) {
        if other.count == 0 {
            return;
        }
        self.min_value = self.min_value.min(other.min_value);
        self.max_value = self.max_value.max(other.max_value);
        self.min_luminance = self.min_luminance.min(other.min_luminance);
        self.max_luminance = self.max_luminance.max(other.max_luminance);
        self.total_luminance += other.total_luminance;
        self.count += other.count;
    }

    /// Smallest RGB component seen.
    #[inline]
    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    /// Largest RGB component seen.
    #[inline]
    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    /// Smallest pixel luminance seen.
    #[inline]
    pub fn min_luminance(&self) -> f32 {
        self.min_luminance
    }

    /// Largest pixel luminance seen.
    #[inline]
    pub fn max_luminance(&self) -> f32 {
        self.max_luminance
    }

    /// Mean pixel luminance, `0.0` when empty.
    pub fn mean_luminance(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        (self.total_luminance / self.count as f64) as f32
    }

    /// `[min, max, mean]` luminance.
    pub fn luminance(&self) -> [f32; 3] {
        [self.min_luminance, self.max_luminance, self.mean_luminance()]
    }

    /// Number of pixels added.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns `true` if no pixel was added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_luminance_weights() {
        assert_relative_eq!(luminance_bt2100(1.0, 1.0, 1.0), 0.292 + 0.797 + 0.046);
        assert_relative_eq!(luminance_bt2100(0.0, 0.0, 2.0), 0.092);
    }

    #[test]
    fn test_accumulate() {
        let data = [0.5, 1.0, 2.0, 0.0, 0.25, 4.0];
        let props = HdrProperties::from_samples(&data, 3);
        assert_eq!(props.count(), 2);
        assert_eq!(props.min_value(), 0.0);
        assert_eq!(props.max_value(), 4.0);
        let l0 = luminance_bt2100(0.5, 1.0, 2.0);
        let l1 = luminance_bt2100(0.0, 0.25, 4.0);
        assert_relative_eq!(props.max_luminance(), l0.max(l1));
        assert_relative_eq!(props.min_luminance(), l0.min(l1));
        assert_relative_eq!(props.mean_luminance(), (l0 + l1) / 2.0, max_relative = 1e-6);
    }

    #[test]
    fn test_negative_values() {
        let props = HdrProperties::from_samples(&[-1.0, -2.0, -3.0], 3);
        assert_eq!(props.max_value(), -1.0);
        assert_eq!(props.min_value(), -3.0);
    }

    #[test]
    fn test_merge_and_empty() {
        let mut a = HdrProperties::from_samples(&[1.0, 1.0, 1.0, 1.0], 4);
        let b = HdrProperties::from_samples(&[3.0], 1);
        a.merge(&b);
        a.merge(&HdrProperties::new());
        assert_eq!(a.count(), 2);
        assert_eq!(a.max_value(), 3.0);
        assert!(HdrProperties::new().is_empty());
        assert_eq!(HdrProperties::new().mean_luminance(), 0.0);
    }
}
