//! Parallel sRGB to linear conversion.
//!
//! [`LinearizePool`] owns a fixed-size rayon pool. Each conversion call
//! splits the array into disjoint slices, converts every slice on a worker
//! and waits until one completion token per slice has arrived before it
//! returns.
//!
//! Per element: `out = ((v / scale + 0.055) / 1.055)^2.4 * scale`, where
//! `scale` is the integer range of the element type.
//!
//! # Example
//!
//! ```rust
//! use ktx_core::srgb::LinearizePool;
//!
//! let pool = LinearizePool::new(2).unwrap();
//! let mut data = vec![0u8, 128, 255];
//! pool.to_linear_u8(&mut data);
//! assert_eq!(data[0], 0);
//! assert_eq!(data[2], 255);
//! assert!(data[1] < 128);
//! ```

use std::sync::mpsc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use crate::Result;

/// Completion token sent by a worker once its slice is converted.
#[derive(Debug, Clone, Copy)]
struct SliceDone;

/// Fixed-size worker pool for sRGB to linear conversion.
pub struct LinearizePool {
    pool: ThreadPool,
    threads: usize,
    slice_len: Option<usize>,
}

impl LinearizePool {
    /// Creates a pool with `threads` workers (`0` uses the rayon default).
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("srgb-linear-{i}"))
            .build()?;
        let threads = pool.current_num_threads();
        debug!(threads, "LinearizePool created");
        Ok(Self {
            pool,
            threads,
            slice_len: None,
        })
    }

    /// Sets a fixed slice length instead of one slice per worker.
    pub fn with_slice_len(mut self, slice_len: usize) -> Self {
        self.slice_len = Some(slice_len.max(1));
        self
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Converts 8-bit values in place, returns the number of slices.
    pub fn to_linear_u8(&self, data: &mut [u8]) -> usize {
        self.run(data, |v| *v = linearize_u8(*v))
    }

    /// Converts 16-bit values in place, returns the number of slices.
    pub fn to_linear_u16(&self, data: &mut [u16]) -> usize {
        self.run(data, |v| *v = linearize_u16(*v))
    }

    /// Converts packed 8-bit-per-channel ints in place.
    ///
    /// The three low bytes are converted, the high (alpha) byte is kept.
    pub fn to_linear_u32(&self, data: &mut [u32]) -> usize {
        self.run(data, |v| {
            let bytes = v.to_le_bytes();
            *v = u32::from_le_bytes([
                linearize_u8(bytes[0]),
                linearize_u8(bytes[1]),
                linearize_u8(bytes[2]),
                bytes[3],
            ]);
        })
    }

    fn run<T, F>(&self, data: &mut [T], convert: F) -> usize
    where
        T: Send,
        F: Fn(&mut T) + Sync,
    {
        if data.is_empty() {
            return 0;
        }
        let slice_len = self
            .slice_len
            .unwrap_or_else(|| data.len().div_ceil(self.threads.max(1)));
        let slices = data.len().div_ceil(slice_len);
        trace!(len = data.len(), slice_len, slices, "srgb::run");

        let (tx, rx) = mpsc::channel::<SliceDone>();
        let convert = &convert;
        self.pool.scope(|scope| {
            for chunk in data.chunks_mut(slice_len) {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    chunk.iter_mut().for_each(convert);
                    // receiver outlives the scope
                    let _ = tx.send(SliceDone);
                });
            }
        });
        drop(tx);

        let done = rx.iter().take(slices).count();
        debug_assert_eq!(done, slices);
        done
    }
}

#[inline]
fn srgb_to_linear(v: f32) -> f32 {
    ((v + 0.055) / 1.055).powf(2.4)
}

/// Linearizes one 8-bit sRGB value.
#[inline]
pub fn linearize_u8(v: u8) -> u8 {
    (srgb_to_linear(v as f32 / 255.0) * 255.0) as u8
}

/// Linearizes one 16-bit sRGB value.
#[inline]
pub fn linearize_u16(v: u16) -> u16 {
    (srgb_to_linear(v as f32 / 65535.0) * 65535.0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(linearize_u8(0), 0);
        assert_eq!(linearize_u8(255), 255);
        assert_eq!(linearize_u16(0), 0);
        assert_eq!(linearize_u16(65535), 65535);
        assert!(linearize_u8(128) < 64);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let pool = LinearizePool::new(4).unwrap().with_slice_len(100);
        let mut data: Vec<u8> = (0..1000).map(|i| (i % 256) as u8).collect();
        let expected: Vec<u8> = data.iter().map(|&v| linearize_u8(v)).collect();
        assert_eq!(pool.to_linear_u8(&mut data), 10);
        assert_eq!(data, expected);
    }

    #[test]
    fn test_u16_and_u32() {
        let pool = LinearizePool::new(2).unwrap();
        let mut shorts = vec![0u16, 32768, 65535];
        pool.to_linear_u16(&mut shorts);
        assert_eq!(shorts[0], 0);
        assert_eq!(shorts[2], 65535);
        assert!(shorts[1] < 16384);

        let mut ints = vec![0xFF80_00FFu32];
        pool.to_linear_u32(&mut ints);
        let bytes = ints[0].to_le_bytes();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes[1], 0);
        assert_eq!(bytes[2], linearize_u8(0x80));
        assert_eq!(bytes[3], 0xFF);
    }

    #[test]
    fn test_empty() {
        let pool = LinearizePool::new(1).unwrap();
        let mut data: Vec<u8> = Vec::new();
        assert_eq!(pool.to_linear_u8(&mut data), 0);
    }
}
