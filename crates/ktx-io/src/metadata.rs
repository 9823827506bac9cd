//! Key-value metadata.
//!
//! [`KeyValueData`] is the ordered key/value list stored in a container's
//! KVD block, and also carries the header variables of Radiance files.
//! Keys are matched case-insensitively.
//!
//! # KVD layout
//!
//! Each record is a little-endian `u32` byte length followed by the key,
//! a NUL, the value and a NUL, zero-padded to a 4-byte boundary:
//!
//! ```text
//! [len: u32][key bytes][0][value bytes][0][pad to 4]
//! ```
//!
//! # Example
//!
//! ```rust
//! use ktx_io::metadata::KeyValueData;
//!
//! let mut kvd = KeyValueData::new();
//! kvd.push("MAX", "12.5");
//! assert_eq!(kvd.get_f32("max"), Some(12.5));
//! assert_eq!(kvd.byte_len(), 4 + 12);
//! ```

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use ktx_core::PixelBuffer;
use tracing::{debug, trace};

use crate::{IoError, IoResult};

/// Minimum component value of float payloads.
pub const KEY_MIN: &str = "MIN";
/// Maximum component value of float payloads.
pub const KEY_MAX: &str = "MAX";
/// Mean luminance of float payloads.
pub const KEY_AVG: &str = "AVG";

/// Rounds `len` up to a multiple of 4.
#[inline]
pub(crate) fn align4(len: usize) -> usize {
    (len + 3) & !3
}

/// One metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    key: String,
    value: String,
}

impl KeyValue {
    /// Creates a record.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Record key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Record value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Value parsed as a float.
    pub fn as_f32(&self) -> Option<f32> {
        self.value.trim().parse().ok()
    }

    /// Byte length stored in the record header (both strings plus NULs).
    pub fn record_len(&self) -> usize {
        self.key.len() + self.value.len() + 2
    }
}

/// Ordered key/value list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueData {
    entries: Vec<KeyValue>,
}

impl KeyValueData {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push(KeyValue::new(key, value));
    }

    /// Value of the first record whose key matches, ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|kv| kv.key.eq_ignore_ascii_case(key))
            .map(|kv| kv.value.as_str())
    }

    /// Value parsed as a float.
    pub fn get_f32(&self, key: &str) -> Option<f32> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.entries.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when there are no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the encoded KVD block.
    pub fn byte_len(&self) -> usize {
        self.entries
            .iter()
            .map(|kv| align4(kv.record_len()) + 4)
            .sum()
    }

    /// Encodes the KVD block, returning the bytes written.
    pub fn write_kvd<W: Write>(&self, writer: &mut W) -> IoResult<usize> {
        let mut written = 0;
        for kv in &self.entries {
            if kv.key.contains('\0') || kv.value.contains('\0') {
                return Err(IoError::malformed(format!("NUL in metadata key {:?}", kv.key)));
            }
            let len = kv.record_len();
            writer.write_u32::<LittleEndian>(len as u32)?;
            writer.write_all(kv.key.as_bytes())?;
            writer.write_all(&[0])?;
            writer.write_all(kv.value.as_bytes())?;
            writer.write_all(&[0])?;
            let padding = align4(len) - len;
            writer.write_all(&[0u8; 3][..padding])?;
            written += 4 + len + padding;
        }
        trace!(entries = self.entries.len(), written, "KeyValueData::write_kvd");
        Ok(written)
    }

    /// Decodes a KVD block.
    pub fn parse_kvd(data: &[u8]) -> IoResult<Self> {
        let mut entries = Vec::new();
        let mut current = 0usize;
        while current < data.len() {
            let header = data
                .get(current..current + 4)
                .ok_or_else(|| IoError::malformed("truncated KVD record length"))?;
            let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let start = current + 4;
            let record = data
                .get(start..start + len)
                .ok_or_else(|| IoError::malformed(format!("KVD record at {current} overruns block")))?;

            let split = record
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| IoError::malformed("KVD key is not NUL terminated"))?;
            let key = String::from_utf8_lossy(&record[..split]).into_owned();
            let rest = &record[split + 1..];
            let value_end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
            let value = String::from_utf8_lossy(&rest[..value_end]).into_owned();
            entries.push(KeyValue { key, value });

            current = start + align4(len);
        }
        debug!(entries = entries.len(), "Parsed KVD");
        Ok(Self { entries })
    }

    /// Builds the `MIN` / `MAX` / `AVG` records for a set of buffers.
    ///
    /// Float buffers report the smallest and largest component value and the
    /// mean of the per-buffer mean luminance. Integer buffers report the
    /// fixed `0` / `255` range.
    pub fn from_buffers(buffers: &[PixelBuffer]) -> IoResult<Self> {
        let mut kvd = Self::new();
        let Some(first) = buffers.first() else {
            return Ok(kvd);
        };
        if !first.format().is_float() {
            kvd.push(KEY_MIN, "0");
            kvd.push(KEY_MAX, "255");
            return Ok(kvd);
        }

        let mut min = f32::MAX;
        let mut max = f32::MIN;
        let mut mean_sum = 0f64;
        let mut counted = 0usize;
        for buffer in buffers {
            if let Some(props) = buffer.hdr_properties()? {
                if props.is_empty() {
                    continue;
                }
                min = min.min(props.min_value());
                max = max.max(props.max_value());
                mean_sum += props.mean_luminance() as f64;
                counted += 1;
            }
        }
        if counted == 0 {
            return Ok(kvd);
        }
        kvd.push(KEY_MIN, min.to_string());
        kvd.push(KEY_MAX, max.to_string());
        kvd.push(KEY_AVG, ((mean_sum / counted as f64) as f32).to_string());
        Ok(kvd)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValueData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| KeyValue::new(k, v)).collect(),
        }
    }
}
