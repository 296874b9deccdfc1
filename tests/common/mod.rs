//! Shared fixture support for the integration suites
//!
//! `DatBuilder` synthesizes format-conformant `.dat` blobs from a set of
//! (range end, record) pairs. Database construction is a library non-goal
//! (the real files come from an external tool), so this writer lives with
//! the tests only.
#![allow(dead_code)]

use std::net::Ipv4Addr;

/// Builds a binary database blob from inclusive range upper bounds
pub struct DatBuilder {
    ranges: Vec<(u32, String)>,
}

impl DatBuilder {
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Add a range ending at `end` (inclusive, dotted quad) with `record`
    pub fn range(self, end: &str, record: &str) -> Self {
        let end_ip = u32::from(end.parse::<Ipv4Addr>().unwrap());
        self.range_u32(end_ip, record)
    }

    /// Add a range ending at `end_ip` (inclusive, big-endian-packed)
    pub fn range_u32(mut self, end_ip: u32, record: &str) -> Self {
        self.ranges.push((end_ip, record.to_string()));
        self
    }

    /// Assemble the blob: header, per-octet windows, range table, text
    pub fn build(mut self) -> Vec<u8> {
        self.ranges.sort_by_key(|&(end_ip, _)| end_ip);
        let count = self.ranges.len();
        let endpoints: Vec<u32> = self.ranges.iter().map(|&(end_ip, _)| end_ip).collect();

        let mut out = Vec::new();
        out.extend_from_slice(&(count as u32).to_le_bytes());

        // Per-octet candidate windows: leftmost endpoint at or above the
        // octet's lowest / highest address, clamped into the table so the
        // window is always valid.
        let clamp = |i: usize| -> u32 {
            if count == 0 {
                0
            } else {
                i.min(count - 1) as u32
            }
        };
        for octet in 0u32..256 {
            let lo = octet << 24;
            let hi = lo | 0x00FF_FFFF;
            let first = clamp(endpoints.partition_point(|&e| e < lo));
            let last = clamp(endpoints.partition_point(|&e| e < hi));
            out.extend_from_slice(&first.to_le_bytes());
            out.extend_from_slice(&last.to_le_bytes());
        }

        let text_base = 4 + 256 * 8 + count * 8;
        let mut text = Vec::new();
        for (end_ip, record) in &self.ranges {
            let offset = text_base + text.len();
            assert!(offset < (1 << 24), "text region exceeds 24-bit offsets");
            assert!(record.len() <= u8::MAX as usize, "record longer than 255 bytes");
            out.extend_from_slice(&end_ip.to_le_bytes());
            out.extend_from_slice(&[offset as u8, (offset >> 8) as u8, (offset >> 16) as u8]);
            out.push(record.len() as u8);
            text.extend_from_slice(record.as_bytes());
        }
        out.extend_from_slice(&text);
        out
    }
}

/// A realistic qqzeng-style record: the area code ("CN") sits at pipe
/// field index 8, matching what the production accessor reads.
pub const CN_RECORD: &str = "Asia|China|Beijing|Beijing||Unicom|110000|China|CN|116.40,39.90";
