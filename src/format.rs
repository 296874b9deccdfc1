//! On-disk layout of the qqzeng-style `.dat` geolocation database
//!
//! The file is a fixed header followed by two tables and a free-form text
//! region. All multi-byte integers in the file are **little-endian**:
//!
//! ```text
//! [0..4)              record_count: u32
//! [4..2052)           256 prefix entries, one per first-octet value:
//!                       { first: u32, last: u32 }   (inclusive index window
//!                       into the range table)
//! [2052..2052+n*8)    n range entries:
//!                       { end_ip: u32, offset: u24, len: u8 }
//! [text region]       pipe-delimited UTF-8 location strings, addressed by
//!                       absolute { offset, len } spans from the range table
//! ```
//!
//! `end_ip` is the inclusive upper bound of the Nth IP range; the full column
//! is sorted ascending by construction of the file. Query addresses are
//! compared against it as **big-endian**-packed integers (network byte
//! order). The mixed endianness is a property of the format produced by the
//! external database tool and must be preserved bit-for-bit; "normalizing"
//! either side would silently corrupt every lookup against existing files.

use crate::error::{GeoError, Result};
use zerocopy::byteorder::{LittleEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Number of entries in the first-octet prefix table
pub const PREFIX_COUNT: usize = 256;

/// Size of one prefix table entry in bytes
pub const PREFIX_ENTRY_SIZE: usize = 8;

/// Size of one range table entry in bytes
pub const RANGE_ENTRY_SIZE: usize = 8;

/// Byte offset of the prefix table (immediately after the record count)
pub const PREFIX_TABLE_OFFSET: usize = 4;

/// Byte offset of the range table (2052)
pub const RANGE_TABLE_OFFSET: usize = PREFIX_TABLE_OFFSET + PREFIX_COUNT * PREFIX_ENTRY_SIZE;

/// One first-octet entry: the inclusive index window into the range table
/// for addresses whose first octet equals the entry's position (8 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct PrefixEntry {
    /// Index of the first candidate range for this octet
    pub first: U32<LittleEndian>,
    /// Index of the last candidate range for this octet (inclusive)
    pub last: U32<LittleEndian>,
}

/// One IP range entry (8 bytes)
///
/// The text span is absolute in the file: `offset` is a 24-bit little-endian
/// byte offset and `len` an 8-bit length, capping individual records at 255
/// bytes and the addressable text region at 16 MiB.
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct RangeEntry {
    /// Inclusive upper bound of the range, compared against big-endian-packed
    /// query addresses
    pub end_ip: U32<LittleEndian>,
    offset: [u8; 3],
    len: u8,
}

impl RangeEntry {
    /// Build an entry from its parts (used by fixtures and tools)
    pub fn new(end_ip: u32, offset: u32, len: u8) -> Self {
        Self {
            end_ip: U32::new(end_ip),
            offset: [offset as u8, (offset >> 8) as u8, (offset >> 16) as u8],
            len,
        }
    }

    /// Absolute byte offset of the record text (24-bit little-endian)
    pub fn text_offset(&self) -> usize {
        (self.offset[0] as usize) | ((self.offset[1] as usize) << 8) | ((self.offset[2] as usize) << 16)
    }

    /// Record text length in bytes
    pub fn text_len(&self) -> usize {
        self.len as usize
    }
}

/// Typed views over the two table regions of a raw database buffer
#[derive(Debug)]
pub struct Tables<'a> {
    /// The 256-entry first-octet window table
    pub prefix: &'a [PrefixEntry],
    /// The sorted range table (`prefix` windows index into this)
    pub ranges: &'a [RangeEntry],
}

/// Parse the header and table regions out of `data`
///
/// Performs only structural truncation checks; text-span and window
/// validation happens in the loader, which walks every entry anyway.
pub fn parse(data: &[u8]) -> Result<Tables<'_>> {
    if data.len() < RANGE_TABLE_OFFSET {
        return Err(GeoError::Format(format!(
            "file too small for header and prefix table: {} bytes (need at least {})",
            data.len(),
            RANGE_TABLE_OFFSET
        )));
    }

    let record_count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

    let (prefix, _) =
        <[PrefixEntry]>::ref_from_prefix_with_elems(&data[PREFIX_TABLE_OFFSET..], PREFIX_COUNT)
            .map_err(|_| GeoError::Format("prefix table truncated".to_string()))?;

    let range_bytes = &data[RANGE_TABLE_OFFSET..];
    let (ranges, _) = <[RangeEntry]>::ref_from_prefix_with_elems(range_bytes, record_count)
        .map_err(|_| {
            GeoError::Format(format!(
                "range table truncated: {} records need {} bytes, {} available",
                record_count,
                record_count.saturating_mul(RANGE_ENTRY_SIZE),
                range_bytes.len()
            ))
        })?;

    Ok(Tables { prefix, ranges })
}
