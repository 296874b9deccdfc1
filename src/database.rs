//! Geolocation database loader and lookup engine
//!
//! `GeoDatabase` loads a qqzeng-style `.dat` file once and answers
//! dotted-quad IPv4 lookups with a two-level index:
//!
//! 1. The query's first octet indexes a 256-entry window table, narrowing
//!    the search to the ranges that can contain addresses with that octet.
//! 2. Binary search over the sorted range end-points inside that window
//!    finds the unique range containing the address.
//!
//! The database is immutable after load, so concurrent lookups from any
//! number of threads need no locking. Record text is resolved zero-copy
//! from the underlying buffer (memory-mapped or owned) at hit time.
//!
//! Endianness: file integers are little-endian, while query addresses are
//! packed big-endian (`u32::from(Ipv4Addr)`, network byte order) to match
//! the integer encoding baked into the file's `end_ip` column. See the
//! `format` module for why this asymmetry must stay exactly as it is.

use crate::error::{GeoError, Result};
use crate::format::{self, PREFIX_COUNT};
use flate2::read::GzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::net::Ipv4Addr;
use std::path::Path;

/// Area code returned when no better answer exists: malformed query,
/// no matching range, record with fewer than 9 fields, or (through the
/// `shared` accessor) a database that never loaded.
pub const DEFAULT_AREA: &str = "CN";

/// Storage for database data - either owned or memory-mapped
#[derive(Debug)]
enum Storage {
    Owned(Vec<u8>),
    Mmap(Mmap),
}

impl Storage {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Owned(v) => v.as_slice(),
            Storage::Mmap(m) => &m[..],
        }
    }
}

/// Inclusive index window into the range table for one first-octet value
#[derive(Debug, Clone, Copy)]
struct Window {
    first: u32,
    last: u32,
}

/// Byte span of one record's text within the storage buffer
#[derive(Debug, Clone, Copy)]
struct TextSpan {
    start: u32,
    len: u8,
}

/// In-memory IPv4 geolocation database
///
/// Immutable after construction; safe to share across threads by reference.
///
/// # Examples
///
/// ```no_run
/// use geodat::GeoDatabase;
///
/// let db = GeoDatabase::open("/var/lib/geodat/ip.dat")?;
/// if let Some(record) = db.lookup("1.2.3.4") {
///     println!("record: {}", record);
/// }
/// println!("area: {}", db.area("1.2.3.4"));
/// # Ok::<(), geodat::GeoError>(())
/// ```
#[derive(Debug)]
pub struct GeoDatabase {
    data: Storage,
    prefix: Box<[Window]>,
    endpoints: Vec<u32>,
    spans: Vec<TextSpan>,
}

impl GeoDatabase {
    /// Open a database file
    ///
    /// Plain `.dat` files are memory-mapped for zero-copy access. Paths
    /// ending in `.gz` (case-insensitive) are read and gunzipped into an
    /// owned buffer instead, since a compressed file cannot be mapped
    /// usefully.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Io`] if the file is missing or unreadable,
    /// [`GeoError::Mmap`] if mapping fails, and [`GeoError::Format`] if the
    /// content does not validate. Load failure is always a recoverable
    /// error for the caller to handle, never process-fatal.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| GeoError::Io(format!("failed to open {}: {}", path.display(), e)))?;

        let is_gzip = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        if is_gzip {
            let mut bytes = Vec::new();
            GzDecoder::new(file).read_to_end(&mut bytes).map_err(|e| {
                GeoError::Io(format!("failed to decompress {}: {}", path.display(), e))
            })?;
            return Self::from_storage(Storage::Owned(bytes));
        }

        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| GeoError::Mmap(format!("failed to mmap {}: {}", path.display(), e)))?;

        Self::from_storage(Storage::Mmap(mmap))
    }

    /// Create a database from raw bytes (tests, or callers that already
    /// hold the blob)
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_storage(Storage::Owned(data))
    }

    /// Internal: parse and validate, then take ownership of the storage
    fn from_storage(storage: Storage) -> Result<Self> {
        let data = storage.as_slice();
        let tables = format::parse(data)?;
        let record_count = tables.ranges.len();

        let mut endpoints = Vec::with_capacity(record_count);
        let mut spans = Vec::with_capacity(record_count);
        for (i, entry) in tables.ranges.iter().enumerate() {
            let start = entry.text_offset();
            let end = start + entry.text_len();
            let text = data.get(start..end).ok_or_else(|| {
                GeoError::Format(format!(
                    "record {} text span {}..{} exceeds file size {}",
                    i,
                    start,
                    end,
                    data.len()
                ))
            })?;
            std::str::from_utf8(text)
                .map_err(|_| GeoError::Format(format!("record {} text is not valid UTF-8", i)))?;
            endpoints.push(entry.end_ip.get());
            spans.push(TextSpan {
                start: start as u32,
                len: entry.text_len() as u8,
            });
        }

        let mut prefix = Vec::with_capacity(PREFIX_COUNT);
        for (octet, entry) in tables.prefix.iter().enumerate() {
            let window = Window {
                first: entry.first.get(),
                last: entry.last.get(),
            };
            // Windows are meaningless in an empty database; otherwise they
            // must stay inside the range table.
            if record_count > 0
                && (window.first > window.last || window.last as usize >= record_count)
            {
                return Err(GeoError::Format(format!(
                    "prefix window {}..={} for octet {} out of range (record count {})",
                    window.first, window.last, octet, record_count
                )));
            }
            prefix.push(window);
        }

        Ok(Self {
            data: storage,
            prefix: prefix.into_boxed_slice(),
            endpoints,
            spans,
        })
    }

    /// Look up a dotted-quad IPv4 address
    ///
    /// Returns the pipe-delimited location record, or `None` if the input
    /// is not a valid IPv4 address or no range covers it. Malformed input
    /// is a miss, not an error: callers treat "no geo data" and "bad
    /// address" the same way.
    pub fn lookup(&self, ip: &str) -> Option<&str> {
        let addr = ip.parse::<Ipv4Addr>().ok()?;
        self.lookup_addr(addr)
    }

    /// Look up an already-parsed IPv4 address
    pub fn lookup_addr(&self, addr: Ipv4Addr) -> Option<&str> {
        let window = *self.prefix.get(addr.octets()[0] as usize)?;
        // Big-endian packing: o0<<24 | o1<<16 | o2<<8 | o3.
        let target = u32::from(addr);

        let idx = if window.first == window.last {
            window.first
        } else {
            self.leftmost_at_or_above(window.first, window.last, target)?
        } as usize;

        // The candidate's endpoint must actually be at or above the target;
        // otherwise every range in the window ends below the address and
        // there is no match. This also covers the single-entry shortcut.
        if *self.endpoints.get(idx)? < target {
            return None;
        }
        self.record_text(idx)
    }

    /// Area/country code for an address, e.g. `"CN"`
    ///
    /// Splits the matched record on `|` and returns field index 8 when at
    /// least 9 fields are present. In every other case - malformed address,
    /// no matching range, short record - returns [`DEFAULT_AREA`]. Never
    /// fails the caller.
    pub fn area(&self, ip: &str) -> &str {
        match self.lookup(ip) {
            Some(record) => record.split('|').nth(8).unwrap_or(DEFAULT_AREA),
            None => DEFAULT_AREA,
        }
    }

    /// Number of IP ranges in the database
    pub fn record_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the database contains no ranges
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// The range-table index window for one first-octet value
    pub fn prefix_window(&self, octet: u8) -> (u32, u32) {
        let window = self.prefix[octet as usize];
        (window.first, window.last)
    }

    /// Leftmost index in `[low, high]` whose endpoint is `>= target`
    ///
    /// Tie-break follows the format's search contract: a qualifying mid is
    /// recorded and the search continues in the lower half; a qualifying
    /// mid of 0 terminates immediately (no unsigned underflow on `mid - 1`).
    fn leftmost_at_or_above(&self, mut low: u32, mut high: u32, target: u32) -> Option<u32> {
        let mut found = None;
        while low <= high {
            let mid = low + (high - low) / 2;
            let end_ip = *self.endpoints.get(mid as usize)?;
            if end_ip >= target {
                found = Some(mid);
                if mid == 0 {
                    break;
                }
                high = mid - 1;
            } else {
                low = mid + 1;
            }
        }
        found
    }

    /// Resolve a record's text span against the storage buffer
    ///
    /// Spans were bounds- and UTF-8-checked at load; the checks here keep
    /// the path panic-free regardless.
    fn record_text(&self, idx: usize) -> Option<&str> {
        let span = self.spans.get(idx)?;
        let start = span.start as usize;
        let bytes = self.data.as_slice().get(start..start + span.len as usize)?;
        std::str::from_utf8(bytes).ok()
    }
}
