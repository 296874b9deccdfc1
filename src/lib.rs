//! Geodat - Fast IPv4 Geolocation Lookups
//!
//! Geodat loads a qqzeng-style binary geo-IP `.dat` database into memory
//! once and answers "which geographic/ISP record does this IPv4 address
//! belong to?" with microsecond latency. Lookups use a two-level index
//! (256-entry first-octet window table, then binary search over sorted
//! range end-points) instead of a linear scan.
//!
//! # Quick Start
//!
//! ```no_run
//! use geodat::GeoDatabase;
//!
//! let db = GeoDatabase::open("/var/lib/geodat/ip.dat")?;
//!
//! // Raw pipe-delimited record, None for a miss or malformed input
//! if let Some(record) = db.lookup("1.2.3.4") {
//!     println!("record: {}", record);
//! }
//!
//! // Coarse area/country code, "CN" whenever there is no better answer
//! println!("area: {}", db.area("1.2.3.4"));
//! # Ok::<(), geodat::GeoError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  .dat file                           │
//! ├──────────────────────────────────────┤
//! │  1. record count (u32 LE)            │
//! │  2. 256 first-octet index windows    │
//! │  3. sorted range end-points + spans  │
//! │  4. pipe-delimited record text       │
//! └──────────────────────────────────────┘
//!          ↓ mmap (or gunzip for .gz)
//! ┌──────────────────────────────────────┐
//! │  GeoDatabase (read-only after load)  │
//! │  lock-free concurrent lookups        │
//! └──────────────────────────────────────┘
//! ```
//!
//! The database is immutable after load, so any number of threads can query
//! one shared instance without locking. Build a [`GeoDatabase`] yourself
//! and inject it where it is needed, or use the [`shared`] module for the
//! classic process-wide, exactly-once lazy singleton.
//!
//! The `.dat` format is produced by an external third-party tool and read
//! here byte-for-byte as it is on disk - including its deliberate mix of
//! little-endian file integers and big-endian address packing. See the
//! [`format`] module documentation before touching any of that.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Database loading and the two-level lookup engine
pub mod database;
/// Error types for geodat operations
pub mod error;
/// On-disk binary layout of the `.dat` file
pub mod format;
/// Process-wide exactly-once shared database accessor
pub mod shared;

pub use crate::database::{GeoDatabase, DEFAULT_AREA};
pub use crate::error::{GeoError, Result};

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
