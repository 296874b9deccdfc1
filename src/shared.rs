//! Process-wide shared database accessor
//!
//! The primary API of this crate is the caller-owned [`GeoDatabase`]: build
//! one at startup, hand references to whatever needs it, and decide locally
//! what a load failure means. This module is the thin opt-in layer for
//! callers that want the classic process-wide semantics instead: one lazy,
//! exactly-once load shared by every thread for the process lifetime.
//!
//! The first caller of [`init`] performs the file I/O; all concurrent
//! callers block until it completes and then observe the identical outcome.
//! That outcome is sticky - success or failure - and the path argument of
//! any later call is ignored. There is no reload: swapping the database
//! file requires a process restart.

use crate::database::{GeoDatabase, DEFAULT_AREA};
use crate::error::Result;
use once_cell::sync::OnceCell;
use std::path::Path;

static INSTANCE: OnceCell<Result<GeoDatabase>> = OnceCell::new();

/// Load the shared database, or return the already-loaded instance
///
/// Exactly-once: only the first call's path is used. A failed load is
/// cached and every caller (present and future) receives a clone of the
/// same [`crate::GeoError`]; the geo-lookup feature is then unavailable
/// for the rest of the process lifetime.
pub fn init<P: AsRef<Path>>(path: P) -> Result<&'static GeoDatabase> {
    INSTANCE
        .get_or_init(|| GeoDatabase::open(path))
        .as_ref()
        .map_err(Clone::clone)
}

/// The shared database, if a successful [`init`] has completed
pub fn get() -> Option<&'static GeoDatabase> {
    INSTANCE.get().and_then(|loaded| loaded.as_ref().ok())
}

/// Area code for an address via the shared database
///
/// Degrades to [`DEFAULT_AREA`] when the database was never initialized or
/// failed to load - callers of this function never observe a failure.
pub fn area(ip: &str) -> &'static str {
    match get() {
        Some(db) => db.area(ip),
        None => DEFAULT_AREA,
    }
}
