//! Shared-accessor lifecycle: default before load, then exactly-once
//! concurrent initialization.
//!
//! The shared cell is process-global, so the whole lifecycle lives in a
//! single test; this file is its own test binary.

mod common;

use common::{DatBuilder, CN_RECORD};
use geodat::{shared, DEFAULT_AREA};
use std::io::Write;
use std::thread;

#[test]
fn test_shared_lifecycle_exactly_once() {
    // Before any init: no instance, and the area contract degrades to the
    // fixed default instead of failing.
    assert!(shared::get().is_none());
    assert_eq!(shared::area("1.0.0.5"), DEFAULT_AREA);
    assert_eq!(shared::area("not.an.ip"), DEFAULT_AREA);

    let bytes = DatBuilder::new().range("1.0.0.255", CN_RECORD).build();
    let mut file = tempfile::NamedTempFile::with_suffix(".dat").unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();
    let path = file.path().to_path_buf();

    // N concurrent first callers: every thread blocks on the same one-time
    // load and observes the identical instance with a fully loaded state.
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let path = path.clone();
            thread::spawn(move || {
                let db = shared::init(&path).expect("load should succeed");
                (
                    db as *const _ as usize,
                    db.lookup("1.0.0.5").map(str::to_owned),
                    db.record_count(),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first_ptr = results[0].0;
    for (ptr, record, count) in &results {
        assert_eq!(*ptr, first_ptr, "all callers share one instance");
        assert_eq!(record.as_deref(), Some(CN_RECORD));
        assert_eq!(*count, 1);
    }

    // The outcome is sticky: a later init with a different path is ignored.
    let again = shared::init("/nonexistent/other.dat").unwrap();
    assert_eq!(again as *const _ as usize, first_ptr);

    assert_eq!(shared::area("1.0.0.5"), "CN");
    assert_eq!(shared::area("1.0.1.0"), DEFAULT_AREA);
}
