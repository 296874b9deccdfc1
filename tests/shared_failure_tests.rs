//! Shared-accessor behavior when the one-time load fails.
//!
//! Runs as its own test binary so the process-global cell starts cold and
//! can be poisoned with a failing path.

use geodat::{shared, GeoError, DEFAULT_AREA};

#[test]
fn test_failed_load_is_sticky_and_degrades() {
    let err = shared::init("/nonexistent/geodat/ip.dat").unwrap_err();
    assert!(matches!(err, GeoError::Io(_)));

    // The failure is cached: no retry happens even with a different path,
    // and every caller sees the same error.
    let err_again = shared::init("/another/missing/ip.dat").unwrap_err();
    assert_eq!(err, err_again);

    // The lookup feature is unavailable, but area callers never fail.
    assert!(shared::get().is_none());
    assert_eq!(shared::area("1.0.0.5"), DEFAULT_AREA);
}
