//! Process-wide service tests
//!
//! Runs in its own test binary so the global backend cell starts empty.

#![cfg(feature = "desktop-shims")]

use core_runtime::config::ENV_LIBRARY_DIR;
use core_service::{CodecService, InvocationOutcome};

#[test]
fn test_global_failure_is_cached() {
    std::env::set_var(ENV_LIBRARY_DIR, "/nonexistent/lagrange-codec/lib");

    let first = CodecService::global().unwrap_err();
    let codec = first.as_codec().expect("codec error").clone();
    assert!(codec.is_fatal());
    assert_eq!(first.outcome(), Some(InvocationOutcome::UnsupportedPlatform));

    // Pointing at a different directory afterwards changes nothing.
    std::env::set_var(ENV_LIBRARY_DIR, "/another/dir");
    let second = CodecService::global().unwrap_err();
    assert_eq!(second.as_codec(), Some(&codec));
}
