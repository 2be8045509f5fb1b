//! Shared tables for stateful lock tests.

use davlock_types::LockDuration;

/// Canonical lock names exercising nested, sibling, and overlapping paths.
///
/// The last byte encodes the depth of the lock taken at the name:
/// `z` for zero-depth, `i` for infinite depth.
pub const LOCK_TEST_NAMES: [&str; 11] = [
    "/_/_/_/_/z",
    "/_/_/i",
    "/_/z",
    "/_/z/i",
    "/_/z/z",
    "/_/z/_/i",
    "/_/z/_/z",
    "/i",
    "/z",
    "/z/_/i",
    "/z/_/z",
];

/// Durations covering the interesting lifetimes: never expires, expires at
/// the very same instant, and far in the future (100 hours).
pub const LOCK_TEST_DURATIONS: [LockDuration; 3] = [
    LockDuration::Infinite,
    LockDuration::Seconds(0),
    LockDuration::Seconds(100 * 3600),
];

/// The depth flag encoded in a test name's last byte.
pub fn zero_depth_for(name: &str) -> bool {
    match name.as_bytes().last() {
        Some(b'z') => true,
        Some(b'i') => false,
        _ => panic!("lock test name {name:?} does not end with 'i' or 'z'"),
    }
}
