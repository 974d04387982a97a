
#[cfg(feature = "alloc")]
mod property_state_machine;

/// Number of quickcheck cases, larger on CI and tiny under Miri.
pub(crate) fn test_count() -> u64 {
    if cfg!(any(miri, feature = "test-fast")) {
        10
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}
