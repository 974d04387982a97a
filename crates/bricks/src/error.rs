use thiserror::Error;

/// Why a [`CachedBuffer`](crate::CachedBuffer) could not hand bytes to its
/// sink.
///
/// None of these are fatal. The cache is always left in a consistent state
/// and the caller decides whether to retry, flush later, or give up.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SinkError {
    /// The sink accepted none of the cached bytes. Nothing changed.
    #[error("sink stalled with {pending} bytes cached")]
    Stalled {
        /// Bytes still waiting in the cache.
        pending: usize,
    },
    /// A forced drain made progress, but what is left in the cache does not
    /// leave room for the incoming data. The caller's data was not stored.
    #[error("sink drained {drained} bytes but {pending} remain cached")]
    Backlog {
        /// Bytes the sink accepted during this call.
        drained: usize,
        /// Bytes still waiting in the cache, compacted to the front.
        pending: usize,
    },
    /// The sink took only part of a write that bypassed the cache.
    #[error("sink accepted {written} of {expected} pass-through bytes")]
    ShortWrite {
        /// Leading bytes of the caller's data the sink already took.
        written: usize,
        /// Length of the caller's data.
        expected: usize,
    },
}

/// Failure to schedule a deferred state transition.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The deferred transition queue already holds `capacity` requests; the
    /// new one was dropped.
    #[error("deferred transition queue is full ({capacity} pending)")]
    QueueFull {
        /// Fixed size of the deferred queue.
        capacity: usize,
    },
}

/// A version field does not fit its bit width.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum VersionError {
    /// Major versions occupy 6 bits.
    #[error("major version {0} exceeds {max}", max = crate::version::MAJOR_MAX)]
    MajorOutOfRange(u8),
    /// Minor versions occupy 10 bits.
    #[error("minor version {0} exceeds {max}", max = crate::version::MINOR_MAX)]
    MinorOutOfRange(u16),
}
