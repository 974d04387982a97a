//! Fixed-capacity building blocks for embedded-style data-plane code.
//!
//! - [`CachedBuffer`]: a write-through byte cache that coalesces small writes
//!   into fewer, larger calls to a [`Sink`] and never loses bytes on partial
//!   sink writes.
//! - [`CircularBuffer`]: a bounded FIFO queue that hands items back instead
//!   of overwriting when full.
//! - [`VariantStateMachine`] and [`DynamicStateMachine`]: state machine
//!   harnesses for closed and open sets of states, the latter with a deferred
//!   transition queue that keeps state callbacks from nesting.
//! - [`Version`]: a `major.minor.patch` triple packed into a `u32`.
//!
//! The crate is `no_std`. Only the owning state policy needs an allocator;
//! it sits behind the default `alloc` feature. Diagnostics are emitted with
//! [`tracing`](https://docs.rs/tracing) and no subscriber is installed.
//!
//! Everything is single-threaded: share across threads only behind your own
//! synchronization.

#![no_std]

#[cfg(any(feature = "alloc", test))]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod cached_buffer;
mod circular_buffer;
mod error;
mod options;
mod state_machine;
mod version;

#[cfg(test)]
mod tests;

pub use cached_buffer::{CachedBuffer, DEFAULT_CAPACITY, Sink};
pub use circular_buffer::{CircularBuffer, DEFAULT_RING_CAPACITY};
pub use error::{SinkError, TransitionError, VersionError};
pub use options::MachineOptions;
#[cfg(feature = "alloc")]
pub use state_machine::{Owned, OwningPolicy, OwningStateMachine};
pub use state_machine::{
    Borrowed, BorrowingStateMachine, DEFERRED_CAPACITY, DynamicState, DynamicStateMachine, Next,
    NonOwningPolicy, StatePolicy, StateSet, StateStorage, Status, Transitions, VariantState,
    VariantStateMachine,
};
pub use version::{MAJOR_MAX, MINOR_MAX, Version};
