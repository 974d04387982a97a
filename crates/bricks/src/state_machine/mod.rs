//! Finite-state-machine harnesses.
//!
//! Two flavors share the same lifecycle vocabulary (`on_enter`, `on_exit`,
//! `update`):
//!
//! - [`VariantStateMachine`] drives a closed set of states known at compile
//!   time, held in a single enum. Transitions happen synchronously inside
//!   `update` through [`StateStorage::switch`].
//! - [`DynamicStateMachine`] drives an open set of states behind trait
//!   objects. Who owns those objects is up to a [`StatePolicy`]; transitions
//!   requested while a callback runs are deferred through a fixed queue so
//!   that no two state callbacks are ever on the stack at once.

mod dynamic;
mod policy;
mod variant;

pub use dynamic::{
    BorrowingStateMachine, DEFERRED_CAPACITY, DynamicState, DynamicStateMachine, Next, Transitions,
};
#[cfg(feature = "alloc")]
pub use dynamic::OwningStateMachine;
pub use policy::{Borrowed, NonOwningPolicy, StatePolicy};
#[cfg(feature = "alloc")]
pub use policy::{Owned, OwningPolicy};
pub use variant::{StateSet, StateStorage, VariantState, VariantStateMachine};

/// Whether a [`DynamicStateMachine`] has a current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A state is installed; `run` will update it.
    Running,
    /// No state is installed; `run` returns `None`.
    Halt,
}
