//! Ownership policies for [`DynamicStateMachine`](super::DynamicStateMachine).
//!
//! A policy stores the current state and decides what replacing it means:
//! [`OwningPolicy`] drops the previous state, [`NonOwningPolicy`] merely
//! forgets a borrowed one. There is no shared policy; a state
//! that must be shared can hold the shared part internally and be owned.

#[cfg(feature = "alloc")]
use alloc::boxed::Box;
use core::{cell::RefCell, fmt};

use super::{DynamicState, Status};

/// Storage discipline for the current state of a
/// [`DynamicStateMachine`](super::DynamicStateMachine).
pub trait StatePolicy<I, R>: Default {
    /// How a state is referred to: what `update` returns to request a
    /// transition and what `enter_state` accepts.
    type Handle;

    /// Replaces the current state with `next` (or with nothing) and reports
    /// the resulting status. The previous state is released according to the
    /// policy.
    fn set_state(&mut self, next: Option<Self::Handle>) -> Status;

    /// Runs `f` on the current state, if there is one.
    fn with_state<T>(
        &mut self,
        f: impl FnOnce(&mut dyn DynamicState<I, R, Self::Handle>) -> T,
    ) -> Option<T>;

    /// `true` if `handle` refers to the current state itself.
    fn holds(&self, handle: &Self::Handle) -> bool;

    /// [`Status::Running`] while a state is stored.
    fn status(&self) -> Status;

    /// Releases the current state.
    fn clear(&mut self) {
        self.set_state(None);
    }
}

/// A state exclusively owned by the machine.
#[cfg(feature = "alloc")]
pub struct Owned<I, R>(Box<dyn DynamicState<I, R, Owned<I, R>>>);

#[cfg(feature = "alloc")]
impl<I, R> Owned<I, R> {
    /// Boxes `state`.
    pub fn new<S>(state: S) -> Self
    where
        S: DynamicState<I, R, Self> + 'static,
    {
        Self(Box::new(state))
    }

    /// Wraps an already boxed state.
    #[must_use]
    pub fn from_box(state: Box<dyn DynamicState<I, R, Self>>) -> Self {
        Self(state)
    }
}

#[cfg(feature = "alloc")]
impl<I, R> fmt::Debug for Owned<I, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owned").finish_non_exhaustive()
    }
}

/// Owns the current state and drops it when it is replaced or cleared.
#[cfg(feature = "alloc")]
pub struct OwningPolicy<I, R> {
    current: Option<Owned<I, R>>,
}

#[cfg(feature = "alloc")]
impl<I, R> Default for OwningPolicy<I, R> {
    fn default() -> Self {
        Self { current: None }
    }
}

#[cfg(feature = "alloc")]
impl<I, R> StatePolicy<I, R> for OwningPolicy<I, R> {
    type Handle = Owned<I, R>;

    fn set_state(&mut self, next: Option<Owned<I, R>>) -> Status {
        // The previous box is dropped by the assignment.
        self.current = next;
        self.status()
    }

    fn with_state<T>(
        &mut self,
        f: impl FnOnce(&mut dyn DynamicState<I, R, Owned<I, R>>) -> T,
    ) -> Option<T> {
        self.current.as_mut().map(|owned| f(owned.0.as_mut()))
    }

    /// An owned handle can never alias the state already owned.
    fn holds(&self, _handle: &Owned<I, R>) -> bool {
        false
    }

    fn status(&self) -> Status {
        if self.current.is_some() {
            Status::Running
        } else {
            Status::Halt
        }
    }
}

/// A state borrowed from the caller, who keeps it alive for `'a`.
///
/// The `RefCell` lets several states name each other (including
/// themselves) while the machine mutates whichever one is current.
pub struct Borrowed<'a, I, R>(&'a RefCell<dyn DynamicState<I, R, Borrowed<'a, I, R>> + 'a>);

impl<'a, I, R> Borrowed<'a, I, R> {
    /// Borrows the state inside `cell`.
    pub fn new<S>(cell: &'a RefCell<S>) -> Self
    where
        S: DynamicState<I, R, Self> + 'a,
    {
        Self(cell)
    }

    /// `true` if both handles borrow the same cell.
    #[must_use]
    pub fn ptr_eq(self, other: Self) -> bool {
        core::ptr::addr_eq(self.0, other.0)
    }
}

impl<I, R> Clone for Borrowed<'_, I, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, R> Copy for Borrowed<'_, I, R> {}

impl<I, R> fmt::Debug for Borrowed<'_, I, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Borrowed")
            .field(&core::ptr::from_ref(self.0).cast::<()>())
            .finish()
    }
}

/// Refers to the current state without owning it. Replacing or clearing the
/// state never drops it.
pub struct NonOwningPolicy<'a, I, R> {
    current: Option<Borrowed<'a, I, R>>,
}

impl<I, R> Default for NonOwningPolicy<'_, I, R> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<'a, I, R> StatePolicy<I, R> for NonOwningPolicy<'a, I, R> {
    type Handle = Borrowed<'a, I, R>;

    fn set_state(&mut self, next: Option<Borrowed<'a, I, R>>) -> Status {
        self.current = next;
        self.status()
    }

    /// # Panics
    ///
    /// If the current state's cell is already borrowed elsewhere.
    fn with_state<T>(
        &mut self,
        f: impl FnOnce(&mut dyn DynamicState<I, R, Borrowed<'a, I, R>>) -> T,
    ) -> Option<T> {
        let handle = self.current?;
        let mut state = handle.0.borrow_mut();
        Some(f(&mut *state))
    }

    fn holds(&self, handle: &Borrowed<'a, I, R>) -> bool {
        self.current.is_some_and(|current| current.ptr_eq(*handle))
    }

    fn status(&self) -> Status {
        if self.current.is_some() {
            Status::Running
        } else {
            Status::Halt
        }
    }
}
