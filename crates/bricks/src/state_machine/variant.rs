//! Closed-world state machine over a single state enum.

use core::{fmt, marker::PhantomData};

/// Lifecycle hooks of a state in a closed set.
///
/// Both hooks default to doing nothing. The enum produced by
/// [`variant_states!`](crate::variant_states) forwards them to the active
/// alternative.
pub trait VariantState {
    /// Called after the state is switched in.
    fn on_enter(&mut self) {}
    /// Called before the state is switched out.
    fn on_exit(&mut self) {}
}

/// A closed set of states driven by a [`VariantStateMachine`].
///
/// Implemented on the enum holding the alternatives. `update` matches on the
/// active alternative and may replace it with [`StateStorage::switch`].
pub trait StateSet<I, R>: VariantState + Sized {
    /// Consumes one input.
    fn update(storage: &mut StateStorage<Self>, input: I) -> R;
}

/// The slot holding the active state of a [`VariantStateMachine`].
#[derive(Debug)]
pub struct StateStorage<S> {
    state: S,
}

impl<S: VariantState> StateStorage<S> {
    /// The active state.
    pub fn get(&self) -> &S {
        &self.state
    }

    /// The active state, mutably. Replacing it through this reference skips
    /// the lifecycle hooks; use [`switch`](Self::switch) for transitions.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// Exits the active state, replaces it with `next` and enters it.
    ///
    /// The previous state is dropped between its `on_exit` and the new
    /// state's `on_enter`. Only alternatives of `S` are accepted, so
    /// switching to a foreign state type does not compile.
    pub fn switch<N: Into<S>>(&mut self, next: N) -> &mut S {
        self.state.on_exit();
        self.state = next.into();
        tracing::trace!("variant state switched");
        self.state.on_enter();
        &mut self.state
    }
}

/// Drives a closed set of states `S` with inputs `I`, producing `R`.
///
/// ```rust
/// use bricks::{StateSet, StateStorage, VariantState, VariantStateMachine, variant_states};
///
/// struct Locked;
/// struct Unlocked { passes: u32 }
///
/// impl VariantState for Locked {}
/// impl VariantState for Unlocked {}
///
/// variant_states! {
///     /// A coin-operated turnstile.
///     enum Turnstile {
///         Locked(Locked),
///         Unlocked(Unlocked),
///     }
/// }
///
/// enum Event { Coin, Push }
///
/// impl StateSet<Event, bool> for Turnstile {
///     fn update(storage: &mut StateStorage<Self>, event: Event) -> bool {
///         match (storage.get_mut(), event) {
///             (Turnstile::Locked(_), Event::Coin) => {
///                 storage.switch(Unlocked { passes: 0 });
///                 true
///             }
///             (Turnstile::Unlocked(unlocked), Event::Push) => {
///                 unlocked.passes += 1;
///                 storage.switch(Locked);
///                 true
///             }
///             _ => false,
///         }
///     }
/// }
///
/// let mut turnstile = VariantStateMachine::<Event, bool, Turnstile>::create(Locked);
/// assert!(!turnstile.run(Event::Push));
/// assert!(turnstile.run(Event::Coin));
/// assert!(matches!(turnstile.state(), Turnstile::Unlocked(_)));
/// assert!(turnstile.run(Event::Push));
/// assert!(matches!(turnstile.into_state(), Turnstile::Locked(_)));
/// ```
pub struct VariantStateMachine<I, R, S> {
    storage: StateStorage<S>,
    _io: PhantomData<fn(I) -> R>,
}

impl<I, R, S: StateSet<I, R>> VariantStateMachine<I, R, S> {
    /// A machine whose active state is `initial`.
    ///
    /// No transition takes place, so `initial` does not see `on_enter`.
    pub fn create(initial: impl Into<S>) -> Self {
        Self {
            storage: StateStorage {
                state: initial.into(),
            },
            _io: PhantomData,
        }
    }

    /// Feeds `input` to the active state.
    pub fn run(&mut self, input: I) -> R {
        S::update(&mut self.storage, input)
    }

    /// The active state.
    pub fn state(&self) -> &S {
        self.storage.get()
    }

    /// Consumes the machine, returning the active state.
    pub fn into_state(self) -> S {
        self.storage.state
    }
}

impl<I, R, S: fmt::Debug> fmt::Debug for VariantStateMachine<I, R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantStateMachine")
            .field("state", &self.storage.state)
            .finish()
    }
}

/// Declares the enum of a closed state set.
///
/// Every alternative wraps a distinct type implementing
/// [`VariantState`](crate::VariantState). The macro emits the enum, a
/// `VariantState` impl forwarding the hooks to the active alternative and a
/// `From` impl per alternative, which is what
/// [`StateStorage::switch`](crate::StateStorage::switch) accepts.
///
/// ```rust
/// use bricks::{VariantState, variant_states};
///
/// #[derive(Debug, PartialEq)]
/// struct Idle;
/// #[derive(Debug, PartialEq)]
/// struct Busy(u8);
///
/// impl VariantState for Idle {}
/// impl VariantState for Busy {}
///
/// variant_states! {
///     #[derive(Debug, PartialEq)]
///     pub enum Worker {
///         Idle(Idle),
///         Busy(Busy),
///     }
/// }
///
/// assert_eq!(Worker::from(Busy(3)), Worker::Busy(Busy(3)));
/// ```
#[macro_export]
macro_rules! variant_states {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident($state:ty)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant($state),
            )+
        }

        impl $crate::VariantState for $name {
            fn on_enter(&mut self) {
                match self {
                    $( Self::$variant(state) => $crate::VariantState::on_enter(state), )+
                }
            }

            fn on_exit(&mut self) {
                match self {
                    $( Self::$variant(state) => $crate::VariantState::on_exit(state), )+
                }
            }
        }

        $(
            impl ::core::convert::From<$state> for $name {
                fn from(state: $state) -> Self {
                    Self::$variant(state)
                }
            }
        )+
    };
}
