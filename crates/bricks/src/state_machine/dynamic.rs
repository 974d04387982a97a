//! Open-world state machine over trait-object states.
//!
//! States implement [`DynamicState`]. Only one state callback runs at a
//! time: a callback cannot reach the machine, it can only ask for a
//! transition, either by returning [`Next`] from `update` or through the
//! [`Transitions`] handle passed to `on_enter` and `on_exit`. Requests are
//! parked in a queue of [`DEFERRED_CAPACITY`] slots and applied by the
//! machine once the callback has returned.

use core::{fmt, marker::PhantomData};

#[cfg(feature = "alloc")]
use super::policy::OwningPolicy;
use super::{
    Status,
    policy::{NonOwningPolicy, StatePolicy},
};
use crate::{circular_buffer::CircularBuffer, error::TransitionError, options::MachineOptions};

/// Number of transitions that can wait in the deferred queue.
pub const DEFERRED_CAPACITY: usize = 10;

type DeferredQueue<H> = CircularBuffer<Option<H>, DEFERRED_CAPACITY>;

/// What a state asks for after `update`.
#[derive(Debug)]
pub enum Next<H> {
    /// Keep the current state. No callbacks run.
    Stay,
    /// Exit the current state and enter the given one.
    ///
    /// A handle that refers to the current state itself (possible with the
    /// non-owning policy) is treated as [`Next::Stay`].
    Enter(H),
    /// Exit the current state and leave the machine without one.
    Halt,
}

/// A state of a [`DynamicStateMachine`].
///
/// `H` is the policy's handle type: [`Owned`](super::Owned) or
/// [`Borrowed`](super::Borrowed).
pub trait DynamicState<I, R, H> {
    /// Called once when the state becomes current, before its first
    /// `update`.
    fn on_enter(&mut self, _transitions: &mut Transitions<'_, H>) {}

    /// Called once when the state stops being current, before it is
    /// replaced or released.
    fn on_exit(&mut self, _transitions: &mut Transitions<'_, H>) {}

    /// Consumes one input, producing a result and the requested next state.
    fn update(&mut self, input: I) -> (R, Next<H>);
}

/// Lets `on_enter` and `on_exit` request transitions.
///
/// Requests are applied in FIFO order after the callback returns: at most one
/// per [`run`](DynamicStateMachine::run) cycle unless
/// [`MachineOptions::drain_deferred`] is set.
pub struct Transitions<'q, H> {
    queue: &'q mut DeferredQueue<H>,
    #[cfg_attr(not(any(test, feature = "fuzzing")), allow(dead_code))]
    options: MachineOptions,
}

impl<'q, H> Transitions<'q, H> {
    fn new(queue: &'q mut DeferredQueue<H>, options: MachineOptions) -> Self {
        Self { queue, options }
    }

    /// Asks the machine to enter `target`.
    ///
    /// # Errors
    ///
    /// [`TransitionError::QueueFull`] if [`DEFERRED_CAPACITY`] requests are
    /// already waiting. `target` is dropped.
    pub fn enter(&mut self, target: H) -> Result<(), TransitionError> {
        self.request(Some(target))
    }

    /// Asks the machine to halt.
    ///
    /// # Errors
    ///
    /// [`TransitionError::QueueFull`] if [`DEFERRED_CAPACITY`] requests are
    /// already waiting.
    pub fn halt(&mut self) -> Result<(), TransitionError> {
        self.request(None)
    }

    /// Requests waiting to be applied, including ones made before this
    /// callback started.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn request(&mut self, target: Option<H>) -> Result<(), TransitionError> {
        if self.queue.queue(target).is_ok() {
            return Ok(());
        }

        tracing::warn!(
            capacity = DEFERRED_CAPACITY,
            "deferred transition queue full, dropping request"
        );
        #[cfg(any(test, feature = "fuzzing"))]
        assert!(
            !self.options.panic_on_overflow,
            "deferred transition queue overflow ({DEFERRED_CAPACITY} pending)"
        );
        Err(TransitionError::QueueFull {
            capacity: DEFERRED_CAPACITY,
        })
    }
}

impl<H> fmt::Debug for Transitions<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transitions")
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}

/// Drives one current state chosen from an open set.
///
/// The machine starts halted. [`enter_state`](Self::enter_state) installs a
/// state; [`run`](Self::run) feeds it input. Each state sees `on_enter`
/// exactly once before its first `update` and `on_exit` exactly once before
/// it is replaced or cleared. With [`OwningPolicy`] the state is then
/// dropped. A state still current when the machine itself is dropped is
/// released without `on_exit`.
///
/// ```rust
/// use bricks::{DynamicState, Next, Owned, OwningStateMachine, Status};
///
/// struct Countdown(u32);
///
/// impl DynamicState<(), u32, Owned<(), u32>> for Countdown {
///     fn update(&mut self, (): ()) -> (u32, Next<Owned<(), u32>>) {
///         self.0 -= 1;
///         let next = if self.0 == 0 { Next::Halt } else { Next::Stay };
///         (self.0, next)
///     }
/// }
///
/// let mut machine = OwningStateMachine::<(), u32>::new();
/// machine.enter_state(Owned::new(Countdown(2)));
/// assert_eq!(machine.run(()), Some(1));
/// assert_eq!(machine.run(()), Some(0));
/// assert_eq!(machine.status(), Status::Halt);
/// assert_eq!(machine.run(()), None);
/// ```
pub struct DynamicStateMachine<I, R, P>
where
    P: StatePolicy<I, R>,
{
    policy: P,
    deferred: DeferredQueue<P::Handle>,
    /// `run` already called `on_exit` on the current state.
    exited: bool,
    options: MachineOptions,
    _io: PhantomData<fn(I) -> R>,
}

/// A machine that owns its states and drops them on replacement.
#[cfg(feature = "alloc")]
pub type OwningStateMachine<I, R> = DynamicStateMachine<I, R, OwningPolicy<I, R>>;

/// A machine over states borrowed for `'a`. States are never dropped by it.
pub type BorrowingStateMachine<'a, I, R> = DynamicStateMachine<I, R, NonOwningPolicy<'a, I, R>>;

impl<I, R, P> DynamicStateMachine<I, R, P>
where
    P: StatePolicy<I, R>,
{
    /// A halted machine with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(MachineOptions::default())
    }

    /// A halted machine.
    #[must_use]
    pub fn with_options(options: MachineOptions) -> Self {
        Self {
            policy: P::default(),
            deferred: CircularBuffer::new(),
            exited: false,
            options,
            _io: PhantomData,
        }
    }

    /// Options the machine was built with.
    #[must_use]
    pub fn options(&self) -> &MachineOptions {
        &self.options
    }

    /// [`Status::Running`] while a state is current.
    #[must_use]
    pub fn status(&self) -> Status {
        self.policy.status()
    }

    /// Transitions requested by callbacks and not applied yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.deferred.len()
    }

    /// Exits the current state, if any, and enters `target`.
    ///
    /// Transitions the new state requests from `on_enter` wait for the next
    /// `run`, or are applied right away when
    /// [`MachineOptions::drain_deferred`] is set. Requests still pending from
    /// earlier states are discarded first. Entering the state that is
    /// already current restarts it.
    pub fn enter_state(&mut self, target: P::Handle) -> Status {
        self.deferred.clear();
        self.transition(Some(target));
        if self.options.drain_deferred {
            self.apply_deferred(None, DEFERRED_CAPACITY);
        }
        self.status()
    }

    /// Same as [`enter_state`](Self::enter_state).
    ///
    /// Callbacks never hold the machine, so a transition made through it is
    /// always synchronous; the deferred path is [`Transitions::enter`].
    pub fn enter_state_immediate(&mut self, target: P::Handle) -> Status {
        self.enter_state(target)
    }

    /// Exits and releases the current state, discarding pending requests.
    pub fn halt(&mut self) -> Status {
        self.deferred.clear();
        self.transition(None);
        self.status()
    }

    /// Runs `f` on the current state without going through `update`.
    pub fn with_current<T>(
        &mut self,
        f: impl FnOnce(&mut dyn DynamicState<I, R, P::Handle>) -> T,
    ) -> Option<T> {
        self.policy.with_state(f)
    }

    /// Runs one cycle: updates the current state with `input`, then applies
    /// at most one deferred transition (or up to [`DEFERRED_CAPACITY`] with
    /// [`MachineOptions::drain_deferred`]).
    ///
    /// A transition returned from `update` exits the current state at once
    /// and is queued behind any earlier requests. When the queue is full the
    /// oldest request is applied first to make room.
    ///
    /// Returns `None` without doing anything when the machine is halted.
    pub fn run(&mut self, input: I) -> Option<R> {
        let (result, next) = self.policy.with_state(|state| state.update(input))?;

        let target = match next {
            Next::Stay => None,
            Next::Enter(handle) if self.policy.holds(&handle) => None,
            Next::Enter(handle) => Some(Some(handle)),
            Next::Halt => Some(None),
        };

        let mut carried = None;
        if let Some(target) = target {
            let mut transitions = Transitions::new(&mut self.deferred, self.options);
            self.policy
                .with_state(|state| state.on_exit(&mut transitions));
            self.exited = true;

            if let Err(target) = self.deferred.queue(target) {
                carried = self.deferred.dequeue();
                let queued = self.deferred.queue(target);
                debug_assert!(queued.is_ok(), "a slot was just freed");
            }
        }

        let budget = if self.options.drain_deferred {
            DEFERRED_CAPACITY
        } else {
            1
        };
        self.apply_deferred(carried, budget);
        Some(result)
    }

    /// Applies `first` (if any) and then queued requests, `budget` in total.
    fn apply_deferred(&mut self, first: Option<Option<P::Handle>>, budget: usize) {
        let mut first = first;
        for _ in 0..budget {
            let Some(target) = first.take().or_else(|| self.deferred.dequeue()) else {
                break;
            };
            self.transition(target);
        }
    }

    /// Exits the current state unless `run` already did, swaps in `target`
    /// and enters it.
    fn transition(&mut self, target: Option<P::Handle>) {
        if !self.exited {
            let mut transitions = Transitions::new(&mut self.deferred, self.options);
            self.policy
                .with_state(|state| state.on_exit(&mut transitions));
        }

        // The policy releases the previous state here.
        let status = self.policy.set_state(target);
        self.exited = false;
        tracing::trace!(?status, pending = self.deferred.len(), "state transition");

        let mut transitions = Transitions::new(&mut self.deferred, self.options);
        self.policy
            .with_state(|state| state.on_enter(&mut transitions));
    }
}

impl<I, R, P> Default for DynamicStateMachine<I, R, P>
where
    P: StatePolicy<I, R>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<I, R, P> fmt::Debug for DynamicStateMachine<I, R, P>
where
    P: StatePolicy<I, R>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicStateMachine")
            .field("status", &self.status())
            .field("pending", &self.pending())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
