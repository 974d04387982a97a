/// Configuration options for [`DynamicStateMachine`](crate::DynamicStateMachine).
///
/// # Examples
///
/// ```rust
/// use bricks::{MachineOptions, OwningStateMachine};
///
/// let options = MachineOptions {
///     drain_deferred: true,
///     ..Default::default()
/// };
/// let machine = OwningStateMachine::<u8, u8>::with_options(options);
/// assert!(machine.options().drain_deferred);
/// ```
///
/// # Default
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MachineOptions {
    /// Whether one `run` cycle applies every pending deferred transition.
    ///
    /// By default a cycle applies at most one deferred transition, so a
    /// transition requested from `on_enter` takes effect on the next cycle.
    /// When `true`, the cycle keeps applying pending transitions until the
    /// queue is empty or `DEFERRED_CAPACITY` of them have been applied,
    /// whichever comes first. The cap keeps a pair of states that keep
    /// re-requesting each other from looping forever.
    ///
    /// # Default
    ///
    /// `false`
    pub drain_deferred: bool,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic when the deferred transition queue overflows instead of
    /// returning an error to the requesting callback.
    ///
    /// Enabled only in test and fuzzing builds to get a backtrace at the
    /// point of overflow.
    pub panic_on_overflow: bool,
}
