//! Fixed-capacity FIFO queue over an inline array.

use core::fmt;

/// Capacity used when none is given.
pub const DEFAULT_RING_CAPACITY: usize = 64;

/// A ring of `K` slots holding values of `T` in insertion order.
///
/// [`queue`](Self::queue) never overwrites: a full ring hands the item back.
/// [`dequeue`](Self::dequeue) moves the oldest value out. Slots that are not
/// live hold nothing, so a dequeued value is never kept alive by the ring.
///
/// `==` compares the backing slots, not the logical sequence. Two rings
/// holding the same values at different slot positions compare unequal; use
/// [`sequence_eq`](Self::sequence_eq) to compare contents in FIFO order.
///
/// ```rust
/// use bricks::CircularBuffer;
///
/// let mut ring = CircularBuffer::<u32, 2>::new();
/// assert_eq!(ring.queue(1), Ok(()));
/// assert_eq!(ring.queue(2), Ok(()));
/// assert_eq!(ring.queue(3), Err(3));
/// assert_eq!(ring.dequeue(), Some(1));
/// assert_eq!(ring.peek(), Some(&2));
/// ```
#[derive(Clone)]
pub struct CircularBuffer<T, const K: usize = DEFAULT_RING_CAPACITY> {
    slots: [Option<T>; K],
    /// Next slot to read.
    head: usize,
    /// Next slot to write.
    tail: usize,
    len: usize,
}

impl<T, const K: usize> CircularBuffer<T, K> {
    /// Number of slots.
    pub const CAPACITY: usize = K;

    /// An empty ring.
    ///
    /// A zero-slot ring is rejected at compile time.
    #[must_use]
    pub fn new() -> Self {
        const { assert!(K > 0, "a circular buffer needs at least one slot") };
        Self {
            slots: core::array::from_fn(|_| None),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Appends `item` behind the newest value.
    ///
    /// # Errors
    ///
    /// Gives `item` back when all `K` slots are taken.
    #[doc(alias = "push")]
    pub fn queue(&mut self, item: T) -> Result<(), T> {
        if self.len == K {
            return Err(item);
        }

        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % K;
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the oldest value.
    #[doc(alias = "pop")]
    pub fn dequeue(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        let item = self.slots[self.head].take();
        debug_assert!(item.is_some(), "live slot {} was empty", self.head);
        self.head = (self.head + 1) % K;
        self.len -= 1;
        item
    }

    /// The oldest value, left in place.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.head].as_ref()
    }

    /// Mutable access to the oldest value.
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.head].as_mut()
    }

    /// Number of live values.
    #[doc(alias = "size")]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// `true` when no value is queued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` when the next [`queue`](Self::queue) would be rejected.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.len == K
    }

    /// Number of slots.
    #[doc(alias = "max_capacity")]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        K
    }

    /// Live values, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.slots[(self.head + i) % K].as_ref())
    }

    /// Dequeues every value, oldest first. Values not consumed by the
    /// iterator stay queued.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        core::iter::from_fn(move || self.dequeue())
    }

    /// Drops every live value.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Compares live values in FIFO order, regardless of where they sit in
    /// the backing array or how large either ring is.
    pub fn sequence_eq<const M: usize>(&self, other: &CircularBuffer<T, M>) -> bool
    where
        T: PartialEq,
    {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T, const K: usize> Default for CircularBuffer<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq, const K: usize> PartialEq for CircularBuffer<T, K> {
    fn eq(&self, other: &Self) -> bool {
        self.slots == other.slots
    }
}

impl<T: Eq, const K: usize> Eq for CircularBuffer<T, K> {}

impl<T: fmt::Debug, const K: usize> fmt::Debug for CircularBuffer<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
