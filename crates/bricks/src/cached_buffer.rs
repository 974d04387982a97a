//! Write-through byte cache that coalesces small writes into larger sink
//! calls.
//!
//! A [`CachedBuffer`] stages bytes in a fixed array of `N` bytes and hands
//! them to a [`Sink`] only when it must: when incoming data no longer fits,
//! when the data could never fit, or when the caller flushes.
//!
//! Storing is all-or-nothing. Let `L` be the length of the data and `B` the
//! free space in the cache:
//!
//! - `L > N`: the data bypasses the cache. Cached bytes are drained first
//!   (any residual aborts the store), then the data goes to the sink in one
//!   call and must be accepted whole.
//! - `L <= B`: the data is appended. The sink is not called.
//! - `B < L <= N`: the cache is drained, then the data is appended if the
//!   drain made enough room.
//!
//! Partial sink writes never lose data. When the sink accepts `W` of the
//! `offset` cached bytes, the unwritten tail `[W, offset)` is moved to the
//! front of the array. `W = 0` is a stall and leaves the cache untouched;
//! `W >= offset` empties it.

use core::fmt;

use crate::error::SinkError;

/// Capacity used when none is given.
pub const DEFAULT_CAPACITY: usize = 512;

/// Destination for the bytes a [`CachedBuffer`] drains.
///
/// Any `FnMut(&[u8]) -> usize` closure is a sink, so whatever context the
/// sink needs travels in its captures.
pub trait Sink {
    /// Offers `data` to the sink and returns how many leading bytes it
    /// accepted. `0` signals failure. Values above `data.len()` are treated
    /// as `data.len()`.
    fn write(&mut self, data: &[u8]) -> usize;
}

impl<F> Sink for F
where
    F: FnMut(&[u8]) -> usize,
{
    #[inline]
    fn write(&mut self, data: &[u8]) -> usize {
        self(data)
    }
}

/// Fixed-capacity staging area in front of a [`Sink`].
///
/// A buffer built with [`CachedBuffer::new`] has no sink yet and behaves as
/// if its sink always accepted `0` bytes: stores that need a drain fail with
/// [`SinkError::Stalled`] instead of dropping data.
///
/// Cloning copies the live bytes and the sink. `core::mem::take` moves the
/// buffer out and leaves an empty, sinkless one behind. Dropping a buffer
/// discards anything that was not flushed.
///
/// ```rust
/// use bricks::CachedBuffer;
///
/// let mut out = Vec::new();
/// {
///     let mut cache = CachedBuffer::<_, 8>::with_sink(|bytes: &[u8]| {
///         out.extend_from_slice(bytes);
///         bytes.len()
///     });
///     cache.store(b"abc").unwrap();
///     cache.store(b"defgh").unwrap();
///     assert_eq!(cache.len(), 8);
///     cache.store(b"ij").unwrap(); // drains "abcdefgh" first
///     cache.flush().unwrap();
/// }
/// assert_eq!(out, b"abcdefghij");
/// ```
#[derive(Clone)]
pub struct CachedBuffer<S, const N: usize = DEFAULT_CAPACITY> {
    cache: [u8; N],
    offset: usize,
    sink: Option<S>,
}

impl<S, const N: usize> CachedBuffer<S, N> {
    /// An empty buffer without a sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: [0; N],
            offset: 0,
            sink: None,
        }
    }

    /// An empty buffer draining into `sink`.
    #[must_use]
    pub const fn with_sink(sink: S) -> Self {
        Self {
            cache: [0; N],
            offset: 0,
            sink: Some(sink),
        }
    }

    /// Installs `sink`, returning the one it replaces.
    pub fn register_sink(&mut self, sink: S) -> Option<S> {
        self.sink.replace(sink)
    }

    /// Removes the sink. Drains fail with [`SinkError::Stalled`] until a new
    /// one is registered.
    pub fn unregister_sink(&mut self) -> Option<S> {
        self.sink.take()
    }

    /// The registered sink, if any.
    #[must_use]
    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    /// Mutable access to the registered sink, if any.
    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Number of cached bytes waiting for the sink.
    #[doc(alias = "size")]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.offset
    }

    /// `true` when nothing is cached.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.offset == 0
    }

    /// Size of the backing array.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes that can still be stored without draining.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        N - self.offset
    }

    /// The cached bytes, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.cache[..self.offset]
    }
}

impl<S: Sink, const N: usize> CachedBuffer<S, N> {
    /// Stores `data`, draining the cache or bypassing it as needed.
    ///
    /// On success every byte of `data` is either cached or was accepted by
    /// the sink.
    ///
    /// # Errors
    ///
    /// - [`SinkError::Stalled`]: a drain was needed and the sink took
    ///   nothing. Neither the cache nor `data` was touched; retry later.
    /// - [`SinkError::Backlog`]: the sink took part of the cache but the
    ///   rest still leaves no room (or, for data larger than `N`, the cache
    ///   could not be emptied). `data` was not stored.
    /// - [`SinkError::ShortWrite`]: data larger than `N` went straight to
    ///   the sink, which took only `written` leading bytes of it.
    pub fn store(&mut self, data: &[u8]) -> Result<(), SinkError> {
        let len = data.len();

        if len > N {
            let drained = self.drain()?;
            if self.offset > 0 {
                return Err(SinkError::Backlog {
                    drained,
                    pending: self.offset,
                });
            }

            let written = Self::offer(&mut self.sink, data);
            if written != len {
                tracing::debug!(written, expected = len, "short pass-through write");
                return Err(SinkError::ShortWrite {
                    written,
                    expected: len,
                });
            }
            return Ok(());
        }

        if len > self.remaining() {
            let drained = self.drain()?;
            if len > self.remaining() {
                return Err(SinkError::Backlog {
                    drained,
                    pending: self.offset,
                });
            }
        }

        self.cache[self.offset..self.offset + len].copy_from_slice(data);
        self.offset += len;
        Ok(())
    }

    /// Offers every cached byte to the sink in one call and returns how many
    /// it accepted.
    ///
    /// An empty cache is not a stall: it returns `Ok(0)` without calling the
    /// sink. A partial write keeps the unwritten bytes, compacted to the
    /// front, so [`len`](Self::len) tells what is still pending.
    ///
    /// # Errors
    ///
    /// [`SinkError::Stalled`] if bytes were cached and the sink took none.
    pub fn flush(&mut self) -> Result<usize, SinkError> {
        self.drain()
    }

    fn drain(&mut self) -> Result<usize, SinkError> {
        let pending = self.offset;
        if pending == 0 {
            return Ok(0);
        }

        let written = Self::offer(&mut self.sink, &self.cache[..pending]);
        tracing::trace!(pending, written, "drained cache");
        if written == 0 {
            tracing::debug!(pending, "sink stalled");
            return Err(SinkError::Stalled { pending });
        }

        self.cache.copy_within(written..pending, 0);
        self.offset = pending - written;
        Ok(written)
    }

    fn offer(sink: &mut Option<S>, data: &[u8]) -> usize {
        sink.as_mut().map_or(0, |sink| sink.write(data).min(data.len()))
    }
}

impl<S, const N: usize> Default for CachedBuffer<S, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, const N: usize> fmt::Debug for CachedBuffer<S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedBuffer")
            .field("len", &self.offset)
            .field("capacity", &N)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl<S, const N: usize> Drop for CachedBuffer<S, N> {
    fn drop(&mut self) {
        if self.offset > 0 {
            tracing::debug!(discarded = self.offset, "cached buffer dropped before flush");
        }
    }
}
