//! Double-buffered values — the kernel's sole cross-tick publication
//! mechanism.
//!
//! A [`BufferedCell<T>`] holds two copies of a value: `current`, visible to
//! every reader for the whole tick, and `pending`, visible only to the
//! writer. [`BufferedCell::set`] only ever touches `pending`; a separate
//! [`BufferedCell::flip`] call promotes `pending` to `current`. Readers never
//! observe a half-written value and writers never race a reader, because the
//! kernel only calls `flip` during the dedicated flip phase, when no worker
//! holds a tick-scoped borrow of any entity.
//!
//! Rust's ownership rules already guarantee single-writer access during the
//! update phase: each worker owns `&mut` to its own partition's entities and
//! nothing else, so a second thread cannot call `set` on a cell it does not
//! own without going through `unsafe`. `BufferedCell` itself stays a plain
//! value type; the owning-worker guarantee comes from how `WorkGroup` hands
//! out partitions, not from a lock inside the cell.
//!
//! Some cells are published from outside the ordinary worker partitioning —
//! e.g. a signal's `TrafficColor`, flipped by the signal work group while
//! person-group workers may be mid-read of last tick's color. For those,
//! [`MutexStrategy`] selects a belt-and-suspenders synchronisation mode on
//! top of the plain cell.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// How a [`SyncBufferedCell`] protects its flip against concurrent readers
/// from a different work group.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutexStrategy {
    /// No synchronisation. Correct only when the caller's own barrier
    /// structure already guarantees no concurrent access (the common case
    /// for same-group cells).
    #[default]
    None,
    /// Take a `Mutex` for the duration of both `get` and `flip`. Simple and
    /// safe for cells flipped rarely relative to how often they're read.
    LockPerFlip,
    /// An odd/even epoch counter bumped around `flip`; `get` panics if it
    /// observes a flip in progress. Lock-free reads, at the cost of a
    /// runtime check on every access — use for hot, frequently read cells
    /// (e.g. signal colors) shared across work-group boundaries.
    Epoch,
}

/// A single double-buffered value, written by its owner and read by anyone
/// holding a shared reference.
#[derive(Clone, Debug, Default)]
pub struct BufferedCell<T: Clone> {
    current: T,
    pending: T,
}

impl<T: Clone> BufferedCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial.clone(),
            pending: initial,
        }
    }

    /// The value visible for the whole of the current tick.
    #[inline]
    pub fn get(&self) -> &T {
        &self.current
    }

    /// Write the value that will become visible after the next flip. Does
    /// not affect `get` until `flip` is called.
    #[inline]
    pub fn set(&mut self, value: T) {
        self.pending = value;
    }

    /// Promote `pending` to `current`. Must only be called during the
    /// kernel's flip phase, when no thread holds a live read of this cell.
    #[inline]
    pub fn flip(&mut self) {
        self.current = self.pending.clone();
    }
}

/// A [`BufferedCell`] wrapped with an explicit [`MutexStrategy`] for use when
/// readers and the flip may run on different work groups simultaneously.
pub struct SyncBufferedCell<T: Clone> {
    strategy: MutexStrategy,
    epoch: AtomicU32,
    locked: Mutex<BufferedCell<T>>,
}

impl<T: Clone> SyncBufferedCell<T> {
    pub fn new(initial: T, strategy: MutexStrategy) -> Self {
        Self {
            strategy,
            epoch: AtomicU32::new(0),
            locked: Mutex::new(BufferedCell::new(initial)),
        }
    }

    /// Read the current value under the configured strategy.
    ///
    /// # Panics
    /// With `MutexStrategy::Epoch`, panics if a flip is observed in
    /// progress — this is a fatal kernel invariant violation (a reader ran
    /// concurrently with a flip it should have been barrier-excluded from),
    /// not a recoverable error.
    pub fn get(&self) -> T {
        match self.strategy {
            MutexStrategy::None | MutexStrategy::LockPerFlip => {
                self.locked.lock().unwrap().get().clone()
            }
            MutexStrategy::Epoch => {
                let before = self.epoch.load(Ordering::Acquire);
                assert!(before % 2 == 0, "read observed a flip in progress");
                let value = self.locked.lock().unwrap().get().clone();
                let after = self.epoch.load(Ordering::Acquire);
                assert_eq!(before, after, "flip interleaved with a concurrent read");
                value
            }
        }
    }

    pub fn set(&self, value: T) {
        self.locked.lock().unwrap().set(value);
    }

    pub fn flip(&self) {
        if self.strategy == MutexStrategy::Epoch {
            self.epoch.fetch_add(1, Ordering::AcqRel);
        }
        self.locked.lock().unwrap().flip();
        if self.strategy == MutexStrategy::Epoch {
            self.epoch.fetch_add(1, Ordering::AcqRel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_stable_until_flip() {
        let mut cell = BufferedCell::new(1);
        cell.set(2);
        assert_eq!(*cell.get(), 1);
        cell.flip();
        assert_eq!(*cell.get(), 2);
    }

    #[test]
    fn multiple_sets_before_flip_keep_last_write() {
        let mut cell = BufferedCell::new(0);
        cell.set(5);
        cell.set(9);
        cell.flip();
        assert_eq!(*cell.get(), 9);
    }

    #[test]
    fn sync_cell_lock_per_flip_roundtrips() {
        let cell = SyncBufferedCell::new(1, MutexStrategy::LockPerFlip);
        cell.set(7);
        assert_eq!(cell.get(), 1);
        cell.flip();
        assert_eq!(cell.get(), 7);
    }

    #[test]
    fn sync_cell_epoch_roundtrips() {
        let cell = SyncBufferedCell::new("a", MutexStrategy::Epoch);
        cell.set("b");
        assert_eq!(cell.get(), "a");
        cell.flip();
        assert_eq!(cell.get(), "b");
    }
}
