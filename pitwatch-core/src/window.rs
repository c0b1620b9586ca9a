//! Fixed-Capacity Sliding Window over Channel Readings
//!
//! ## Overview
//!
//! This module implements the per-channel history the trend computation is
//! defined over: a ring buffer holding the most recent `capacity` readings
//! in insertion order, oldest first. Once warmed up, every push evicts the
//! oldest reading, so the window always holds the latest `capacity`
//! readings.
//!
//! ## Design Rationale
//!
//! ### Why a ring buffer?
//!
//! The trend is `value(newest) - value(oldest)` over a fixed number of
//! readings. That needs exactly two properties from the history:
//! - O(1) insertion with automatic eviction of the oldest entry
//! - O(1) access to the oldest and newest entries
//!
//! A ring buffer over a fixed array gives both with zero heap allocations
//! and no shifting.
//!
//! ### Runtime capacity over a const-generic array
//!
//! Capacity is channel configuration (`window_duration /
//! expected_reading_interval`: 5 readings for the fast smoker window, 20
//! for the slow food window), so it cannot be a compile-time constant. The
//! backing array is const-generic with a `capacity <= N` set at
//! construction; only the first `capacity` slots are ever used.
//!
//! ### Time semantics
//!
//! The window approximates a fixed time span of `capacity x
//! expected_reading_interval` under the assumption that readings arrive at
//! the expected cadence. There is deliberately no interpolation by actual
//! elapsed time: if the producer's cadence drifts, the "time window"
//! drifts with it. The timestamp token on each reading is carried for
//! display only.
//!
//! Ordering is load-bearing: the window trusts that readings are pushed in
//! publish order, which the consumer guarantees by keeping a single
//! delivery in flight.

use crate::errors::TrendError;
use crate::reading::Reading;

/// Largest supported window capacity (backing array size)
pub const MAX_WINDOW: usize = 32;

/// Result of pushing a reading into the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Window is still filling; no trend is defined yet
    Warming {
        /// Readings held so far
        have: usize,
        /// Readings required before evaluation starts
        need: usize,
    },
    /// Window holds exactly `capacity` readings; trend is defined
    Full,
}

/// Sliding window of the most recent readings for one channel
///
/// ## Internal Invariants
///
/// - `capacity <= N` and `capacity >= 1`
/// - `write_pos < capacity` (next write position is always valid)
/// - `len <= capacity` (never more items than capacity)
/// - Iteration yields readings in chronological (insertion) order
///
/// ## Thread Safety
///
/// Not thread-safe, and deliberately so: one window is owned by exactly
/// one channel's consumer and mutated only from its single receive loop.
#[derive(Clone)]
pub struct SlidingWindow<const N: usize = MAX_WINDOW> {
    /// Storage array using Option for unfilled slots
    data: [Option<Reading>; N],

    /// Index where the next write will occur; wraps at `capacity`
    write_pos: usize,

    /// Current number of valid readings
    len: usize,

    /// Configured capacity, at most N
    capacity: usize,
}

impl<const N: usize> SlidingWindow<N> {
    /// Create an empty window holding at most `capacity` readings
    ///
    /// `capacity` is clamped to `1..=N`.
    pub const fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            1
        } else if capacity > N {
            N
        } else {
            capacity
        };

        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
            capacity,
        }
    }

    /// Append a reading, evicting the oldest when already at capacity
    ///
    /// Returns whether the window is now full. Trend evaluation is only
    /// meaningful once [`WindowState::Full`] is reported.
    pub fn push(&mut self, reading: Reading) -> WindowState {
        self.data[self.write_pos] = Some(reading);
        self.write_pos = (self.write_pos + 1) % self.capacity;

        if self.len < self.capacity {
            self.len += 1;
        }

        if self.len == self.capacity {
            WindowState::Full
        } else {
            WindowState::Warming {
                have: self.len,
                need: self.capacity,
            }
        }
    }

    /// Trend over the current window contents: `value(newest) - value(oldest)`
    ///
    /// Only defined when the window is full; otherwise reports how much
    /// data is still missing.
    pub fn trend(&self) -> Result<f32, TrendError> {
        match (self.oldest(), self.newest()) {
            (Some(oldest), Some(newest)) if self.is_full() => Ok(newest.value - oldest.value),
            _ => Err(TrendError::InsufficientData {
                required: self.capacity,
                available: self.len,
            }),
        }
    }

    /// Number of stored readings
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the window holds no readings
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the window holds exactly `capacity` readings
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent reading, if any
    pub fn newest(&self) -> Option<&Reading> {
        if self.is_empty() {
            return None;
        }

        // Most recent is one before the write position
        let idx = if self.write_pos == 0 {
            self.capacity - 1
        } else {
            self.write_pos - 1
        };

        self.data[idx].as_ref()
    }

    /// Oldest retained reading, if any
    pub fn oldest(&self) -> Option<&Reading> {
        self.get(0)
    }

    /// Iterate over readings from oldest to newest
    pub fn iter(&self) -> WindowIter<'_, N> {
        WindowIter {
            window: self,
            index: 0,
        }
    }

    /// Drop all readings, returning to the warming state
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }

    /// Reading by logical index (0 = oldest, len-1 = newest)
    ///
    /// When the window is not yet full, logical and physical indices
    /// match. When full, the oldest element sits at `write_pos`, so the
    /// logical index is offset from there, modulo `capacity`.
    fn get(&self, index: usize) -> Option<&Reading> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < self.capacity {
            index
        } else {
            (self.write_pos + index) % self.capacity
        };

        self.data[actual_index].as_ref()
    }
}

/// Iterator over window contents, oldest first
pub struct WindowIter<'a, const N: usize> {
    window: &'a SlidingWindow<N>,
    index: usize,
}

impl<'a, const N: usize> Iterator for WindowIter<'a, N> {
    type Item = &'a Reading;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.window.get(self.index)?;
        self.index += 1;
        Some(item)
    }
}
