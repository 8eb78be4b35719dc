use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::num::NonZeroUsize;

/// Decimal places of a reported average.
pub const AVERAGE_SCALE: u32 = 2;

/// Aggregate error contribution of one time unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSlot {
    pub sum: Decimal,
    pub count: u64,
}

impl WindowSlot {
    pub const EMPTY: WindowSlot = WindowSlot {
        sum: Decimal::ZERO,
        count: 0,
    };

    pub fn new(sum: Decimal, count: u64) -> Self {
        Self { sum, count }
    }
}

/// Result of averaging a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAverage {
    /// Mean absolute error, already rounded to [`AVERAGE_SCALE`] places.
    Value(Decimal),
    /// No sample fell inside the window.
    NotAvailable,
}

impl WindowAverage {
    /// Rounds `sum / count` half-up to two places. A zero count is `NotAvailable`.
    pub fn from_totals(sum: Decimal, count: u64) -> Self {
        if count == 0 {
            return WindowAverage::NotAvailable;
        }
        let mean = sum / Decimal::from(count);
        WindowAverage::Value(
            mean.round_dp_with_strategy(AVERAGE_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

}

impl fmt::Display for WindowAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowAverage::Value(v) => {
                let mut v = *v;
                v.rescale(AVERAGE_SCALE);
                write!(f, "{v}")
            }
            WindowAverage::NotAvailable => f.write_str("NA"),
        }
    }
}

/// Fixed-capacity moving average over the last `W` time units.
///
/// Each time unit owns one slot of a circular array. Advancing overwrites the
/// oldest slot and patches the running totals with the difference, so both
/// the update and the query are O(1) and the memory is allocated once.
/// Arithmetic is exact, so evicting a slot restores the totals precisely.
/// Totals that no longer fit a `Decimal` are refused rather than rounded.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    slots: Box<[WindowSlot]>,
    next: usize,
    running: WindowSlot,
    steps: u64,
}

impl MovingAverage {
    pub fn new(window: NonZeroUsize) -> Self {
        Self {
            slots: vec![WindowSlot::EMPTY; window.get()].into_boxed_slice(),
            next: 0,
            running: WindowSlot::EMPTY,
            steps: 0,
        }
    }

    /// Moves to the next time unit, replacing the contribution of the time
    /// unit `W` steps back with `(sum, count)`, and returns the window average.
    ///
    /// Must be called once per time unit, including units without samples.
    /// Returns `None` and leaves the window untouched if the running sum would
    /// overflow.
    #[inline]
    pub fn advance(&mut self, sum: Decimal, count: u64) -> Option<WindowAverage> {
        let slot = &mut self.slots[self.next];
        let running_sum = self.running.sum.checked_sub(slot.sum)?.checked_add(sum)?;
        let running_count = (self.running.count - slot.count).checked_add(count)?;
        *slot = WindowSlot::new(sum, count);
        self.running = WindowSlot::new(running_sum, running_count);

        self.next = (self.next + 1) % self.slots.len();
        self.steps += 1;
        Some(self.average())
    }

    pub fn average(&self) -> WindowAverage {
        WindowAverage::from_totals(self.running.sum, self.running.count)
    }

    /// Totals over the last `min(W, steps)` time units.
    pub fn running(&self) -> WindowSlot {
        self.running
    }

    pub fn window(&self) -> usize {
        self.slots.len()
    }

    /// Number of `advance` calls so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}
