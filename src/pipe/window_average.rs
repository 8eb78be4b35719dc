use crate::accumulator::MovingAverage;
use crate::components::{UnitError, WindowReport};
use crate::error::SumOverflow;
use crate::stage::{OutputCollector, Stage};
use std::num::NonZeroUsize;

/// Feeds each time unit into a [`MovingAverage`] and reports the window that
/// ends there, once a full window after `start_time` has been observed.
///
/// A window whose sum overflows is pushed as an error instead of a report.
pub struct WindowAverageStage {
    start_time: i64,
    span: Option<i64>,
    accumulator: MovingAverage,
}

impl WindowAverageStage {
    pub fn new(start_time: i64, window: NonZeroUsize) -> Self {
        Self {
            start_time,
            span: i64::try_from(window.get() - 1).ok(),
            accumulator: MovingAverage::new(window),
        }
    }

    fn window_begin(&self, end: i64) -> Option<i64> {
        let begin = end.checked_sub(self.span?)?;
        (begin >= self.start_time).then_some(begin)
    }
}

impl Stage<UnitError, Result<WindowReport, SumOverflow>> for WindowAverageStage {
    #[inline(always)]
    fn process<C>(&mut self, unit: &UnitError, collector: &mut C)
    where
        C: OutputCollector<Result<WindowReport, SumOverflow>>,
    {
        let Some(average) = self.accumulator.advance(unit.sum, unit.count) else {
            collector.push(&Err(SumOverflow { time: unit.time }));
            return;
        };
        if let Some(begin) = self.window_begin(unit.time) {
            collector.push(&Ok(WindowReport {
                begin,
                end: unit.time,
                average,
            }));
        }
    }
}

pub fn window_average(start_time: i64, window: NonZeroUsize) -> WindowAverageStage {
    WindowAverageStage::new(start_time, window)
}
