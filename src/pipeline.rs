use crate::accumulator::WindowAverage;
use crate::components::{UnitError, WindowReport};
use crate::error::{Result, SumOverflow};
use crate::measure::{DistributionStats, ErrorDistribution};
use crate::output::ReportWriter;
use crate::pipe::{inspect, progress, window_average};
use crate::reader::TimeGroupedReader;
use crate::stage::Stage;
use fxhash::FxHashMap;
use rust_decimal::Decimal;
use spdlog::prelude::*;
use std::io::{BufRead, Write};
use std::num::NonZeroUsize;

pub const DEFAULT_PROGRESS_INTERVAL: usize = 100_000;

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub time_units: u64,
    pub reports: u64,
    pub actual_records: u64,
    pub predicted_records: u64,
    pub matched: u64,
    pub unmatched_actual: u64,
    pub unmatched_predicted: u64,
    pub malformed_lines: u64,
    pub out_of_order_records: u64,
    pub total_error: Decimal,
    pub error_stats: Option<DistributionStats>,
}

impl RunSummary {
    /// Mean absolute error over every matched pair of the run.
    pub fn overall_average(&self) -> WindowAverage {
        WindowAverage::from_totals(self.total_error, self.matched)
    }
}

/// Walks the actual stream one time unit at a time, pairs it with the
/// predicted stream and reports the moving average of the absolute error.
///
/// Only the actual stream decides which time units exist; predicted records
/// for other time units are consumed and ignored.
pub struct ErrorWindowPipeline<A, P> {
    actual: TimeGroupedReader<A>,
    predicted: TimeGroupedReader<P>,
    window: NonZeroUsize,
    progress_interval: usize,
    distribution: Option<ErrorDistribution>,
}

impl<A: BufRead, P: BufRead> ErrorWindowPipeline<A, P> {
    pub fn new(window: NonZeroUsize, actual: A, predicted: P) -> Self {
        Self {
            actual: TimeGroupedReader::named("actual", actual),
            predicted: TimeGroupedReader::named("predicted", predicted),
            window,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            distribution: None,
        }
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Collects a histogram of the per-entity deltas into the summary.
    pub fn with_error_stats(mut self, enabled: bool) -> Self {
        self.distribution = if enabled {
            match ErrorDistribution::new() {
                Ok(distribution) => Some(distribution),
                Err(err) => {
                    warn!("error stats disabled: {:?}", err);
                    None
                }
            }
        } else {
            None
        };
        self
    }

    /// Runs to the end of the actual stream, writing one report per time unit
    /// once the window is full.
    ///
    /// On an unparsable number the run stops; everything reported up to that
    /// point has been flushed to `output` before the error is returned.
    pub fn run<W: Write>(mut self, output: &mut ReportWriter<W>) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let result = self.drive(output, &mut summary);
        let flushed = output.flush();

        summary.actual_records = self.actual.records_consumed();
        summary.malformed_lines = self.actual.lines_skipped() + self.predicted.lines_skipped();
        summary.out_of_order_records = self.actual.records_dropped();
        summary.error_stats = self.distribution.as_ref().map(ErrorDistribution::get_stats);

        result?;
        flushed?;
        Ok(summary)
    }

    fn drive<W: Write>(
        &mut self,
        output: &mut ReportWriter<W>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let Some(start_time) = self.actual.peek_time_unit()? else {
            debug!("actual stream is empty, nothing to report");
            return Ok(());
        };

        let mut stages = crate::pipe![
            progress("time units", self.progress_interval),
            window_average(start_time, self.window),
            inspect(|outcome: &Result<WindowReport, SumOverflow>| {
                if let Ok(report) = outcome {
                    trace!("window {}..={} -> {}", report.begin, report.end, report.average);
                }
            })
        ];

        let mut batch: FxHashMap<String, Decimal> = FxHashMap::default();
        let mut cur_time = start_time;
        loop {
            let dropped = self.actual.skip_before(cur_time)?;
            if dropped > 0 {
                warn!("actual: ignored {} records older than time unit {}", dropped, cur_time);
            }
            if self.actual.peek_time_unit()?.is_none() {
                break;
            }

            let unit = self.match_time_unit(cur_time, &mut batch, summary)?;
            let mut overflow = None;
            stages.process(
                &unit,
                &mut |outcome: &Result<WindowReport, SumOverflow>| match outcome {
                    Ok(report) => {
                        output.push(report);
                        summary.reports += 1;
                    }
                    Err(err) => overflow = Some(*err),
                },
            );
            output.check()?;
            if let Some(err) = overflow {
                return Err(err.into());
            }
            summary.time_units += 1;

            let Some(next) = cur_time.checked_add(1) else {
                break;
            };
            cur_time = next;
        }
        Ok(())
    }

    /// Pairs the actual and predicted records of `time` by entity.
    fn match_time_unit(
        &mut self,
        time: i64,
        batch: &mut FxHashMap<String, Decimal>,
        summary: &mut RunSummary,
    ) -> Result<UnitError> {
        let Self {
            actual,
            predicted,
            distribution,
            ..
        } = self;

        batch.clear();
        actual.consume_time_unit(time, |record| {
            batch.insert(record.entity, record.value);
        })?;

        let stale = predicted.skip_before(time)?;
        summary.predicted_records += stale;
        summary.unmatched_predicted += stale;

        let mut unit = UnitError::empty(time);
        let mut unmatched = 0;
        let mut overflowed = false;
        summary.predicted_records += predicted.consume_time_unit(time, |record| {
            let Some(actual_value) = batch.remove(&record.entity) else {
                unmatched += 1;
                return;
            };
            let Some((delta, sum)) = actual_value
                .checked_sub(record.value)
                .map(|diff| diff.abs())
                .and_then(|delta| Some((delta, unit.sum.checked_add(delta)?)))
            else {
                overflowed = true;
                return;
            };
            unit.sum = sum;
            unit.count += 1;
            if let Some(distribution) = distribution.as_mut() {
                distribution.record(delta);
            }
        })?;
        if overflowed {
            return Err(SumOverflow { time }.into());
        }

        summary.unmatched_predicted += unmatched;
        summary.unmatched_actual += batch.len() as u64;
        summary.matched += unit.count;
        // Only feeds the summary; a run of huge deltas pins it at the maximum.
        summary.total_error = summary.total_error.saturating_add(unit.sum);
        Ok(unit)
    }
}
