mod accumulator;
mod components;
mod config;
mod error;
mod macros;
pub mod measure;
mod output;
mod pipe;
mod pipeline;
mod reader;
mod record;
mod stage;

pub use crate::accumulator::{AVERAGE_SCALE, MovingAverage, WindowAverage, WindowSlot};
pub use crate::components::*;
pub use crate::config::{Args, LogLevel, load_window_size, read_window_size};
pub use crate::error::{Result, SumOverflow, ValidationError};
pub use crate::output::ReportWriter;
pub use crate::pipe::*;
pub use crate::pipeline::{DEFAULT_PROGRESS_INTERVAL, ErrorWindowPipeline, RunSummary};
pub use crate::reader::TimeGroupedReader;
pub use crate::record::{Record, parse_time, parse_value};
pub use crate::stage::{OutputCollector, Pipeline, Stage, StageExt};

use spdlog::prelude::*;
use std::fs::File;
use std::io::BufReader;

/// Runs one validation over the files named in `args`.
///
/// The output file is always created. `Ok(None)` means the window file held
/// no usable size and nothing was computed. Every file is closed before this
/// returns, on success and on error alike.
pub fn run(args: &Args) -> Result<Option<RunSummary>> {
    let window = load_window_size(&args.window)?;
    let mut writer = ReportWriter::new(File::create(&args.output)?);

    let Some(window) = window else {
        warn!(
            "{}: no positive window size, leaving {} empty",
            args.window.display(),
            args.output.display()
        );
        writer.finish()?;
        return Ok(None);
    };

    info!(
        "Validating {} against {} with a window of {} time units",
        args.predicted.display(),
        args.actual.display(),
        window
    );
    let actual = BufReader::new(File::open(&args.actual)?);
    let predicted = BufReader::new(File::open(&args.predicted)?);

    let progress_interval = usize::try_from(args.progress_interval).unwrap_or(usize::MAX);
    let summary = ErrorWindowPipeline::new(window, actual, predicted)
        .with_progress_interval(progress_interval)
        .with_error_stats(args.error_stats)
        .run(&mut writer)?;
    writer.finish()?;

    log_summary(&summary);
    Ok(Some(summary))
}

fn log_summary(summary: &RunSummary) {
    info!(
        "Processed {} time units, wrote {} windows",
        summary.time_units, summary.reports
    );
    info!(
        "Records: actual={}, predicted={}, matched={}, unmatched actual={}, unmatched predicted={}",
        summary.actual_records,
        summary.predicted_records,
        summary.matched,
        summary.unmatched_actual,
        summary.unmatched_predicted
    );
    info!(
        "Total absolute error {} over {} pairs, overall average {}",
        summary.total_error,
        summary.matched,
        summary.overall_average()
    );
    if summary.malformed_lines > 0 {
        info!("Skipped {} malformed lines", summary.malformed_lines);
    }
    if summary.out_of_order_records > 0 {
        warn!("Ignored {} out-of-order actual records", summary.out_of_order_records);
    }
    if let Some(stats) = &summary.error_stats {
        info!("[Deltas]{}", stats.format_stats());
    }
}
