//! Runs the bundled sample through the pipeline and prints the report.
//!
//! `cargo run --example stock_window`

use prediction_validation::{ErrorWindowPipeline, ReportWriter, read_window_size};
use spdlog::prelude::*;
use std::io::Cursor;

const WINDOW: &str = include_str!("input/window.txt");
const ACTUAL: &str = include_str!("input/actual.txt");
const PREDICTED: &str = include_str!("input/predicted.txt");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(window) = read_window_size(Cursor::new(WINDOW))? else {
        warn!("sample window file holds no usable size");
        return Ok(());
    };

    info!("--- Comparing sample predictions, window of {} ---", window);
    let mut writer = ReportWriter::new(Vec::new());
    let summary = ErrorWindowPipeline::new(window, Cursor::new(ACTUAL), Cursor::new(PREDICTED))
        .with_progress_interval(2)
        .with_error_stats(true)
        .run(&mut writer)?;

    let report = String::from_utf8(writer.finish()?)?;
    for line in report.lines() {
        info!("{}", line);
    }

    info!(
        "{} matched pairs, overall average error {}",
        summary.matched,
        summary.overall_average()
    );
    if let Some(stats) = summary.error_stats {
        info!("[Deltas]{}", stats.format_stats());
    }
    Ok(())
}
