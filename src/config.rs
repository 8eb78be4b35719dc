use clap::{Parser, ValueEnum};
use spdlog::{Level, LevelFilter};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Sliding-window average error between actual and predicted values.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// File whose first non-blank line is the window size.
    pub window: PathBuf,
    /// Actual values, `time|entity|value` per line, sorted by time.
    pub actual: PathBuf,
    /// Predicted values, same format as `actual`.
    pub predicted: PathBuf,
    /// Destination for `begin|end|average` lines.
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Time units between progress log lines.
    #[arg(long, default_value_t = 100_000, value_parser = clap::value_parser!(u64).range(1..))]
    pub progress_interval: u64,

    /// Log the distribution of per-entity deltas when done.
    #[arg(long)]
    pub error_stats: bool,
}

impl Args {
    pub fn new(
        window: impl Into<PathBuf>,
        actual: impl Into<PathBuf>,
        predicted: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            window: window.into(),
            actual: actual.into(),
            predicted: predicted.into(),
            output: output.into(),
            log_level: LogLevel::Info,
            progress_interval: 100_000,
            error_stats: false,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Critical,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        let level = match self {
            LogLevel::Off => return LevelFilter::Off,
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        };
        LevelFilter::MoreSevereEqual(level)
    }
}

/// Reads the window size from `path`.
///
/// `Ok(None)` means the file holds no usable size: no non-blank line, a
/// non-integer, or a value that is not positive.
pub fn load_window_size(path: impl AsRef<Path>) -> io::Result<Option<NonZeroUsize>> {
    read_window_size(BufReader::new(File::open(path)?))
}

pub fn read_window_size(reader: impl BufRead) -> io::Result<Option<NonZeroUsize>> {
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let size = line
            .parse::<i64>()
            .ok()
            .and_then(|size| usize::try_from(size).ok())
            .and_then(NonZeroUsize::new);
        return Ok(size);
    }
    Ok(None)
}
