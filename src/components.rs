use crate::accumulator::WindowAverage;
use rust_decimal::Decimal;

/// Absolute error aggregated over the matched entities of one time unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitError {
    pub time: i64,
    pub sum: Decimal,
    pub count: u64,
}

impl UnitError {
    pub fn empty(time: i64) -> Self {
        Self {
            time,
            sum: Decimal::ZERO,
            count: 0,
        }
    }
}

/// One output line: the average error over time units `begin..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowReport {
    pub begin: i64,
    pub end: i64,
    pub average: WindowAverage,
}
